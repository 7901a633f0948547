//! Integration tests for the job assistant
//!
//! Organized by the story they tell:
//!
//! - `job_lifecycle`: resume-from-suspend, recreate-after-completion, kill,
//!   and the list filter, all exercised against a real API server

mod job_lifecycle;
