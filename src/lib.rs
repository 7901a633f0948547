//! job-assistant - remote lifecycle control for Kubernetes batch Jobs
//!
//! Lets an operator start, stop and inspect run-to-completion Jobs without
//! holding cluster credentials per call. All state lives in the cluster; the
//! service holds no cache and makes every decision from a freshly fetched
//! status snapshot.
//!
//! # Modules
//!
//! - [`gateway`] - Narrow transport surface over the Kubernetes API
//! - [`state`] - Pure evaluation of a Job's lifecycle state
//! - [`sanitize`] - Clean-copy transform for delete-then-recreate
//! - [`wait`] - Bounded convergence polling
//! - [`controller`] - The List / Run / Kill / Status lifecycle logic
//! - [`model`] - Display decoration for the list endpoint
//! - [`http`] - axum boundary mapping errors to status codes
//! - [`error`] - Error types

#![deny(missing_docs)]

pub mod controller;
pub mod error;
pub mod gateway;
pub mod http;
pub mod model;
pub mod sanitize;
pub mod state;
pub mod wait;

pub use controller::{ControllerConfig, JobController};
pub use error::Error;
pub use gateway::{JobGateway, KubeJobGateway};
