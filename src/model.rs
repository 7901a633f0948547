//! Display-oriented view of managed Jobs.
//!
//! The controller hands back raw `Job` objects; this module flattens them
//! into the payload the list endpoint serves. Decoration stays out of the
//! controller so its contract remains orchestrator-state-accurate.

use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use serde::{Deserialize, Serialize};

use crate::state;

/// Most recent observable state of a Job, summarized for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastStatus {
    /// "Running" while pods are active, otherwise the latest condition kind
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable detail, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One managed Job, flattened for the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratedJob {
    /// Namespace half of the Job identity
    pub namespace: String,
    /// Name half of the Job identity
    pub name: String,
    /// Summary of the most recent run, absent for never-started Jobs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_status: Option<LastStatus>,
    /// When the last run started, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run_start_time: Option<Time>,
    /// When the last run completed, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run_completion_time: Option<Time>,
}

/// Payload of the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListJobs {
    /// Decorated Jobs in gateway order
    pub jobs: Vec<DecoratedJob>,
    /// Convenience count of `jobs`
    pub count: usize,
}

/// Flatten one Job into its display form
pub fn decorate(job: &Job) -> DecoratedJob {
    let status = job.status.clone().unwrap_or_default();

    let last_status = if status.active.unwrap_or(0) > 0 {
        Some(LastStatus {
            kind: "Running".to_string(),
            message: Some(format!("{} pod(s)", status.active.unwrap_or(0))),
        })
    } else {
        state::latest_condition(&status).map(|cond| LastStatus {
            kind: cond.type_.clone(),
            message: cond.message.clone(),
        })
    };

    DecoratedJob {
        namespace: job.metadata.namespace.clone().unwrap_or_default(),
        name: job.metadata.name.clone().unwrap_or_default(),
        last_status,
        last_run_start_time: status.start_time,
        last_run_completion_time: status.completion_time,
    }
}

/// Flatten a list of Jobs into the list payload
pub fn decorate_all(jobs: &[Job]) -> ListJobs {
    let decorated: Vec<_> = jobs.iter().map(decorate).collect();
    ListJobs {
        count: decorated.len(),
        jobs: decorated,
    }
}
