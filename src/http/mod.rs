//! HTTP boundary over the lifecycle controller.
//!
//! Thin by design: routing, JSON encoding and status-code mapping only. The
//! core is reached exclusively through `list`/`run`/`kill`/`status`; every
//! core error surfaces as a 5xx with its message verbatim, while malformed
//! input (blank path segments) is rejected here with a 400 before the core
//! is invoked.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use k8s_openapi::api::batch::v1::JobStatus;
use tracing::warn;

use crate::controller::JobController;
use crate::error::Error;
use crate::gateway::JobGateway;
use crate::model::{self, ListJobs};

/// Errors produced at the HTTP boundary
#[derive(Debug)]
pub enum ApiError {
    /// Blank namespace or name in the path
    InvalidPath,
    /// Any error surfaced by the core
    Core(Error),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self::Core(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::InvalidPath => "invalid path".to_string(),
            ApiError::Core(e) => e.to_string(),
        };
        let status = match &self {
            ApiError::InvalidPath => StatusCode::BAD_REQUEST,
            ApiError::Core(Error::DeadlineExceeded(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn check_identity(namespace: &str, name: &str) -> Result<(), ApiError> {
    if namespace.trim().is_empty() || name.trim().is_empty() {
        return Err(ApiError::InvalidPath);
    }
    Ok(())
}

/// Build the router exposing the controller
pub fn router<G: JobGateway + 'static>(controller: Arc<JobController<G>>) -> Router {
    Router::new()
        .route("/list", get(list_jobs::<G>))
        .route("/run/{namespace}/{name}", get(run_job::<G>))
        .route("/kill/{namespace}/{name}", get(kill_job::<G>))
        .route("/status/{namespace}/{name}", get(job_status::<G>))
        .with_state(controller)
}

async fn list_jobs<G: JobGateway>(
    State(controller): State<Arc<JobController<G>>>,
) -> Result<Json<ListJobs>, ApiError> {
    let jobs = controller.list().await?;
    Ok(Json(model::decorate_all(&jobs)))
}

async fn run_job<G: JobGateway>(
    State(controller): State<Arc<JobController<G>>>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    check_identity(&namespace, &name)?;
    controller.run(&namespace, &name).await.map_err(|e| {
        warn!(job = %name, namespace = %namespace, error = %e, "run failed");
        e
    })?;
    Ok(StatusCode::OK)
}

async fn kill_job<G: JobGateway>(
    State(controller): State<Arc<JobController<G>>>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    check_identity(&namespace, &name)?;
    controller.kill(&namespace, &name).await.map_err(|e| {
        warn!(job = %name, namespace = %namespace, error = %e, "kill failed");
        e
    })?;
    Ok(StatusCode::OK)
}

async fn job_status<G: JobGateway>(
    State(controller): State<Arc<JobController<G>>>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<JobStatus>, ApiError> {
    check_identity(&namespace, &name)?;
    let status = controller.status(&namespace, &name).await?;
    Ok(Json(status))
}
