//! Job lifecycle controller: List / Run / Kill / Status.
//!
//! Every decision is made from a freshly fetched status snapshot. The
//! controller holds no cache and no lock; correctness against concurrent
//! external edits rests on the API server's optimistic concurrency for
//! whole-object updates, plus the refuse-if-already-running check at the top
//! of Run. Two bounded convergence waits (post-delete of the Job, post-delete
//! of its pods) are the only retry-like behavior; all other errors surface to
//! the caller untouched.

use k8s_openapi::api::batch::v1::{Job, JobStatus};
use tracing::{debug, info};

use crate::error::Error;
use crate::gateway::JobGateway;
use crate::sanitize::{sanitize_for_recreate, JOB_NAME_LABEL};
use crate::state;
use crate::wait::{wait_until, WaitConfig, WaitState};

/// Annotation value that opts a Job into management by this controller
pub const OWNERSHIP_SENTINEL: &str = "enable";

/// Default annotation key carrying the ownership marker
pub const DEFAULT_OWNERSHIP_ANNOTATION: &str = "job-assistant";

/// Controller configuration, passed in explicitly (no process-wide state)
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Annotation key whose value must equal [`OWNERSHIP_SENTINEL`]
    pub ownership_annotation: String,
    /// Interval and deadline for the convergence waits
    pub wait: WaitConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            ownership_annotation: DEFAULT_OWNERSHIP_ANNOTATION.to_string(),
            wait: WaitConfig::default(),
        }
    }
}

/// Orchestrates the gateway, evaluator, sanitizer and poller
pub struct JobController<G> {
    gateway: G,
    config: ControllerConfig,
}

impl<G: JobGateway> JobController<G> {
    /// Create a controller over the given gateway
    pub fn new(gateway: G, config: ControllerConfig) -> Self {
        Self { gateway, config }
    }

    /// All Jobs cluster-wide carrying the ownership annotation with the
    /// exact sentinel value, in the order the API server returned them
    pub async fn list(&self) -> Result<Vec<Job>, Error> {
        let jobs = self.gateway.list_jobs().await?;
        Ok(jobs
            .into_iter()
            .filter(|job| {
                job.metadata
                    .annotations
                    .as_ref()
                    .and_then(|a| a.get(&self.config.ownership_annotation))
                    .map(String::as_str)
                    == Some(OWNERSHIP_SENTINEL)
            })
            .collect())
    }

    /// Start the named Job.
    ///
    /// Fails with [`Error::AlreadyRunning`] if the freshly evaluated state is
    /// Running. A suspended Job is resumed in place by flipping the suspend
    /// flag via whole-object update. A Job with no active suspend flag (idle
    /// or finished) cannot be re-executed in place: the control plane treats
    /// a finished run-to-completion Job as terminal, so the only way to get a
    /// fresh execution under the same name is foreground delete, wait for the
    /// name to become free, then resubmit a sanitized copy.
    pub async fn run(&self, namespace: &str, name: &str) -> Result<(), Error> {
        let job = self.gateway.get_job(namespace, name).await?;

        let status = job.status.clone().unwrap_or_default();
        if state::is_running(&status) {
            return Err(Error::AlreadyRunning);
        }

        let suspended = job.spec.as_ref().and_then(|s| s.suspend).unwrap_or(false);
        if suspended {
            let mut resumed = job;
            if let Some(spec) = resumed.spec.as_mut() {
                spec.suspend = Some(false);
            }
            self.gateway.update_job(namespace, &resumed).await?;
            info!(job = %name, namespace = %namespace, "resumed suspended job");
            return Ok(());
        }

        // Not suspended and not running: tear down and resubmit
        self.gateway.delete_job(namespace, name).await?;

        let gateway = &self.gateway;
        let outcome = wait_until(&self.config.wait, "job deletion", move || async move {
            match gateway.get_job(namespace, name).await {
                Ok(_) => Ok(false),
                Err(e) if e.is_not_found() => Ok(true),
                Err(e) => Err(e),
            }
        })
        .await?;
        if outcome == WaitState::TimedOut {
            return Err(Error::deadline_exceeded("waiting for job deletion"));
        }

        let clean = sanitize_for_recreate(&job);
        self.gateway.create_job(namespace, &clean).await?;
        info!(job = %name, namespace = %namespace, "recreated job for a fresh execution");
        Ok(())
    }

    /// Halt the named Job while preserving its definition.
    ///
    /// Suspends the Job first (merge patch, so concurrent edits to unrelated
    /// fields survive) to stop the control plane from admitting replacement
    /// pods, then deletes the pods matching the linkage label and waits for
    /// the teardown to converge. Idempotent: suspending an already-suspended
    /// Job is a no-op and an empty pod list satisfies the wait immediately.
    pub async fn kill(&self, namespace: &str, name: &str) -> Result<(), Error> {
        self.gateway.suspend_job(namespace, name, true).await?;

        let selector = format!("{JOB_NAME_LABEL}={name}");
        self.gateway
            .delete_pods_by_label(namespace, &selector)
            .await?;

        let gateway = &self.gateway;
        let label = selector.as_str();
        let outcome = wait_until(&self.config.wait, "pod teardown", move || async move {
            let pods = gateway.list_pods_by_label(namespace, label).await?;
            debug!(job = %name, remaining = pods.len(), "polling pod teardown");
            Ok::<_, Error>(pods.is_empty())
        })
        .await?;
        if outcome == WaitState::TimedOut {
            return Err(Error::deadline_exceeded("waiting for job's pods deletion"));
        }

        info!(job = %name, namespace = %namespace, "job killed, definition preserved");
        Ok(())
    }

    /// Raw status passthrough, no derived fields
    pub async fn status(&self, namespace: &str, name: &str) -> Result<JobStatus, Error> {
        let job = self.gateway.get_job(namespace, name).await?;
        Ok(job.status.unwrap_or_default())
    }
}
