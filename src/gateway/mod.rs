//! Narrow capability surface over the Kubernetes API.
//!
//! The gateway owns transport only: get/list/create/update/patch/delete of
//! Job resources by namespace+name, plus label-selector list/delete of their
//! pods. All lifecycle logic lives in the controller; this trait exists so
//! that logic can be unit tested against a mock instead of a live cluster.
//!
//! Every call is bounded by the gateway's call timeout and surfaces
//! `DeadlineExceeded` instead of blocking indefinitely. A 404 on get or
//! delete maps to `Error::NotFound` so callers can treat absence as a state
//! rather than parse API error codes.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::Client;
#[cfg(test)]
use mockall::automock;

use crate::error::Error;

/// Default bound on any single Kubernetes API call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(20);

/// Capability surface the lifecycle controller needs from the orchestrator
#[cfg_attr(test, automock)]
#[async_trait]
pub trait JobGateway: Send + Sync {
    /// Fetch one Job by identity
    async fn get_job(&self, namespace: &str, name: &str) -> Result<Job, Error>;

    /// List Jobs across all namespaces, in API server order
    async fn list_jobs(&self) -> Result<Vec<Job>, Error>;

    /// Submit a Job definition as a fresh create
    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job, Error>;

    /// Whole-object replace; `job` must carry the latest resourceVersion so
    /// concurrent external edits are not silently clobbered
    async fn update_job(&self, namespace: &str, job: &Job) -> Result<Job, Error>;

    /// Merge-patch of the single `spec.suspend` field
    async fn suspend_job(&self, namespace: &str, name: &str, suspend: bool) -> Result<Job, Error>;

    /// Delete with foreground propagation: dependents are gone before the
    /// Job itself disappears from reads
    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), Error>;

    /// List pods matching a label selector
    async fn list_pods_by_label(&self, namespace: &str, selector: &str)
        -> Result<Vec<Pod>, Error>;

    /// Delete all pods matching a label selector
    async fn delete_pods_by_label(&self, namespace: &str, selector: &str) -> Result<(), Error>;
}

/// Gateway backed by a real cluster connection
#[derive(Clone)]
pub struct KubeJobGateway {
    client: Client,
    call_timeout: Duration,
}

impl KubeJobGateway {
    /// Create a gateway with the default 20 s per-call bound
    pub fn new(client: Client) -> Self {
        Self::with_timeout(client, DEFAULT_CALL_TIMEOUT)
    }

    /// Create a gateway with an explicit per-call bound
    pub fn with_timeout(client: Client, call_timeout: Duration) -> Self {
        Self {
            client,
            call_timeout,
        }
    }

    fn jobs(&self, namespace: &str) -> Api<Job> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Bound `fut` by the call timeout, mapping expiry to DeadlineExceeded
    async fn bounded<T, F>(&self, what: &str, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, kube::Error>>,
    {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result.map_err(Error::from),
            Err(_) => Err(Error::deadline_exceeded(what.to_string())),
        }
    }
}

fn is_api_not_found(err: &Error) -> bool {
    matches!(err, Error::Kube(kube::Error::Api(ae)) if ae.code == 404)
}

/// Replace a 404 API error with the richer NotFound variant
fn map_not_found(err: Error, namespace: &str, name: &str) -> Error {
    if is_api_not_found(&err) {
        Error::not_found(namespace, name)
    } else {
        err
    }
}

#[async_trait]
impl JobGateway for KubeJobGateway {
    async fn get_job(&self, namespace: &str, name: &str) -> Result<Job, Error> {
        self.bounded("getting job", self.jobs(namespace).get(name))
            .await
            .map_err(|e| map_not_found(e, namespace, name))
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, Error> {
        let api: Api<Job> = Api::all(self.client.clone());
        let list = self
            .bounded("listing jobs", api.list(&ListParams::default()))
            .await?;
        Ok(list.items)
    }

    async fn create_job(&self, namespace: &str, job: &Job) -> Result<Job, Error> {
        self.bounded(
            "creating job",
            self.jobs(namespace).create(&PostParams::default(), job),
        )
        .await
    }

    async fn update_job(&self, namespace: &str, job: &Job) -> Result<Job, Error> {
        let name = job.metadata.name.as_deref().unwrap_or_default();
        self.bounded(
            "updating job",
            self.jobs(namespace).replace(name, &PostParams::default(), job),
        )
        .await
    }

    async fn suspend_job(&self, namespace: &str, name: &str, suspend: bool) -> Result<Job, Error> {
        let patch = serde_json::json!({ "spec": { "suspend": suspend } });
        self.bounded(
            "patching job suspend flag",
            self.jobs(namespace)
                .patch(name, &PatchParams::default(), &Patch::Merge(&patch)),
        )
        .await
    }

    async fn delete_job(&self, namespace: &str, name: &str) -> Result<(), Error> {
        self.bounded(
            "deleting job",
            self.jobs(namespace).delete(name, &DeleteParams::foreground()),
        )
        .await
        .map(|_| ())
        .map_err(|e| map_not_found(e, namespace, name))
    }

    async fn list_pods_by_label(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<Pod>, Error> {
        let params = ListParams::default().labels(selector);
        let list = self
            .bounded("listing pods", self.pods(namespace).list(&params))
            .await?;
        Ok(list.items)
    }

    async fn delete_pods_by_label(&self, namespace: &str, selector: &str) -> Result<(), Error> {
        let params = ListParams::default().labels(selector);
        self.bounded(
            "deleting pods",
            self.pods(namespace)
                .delete_collection(&DeleteParams::default(), &params),
        )
        .await
        .map(|_| ())
    }
}
