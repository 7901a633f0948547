//! Error types for the job assistant

use thiserror::Error;

/// Main error type for job lifecycle operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// The target Job does not exist cluster-side
    #[error("job {namespace}/{name} not found")]
    NotFound {
        /// Namespace the Job was looked up in
        namespace: String,
        /// Name of the missing Job
        name: String,
    },

    /// Run was invoked while the Job is actively executing
    #[error("job is already running, wait for completion or attempt to kill it")]
    AlreadyRunning,

    /// A bounded wait or API call exceeded its timeout
    #[error("deadline exceeded while {0}")]
    DeadlineExceeded(String),
}

impl Error {
    /// Create a not-found error for the given Job identity
    pub fn not_found(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Create a deadline-exceeded error describing what was being waited on
    pub fn deadline_exceeded(what: impl Into<String>) -> Self {
        Self::DeadlineExceeded(what.into())
    }

    /// Whether this error means the target Job is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
