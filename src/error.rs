//! Error types for the chaos helper.

/// Result type alias for chaos helper operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving a target container or programming
/// traffic control inside its network namespace.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Target Resolution Errors
    // =========================================================================
    /// Container runtime named in the configuration is not supported.
    #[error("container runtime not supported: {0}")]
    UnsupportedRuntime(String),

    /// Runtime inspection subprocess or cluster lookup failed.
    #[error("runtime probe failed for '{target}': {reason}")]
    RuntimeProbeFailed { target: String, reason: String },

    /// Inspection output did not match the expected JSON shape.
    ///
    /// Carries the raw bytes (lossy UTF-8) so the unexpected shape can be
    /// diagnosed from the logs.
    #[error("failed to parse inspect output: {reason}; raw: {raw}")]
    InspectParseFailed { reason: String, raw: String },

    /// Inspection succeeded but the resolved PID was zero or missing.
    #[error("no running target container found (pid 0)")]
    PidNotFound,

    // =========================================================================
    // Traffic Control Errors
    // =========================================================================
    /// A tc command in the injection phase returned non-zero.
    #[error("failed to inject network chaos: {0}")]
    InjectFailed(String),

    /// tc qdisc delete returned non-zero with non-benign stderr.
    #[error("failed to revert network chaos: {0}")]
    RevertFailed(String),

    // =========================================================================
    // External Errors
    // =========================================================================
    /// Cluster API request failed.
    #[error("cluster API request failed: {0}")]
    ClusterApi(#[from] kube::Error),

    /// Subprocess spawn or I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
