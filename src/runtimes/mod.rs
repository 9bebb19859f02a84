//! Runtime inspection backends.
//!
//! Resolving a target container to a host PID requires runtime-specific
//! plumbing: docker is inspected through its own CLI against the node's
//! UNIX socket, while containerd and crio share the CRI inspection path
//! (`crictl`) with the container id coming from the pod object in the
//! cluster API. Each backend implements [`ContainerInspector`]; the
//! lifecycle never sees which one it is talking to.

mod cri;
mod docker;

pub use cri::CriInspector;
pub use docker::DockerInspector;

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::command::CommandRunner;
use crate::config::ExperimentConfig;
use crate::error::{Error, Result};

// =============================================================================
// Runtime
// =============================================================================

/// Container runtime of the node hosting the target pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    /// Docker engine, inspected via the docker CLI.
    Docker,
    /// containerd, inspected via crictl.
    Containerd,
    /// CRI-O, inspected via crictl.
    Crio,
}

impl FromStr for Runtime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "docker" => Ok(Self::Docker),
            "containerd" => Ok(Self::Containerd),
            "crio" => Ok(Self::Crio),
            other => Err(Error::UnsupportedRuntime(other.to_string())),
        }
    }
}

impl std::fmt::Display for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Docker => write!(f, "docker"),
            Self::Containerd => write!(f, "containerd"),
            Self::Crio => write!(f, "crio"),
        }
    }
}

// =============================================================================
// Inspection Seam
// =============================================================================

/// Resolves a target container and fetches its raw inspection output.
///
/// `container_id` finds the container to inspect; `inspect` returns the raw
/// JSON bytes whose shape is runtime-specific and parsed by
/// [`crate::inspect::resolve_pid`].
#[async_trait]
pub trait ContainerInspector: Send + Sync {
    /// Resolves the id of the container whose netns will be entered.
    async fn container_id(&self) -> Result<String>;

    /// Returns the raw inspection JSON for `container_id`.
    async fn inspect(&self, container_id: &str) -> Result<Vec<u8>>;
}

/// Builds the inspector matching the configured runtime.
///
/// containerd and crio look containers up through the cluster API, so they
/// require a client; docker does not.
pub fn inspector_for(
    config: &ExperimentConfig,
    client: Option<kube::Client>,
    runner: Arc<dyn CommandRunner>,
) -> Result<Box<dyn ContainerInspector>> {
    match config.runtime {
        Runtime::Docker => Ok(Box::new(DockerInspector::new(config, runner))),
        Runtime::Containerd | Runtime::Crio => {
            let client = client.ok_or_else(|| Error::RuntimeProbeFailed {
                target: config.app_pod.clone(),
                reason: format!(
                    "cluster API client required for {} container lookup",
                    config.runtime
                ),
            })?;
            Ok(Box::new(CriInspector::new(config, client, runner)))
        }
    }
}
