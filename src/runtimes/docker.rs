//! Docker inspection backend.
//!
//! Talks to the node's docker daemon through the docker CLI with an explicit
//! `--host` pointing at the configured UNIX socket.
//!
//! The container id resolved here is the pod's *pause* container (name
//! `k8s_POD_<pod>_<ns>...`), not the named app container. Every container in
//! a pod joins the pause container's network namespace, so its PID is the
//! right one to enter. This is intentional and must not be "fixed" to
//! inspect the app container instead.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::command::CommandRunner;
use crate::config::ExperimentConfig;
use crate::error::{Error, Result};
use crate::runtimes::ContainerInspector;

/// [`ContainerInspector`] backed by the docker CLI.
pub struct DockerInspector {
    pod_namespace: String,
    pod_name: String,
    socket_path: String,
    runner: Arc<dyn CommandRunner>,
}

impl DockerInspector {
    /// Creates a docker inspector for the configured target.
    pub fn new(config: &ExperimentConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            pod_namespace: config.app_namespace.clone(),
            pod_name: config.app_pod.clone(),
            socket_path: config.socket_path.clone(),
            runner,
        }
    }

    fn host(&self) -> String {
        format!("unix://{}", self.socket_path)
    }
}

#[async_trait]
impl ContainerInspector for DockerInspector {
    async fn container_id(&self) -> Result<String> {
        // kubelet names the pause container k8s_POD_<pod>_<namespace>_<uid>_<attempt>.
        let filter = format!("name=^k8s_POD_{}_{}", self.pod_name, self.pod_namespace);
        let args: Vec<String> = [
            "--host",
            &self.host(),
            "ps",
            "--filter",
            &filter,
            "--format",
            "{{.ID}}",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        debug!(command = %format!("docker {}", args.join(" ")), "listing pause container");
        let out = self.runner.run("docker", &args).await?;
        if !out.success() {
            return Err(Error::RuntimeProbeFailed {
                target: self.pod_name.clone(),
                reason: format!("docker ps failed: {}", out.combined()),
            });
        }

        let stdout = out.stdout_text();
        let id = stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| Error::RuntimeProbeFailed {
                target: self.pod_name.clone(),
                reason: "no pause container matched the target pod".to_string(),
            })?
            .to_string();

        info!(container_id = %id, "resolved pause container");
        Ok(id)
    }

    async fn inspect(&self, container_id: &str) -> Result<Vec<u8>> {
        let args: Vec<String> = ["--host", &self.host(), "inspect", container_id]
            .iter()
            .map(ToString::to_string)
            .collect();

        debug!(command = %format!("docker {}", args.join(" ")), "inspecting container");
        let out = self.runner.run("docker", &args).await?;
        if !out.success() {
            return Err(Error::RuntimeProbeFailed {
                target: container_id.to_string(),
                reason: format!("docker inspect failed: {}", out.combined()),
            });
        }

        Ok(out.stdout)
    }
}
