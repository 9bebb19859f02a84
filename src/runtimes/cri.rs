//! CRI inspection backend, shared by containerd and crio.
//!
//! The container id lookup bypasses the runtime entirely: the pod object in
//! the cluster API already carries runtime-prefixed container ids in
//! `status.containerStatuses[].containerID` (`<scheme>://<id>`). Only the
//! PID inspection goes through `crictl` against the node's CRI socket.

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::Api;
use tracing::{debug, info};

use crate::command::CommandRunner;
use crate::config::ExperimentConfig;
use crate::error::{Error, Result};
use crate::runtimes::ContainerInspector;

/// [`ContainerInspector`] for CRI runtimes (containerd, crio).
pub struct CriInspector {
    pod_namespace: String,
    pod_name: String,
    container_name: String,
    socket_path: String,
    client: kube::Client,
    runner: Arc<dyn CommandRunner>,
}

impl CriInspector {
    /// Creates a CRI inspector for the configured target.
    pub fn new(
        config: &ExperimentConfig,
        client: kube::Client,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            pod_namespace: config.app_namespace.clone(),
            pod_name: config.app_pod.clone(),
            container_name: config.app_container.clone(),
            socket_path: config.socket_path.clone(),
            client,
            runner,
        }
    }
}

#[async_trait]
impl ContainerInspector for CriInspector {
    async fn container_id(&self) -> Result<String> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &self.pod_namespace);
        let pod = pods.get(&self.pod_name).await?;

        let id = container_id_from_pod(&pod, &self.pod_name, &self.container_name)?;
        info!(container_id = %id, container = %self.container_name, "resolved target container");
        Ok(id)
    }

    async fn inspect(&self, container_id: &str) -> Result<Vec<u8>> {
        let endpoint = format!("unix://{}", self.socket_path);
        let args: Vec<String> = ["-i", &endpoint, "-r", &endpoint, "inspect", container_id]
            .iter()
            .map(ToString::to_string)
            .collect();

        debug!(command = %format!("crictl {}", args.join(" ")), "inspecting container");
        let out = self.runner.run("crictl", &args).await?;
        if !out.success() {
            return Err(Error::RuntimeProbeFailed {
                target: container_id.to_string(),
                reason: format!("crictl inspect failed: {}", out.combined()),
            });
        }

        Ok(out.stdout)
    }
}

/// Extracts the runtime container id for `container_name` from a pod object.
///
/// Container ids in pod status carry a runtime scheme prefix
/// (`containerd://abc123`); only the part after `//` is meaningful to
/// `crictl`.
pub(crate) fn container_id_from_pod(
    pod: &Pod,
    pod_name: &str,
    container_name: &str,
) -> Result<String> {
    let statuses = pod
        .status
        .as_ref()
        .and_then(|status| status.container_statuses.as_ref())
        .ok_or_else(|| Error::RuntimeProbeFailed {
            target: pod_name.to_string(),
            reason: "pod has no container statuses".to_string(),
        })?;

    let status = statuses
        .iter()
        .find(|status| status.name == container_name)
        .ok_or_else(|| Error::RuntimeProbeFailed {
            target: pod_name.to_string(),
            reason: format!("container '{container_name}' not found in pod status"),
        })?;

    let container_id = status
        .container_id
        .as_deref()
        .ok_or_else(|| Error::RuntimeProbeFailed {
            target: pod_name.to_string(),
            reason: format!("container '{container_name}' has no runtime id yet"),
        })?;

    let (_, id) = container_id
        .split_once("//")
        .ok_or_else(|| Error::RuntimeProbeFailed {
            target: pod_name.to_string(),
            reason: format!("malformed container id '{container_id}'"),
        })?;

    Ok(id.to_string())
}
