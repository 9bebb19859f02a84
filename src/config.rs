//! Environment-variable configuration for the chaos helper.
//!
//! The helper takes no CLI flags; the orchestrator passes everything through
//! the environment of the helper pod. Empty values fall back to defaults the
//! same way unset values do.

use crate::constants::{
    DEFAULT_CHAOS_DURATION_SECS, DEFAULT_CHAOS_NAMESPACE, DEFAULT_NETWORK_INTERFACE,
};
use crate::error::Result;
use crate::runtimes::Runtime;

/// Immutable configuration for one chaos run.
///
/// Built from the helper pod's environment via [`ExperimentConfig::from_env`].
/// Tests build it from an explicit lookup closure instead of mutating
/// process-wide environment state.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Experiment label used in events and logs (`EXPERIMENT_NAME`).
    pub experiment_name: String,
    /// Namespace of the target pod (`APP_NS`).
    pub app_namespace: String,
    /// Name of the target pod (`APP_POD`).
    pub app_pod: String,
    /// Target container within the pod (`APP_CONTAINER`).
    pub app_container: String,
    /// Application selector label, informational (`APP_LABEL`).
    pub app_label: String,
    /// Chaos duration in seconds (`TOTAL_CHAOS_DURATION`).
    pub chaos_duration: u64,
    /// Operator namespace holding the engine and events (`CHAOS_NAMESPACE`).
    pub chaos_namespace: String,
    /// Engine identifier; empty disables event emission (`CHAOS_ENGINE`).
    pub engine_name: String,
    /// Correlation id of the chaos run (`CHAOS_UID`).
    pub chaos_uid: String,
    /// This helper's own pod name, used as the event source (`POD_NAME`).
    pub helper_pod_name: String,
    /// Container runtime of the target node (`CONTAINER_RUNTIME`).
    pub runtime: Runtime,
    /// Interface inside the target netns (`NETWORK_INTERFACE`).
    pub network_interface: String,
    /// Absolute path to the runtime's UNIX socket (`SOCKET_PATH`).
    pub socket_path: String,
    /// Comma-separated destination IPs; empty selects the global program
    /// (`DESTINATION_IPS`).
    pub destination_ips: String,
    /// Opaque netem parameter string passed verbatim to tc (`NETEM_COMMAND`).
    pub netem_params: String,
}

impl ExperimentConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration from an arbitrary key lookup.
    ///
    /// Fails only when `CONTAINER_RUNTIME` names an unsupported runtime;
    /// every other variable has a default.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let runtime: Runtime = var_or(&get, "CONTAINER_RUNTIME", "").parse()?;

        Ok(Self {
            experiment_name: var_or(&get, "EXPERIMENT_NAME", ""),
            app_namespace: var_or(&get, "APP_NS", ""),
            app_pod: var_or(&get, "APP_POD", ""),
            app_container: var_or(&get, "APP_CONTAINER", ""),
            app_label: var_or(&get, "APP_LABEL", ""),
            chaos_duration: var_or(&get, "TOTAL_CHAOS_DURATION", "")
                .parse()
                .unwrap_or(DEFAULT_CHAOS_DURATION_SECS),
            chaos_namespace: var_or(&get, "CHAOS_NAMESPACE", DEFAULT_CHAOS_NAMESPACE),
            engine_name: var_or(&get, "CHAOS_ENGINE", ""),
            chaos_uid: var_or(&get, "CHAOS_UID", ""),
            helper_pod_name: var_or(&get, "POD_NAME", ""),
            runtime,
            network_interface: var_or(&get, "NETWORK_INTERFACE", DEFAULT_NETWORK_INTERFACE),
            socket_path: var_or(&get, "SOCKET_PATH", ""),
            destination_ips: var_or(&get, "DESTINATION_IPS", ""),
            netem_params: var_or(&get, "NETEM_COMMAND", ""),
        })
    }

    /// Returns true when the runtime's container lookup goes through the
    /// cluster API rather than the runtime socket.
    pub fn needs_cluster_api(&self) -> bool {
        !matches!(self.runtime, Runtime::Docker)
    }
}

/// Fetches a variable, treating unset and empty identically.
fn var_or(get: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    match get(key) {
        Some(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}
