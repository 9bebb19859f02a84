//! Tests for environment-variable configuration.
//!
//! Validates defaults, empty-equals-unset semantics, duration fallback,
//! and runtime validation.

use std::collections::HashMap;

use netchaos::{Error, ExperimentConfig, Runtime};

fn config_from(vars: &[(&str, &str)]) -> netchaos::Result<ExperimentConfig> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ExperimentConfig::from_lookup(|key| map.get(key).cloned())
}

// =============================================================================
// Defaults
// =============================================================================

#[test]
fn test_defaults_applied() {
    let config = config_from(&[("CONTAINER_RUNTIME", "docker")]).unwrap();

    assert_eq!(config.network_interface, "eth0");
    assert_eq!(config.chaos_duration, 30);
    assert_eq!(config.chaos_namespace, "litmus");
    assert_eq!(config.experiment_name, "");
    assert_eq!(config.engine_name, "");
    assert_eq!(config.destination_ips, "");
    assert_eq!(config.netem_params, "");
}

#[test]
fn test_empty_value_treated_as_unset() {
    let config = config_from(&[
        ("CONTAINER_RUNTIME", "docker"),
        ("NETWORK_INTERFACE", ""),
        ("TOTAL_CHAOS_DURATION", ""),
        ("CHAOS_NAMESPACE", ""),
    ])
    .unwrap();

    assert_eq!(config.network_interface, "eth0");
    assert_eq!(config.chaos_duration, 30);
    assert_eq!(config.chaos_namespace, "litmus");
}

// =============================================================================
// Explicit Values
// =============================================================================

#[test]
fn test_explicit_values_override_defaults() {
    let config = config_from(&[
        ("EXPERIMENT_NAME", "pod-network-latency"),
        ("APP_NS", "shop"),
        ("APP_POD", "checkout-7d4b9"),
        ("APP_CONTAINER", "checkout"),
        ("TOTAL_CHAOS_DURATION", "45"),
        ("CHAOS_NAMESPACE", "ops"),
        ("CHAOS_ENGINE", "shop-engine"),
        ("CHAOS_UID", "uid-123"),
        ("POD_NAME", "helper-x"),
        ("CONTAINER_RUNTIME", "containerd"),
        ("NETWORK_INTERFACE", "ens3"),
        ("SOCKET_PATH", "/run/containerd/containerd.sock"),
        ("DESTINATION_IPS", "10.0.0.1,10.0.0.2"),
        ("NETEM_COMMAND", "delay 200ms 20ms distribution normal"),
    ])
    .unwrap();

    assert_eq!(config.experiment_name, "pod-network-latency");
    assert_eq!(config.app_namespace, "shop");
    assert_eq!(config.app_pod, "checkout-7d4b9");
    assert_eq!(config.app_container, "checkout");
    assert_eq!(config.chaos_duration, 45);
    assert_eq!(config.chaos_namespace, "ops");
    assert_eq!(config.engine_name, "shop-engine");
    assert_eq!(config.chaos_uid, "uid-123");
    assert_eq!(config.helper_pod_name, "helper-x");
    assert_eq!(config.runtime, Runtime::Containerd);
    assert_eq!(config.network_interface, "ens3");
    assert_eq!(config.socket_path, "/run/containerd/containerd.sock");
    assert_eq!(config.destination_ips, "10.0.0.1,10.0.0.2");
    // netem parameters pass through verbatim, never parsed
    assert_eq!(config.netem_params, "delay 200ms 20ms distribution normal");
}

#[test]
fn test_unparseable_duration_falls_back() {
    let config = config_from(&[
        ("CONTAINER_RUNTIME", "crio"),
        ("TOTAL_CHAOS_DURATION", "soon"),
    ])
    .unwrap();
    assert_eq!(config.chaos_duration, 30);
}

// =============================================================================
// Runtime Validation
// =============================================================================

#[test]
fn test_unsupported_runtime_rejected() {
    let err = config_from(&[("CONTAINER_RUNTIME", "rkt")]).unwrap_err();
    assert!(matches!(err, Error::UnsupportedRuntime(name) if name == "rkt"));
}

#[test]
fn test_missing_runtime_rejected() {
    let err = config_from(&[]).unwrap_err();
    assert!(matches!(err, Error::UnsupportedRuntime(_)));
}

#[test]
fn test_cluster_api_needed_per_runtime() {
    let docker = config_from(&[("CONTAINER_RUNTIME", "docker")]).unwrap();
    assert!(!docker.needs_cluster_api());

    let containerd = config_from(&[("CONTAINER_RUNTIME", "containerd")]).unwrap();
    assert!(containerd.needs_cluster_api());

    let crio = config_from(&[("CONTAINER_RUNTIME", "crio")]).unwrap();
    assert!(crio.needs_cluster_api());
}
