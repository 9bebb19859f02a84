//! Tests for PID resolution from runtime inspection output.
//!
//! Each runtime returns a different JSON shape; these tests pin the
//! documented shapes, the crio fallback, and the zero-PID failure mode.

use netchaos::{Error, Runtime, resolve_pid};

// =============================================================================
// Docker Shape
// =============================================================================

#[test]
fn test_docker_pid_from_state() {
    let raw = br#"[{"Id":"abc","State":{"Status":"running","Pid":4242}}]"#;
    assert_eq!(resolve_pid(raw, Runtime::Docker).unwrap(), 4242);
}

#[test]
fn test_docker_zero_pid() {
    let raw = br#"[{"State":{"Pid":0}}]"#;
    let err = resolve_pid(raw, Runtime::Docker).unwrap_err();
    assert!(matches!(err, Error::PidNotFound));
}

#[test]
fn test_docker_empty_array() {
    let err = resolve_pid(b"[]", Runtime::Docker).unwrap_err();
    assert!(matches!(err, Error::PidNotFound));
}

#[test]
fn test_docker_object_instead_of_array() {
    let raw = br#"{"State":{"Pid":4242}}"#;
    let err = resolve_pid(raw, Runtime::Docker).unwrap_err();
    assert!(matches!(err, Error::InspectParseFailed { .. }));
}

// =============================================================================
// containerd Shape
// =============================================================================

#[test]
fn test_containerd_pid_from_network_namespace_path() {
    let raw = br#"{
        "info": {
            "runtimeSpec": {
                "linux": {
                    "namespaces": [
                        {"type": "pid"},
                        {"type": "ipc", "path": "/proc/77/ns/ipc"},
                        {"type": "network", "path": "/proc/77/ns/net"}
                    ]
                }
            }
        }
    }"#;
    assert_eq!(resolve_pid(raw, Runtime::Containerd).unwrap(), 77);
}

#[test]
fn test_containerd_without_network_namespace() {
    let raw = br#"{
        "info": {
            "runtimeSpec": {
                "linux": {"namespaces": [{"type": "pid"}]}
            }
        }
    }"#;
    let err = resolve_pid(raw, Runtime::Containerd).unwrap_err();
    assert!(matches!(err, Error::PidNotFound));
}

#[test]
fn test_containerd_unparseable_namespace_path() {
    let raw = br#"{
        "info": {
            "runtimeSpec": {
                "linux": {
                    "namespaces": [{"type": "network", "path": "not-a-proc-path"}]
                }
            }
        }
    }"#;
    let err = resolve_pid(raw, Runtime::Containerd).unwrap_err();
    assert!(matches!(err, Error::PidNotFound));
}

// =============================================================================
// crio Shapes
// =============================================================================

#[test]
fn test_crio_pid_at_top_level() {
    let raw = br#"{"pid": 590, "runtimeSpec": {}}"#;
    assert_eq!(resolve_pid(raw, Runtime::Crio).unwrap(), 590);
}

#[test]
fn test_crio_falls_back_to_wrapped_shape() {
    // No top-level pid: the same bytes are re-parsed under the crictl
    // wrapper and the nested pid wins.
    let raw = br#"{"status": {"state": "CONTAINER_RUNNING"}, "info": {"pid": 591}}"#;
    assert_eq!(resolve_pid(raw, Runtime::Crio).unwrap(), 591);
}

#[test]
fn test_crio_zero_pid_in_both_shapes() {
    let raw = br#"{"info":{"pid":0}}"#;
    let err = resolve_pid(raw, Runtime::Crio).unwrap_err();
    assert!(matches!(err, Error::PidNotFound));
}

// =============================================================================
// Parse Failures
// =============================================================================

#[test]
fn test_malformed_json_carries_raw_bytes() {
    let raw = b"Error: No such object: abc";
    let err = resolve_pid(raw, Runtime::Docker).unwrap_err();
    match err {
        Error::InspectParseFailed { raw: carried, .. } => {
            assert!(carried.contains("No such object"));
        }
        other => panic!("expected InspectParseFailed, got {other:?}"),
    }
}

#[test]
fn test_parse_failure_display_includes_raw() {
    let err = resolve_pid(b"not-json", Runtime::Crio).unwrap_err();
    let rendered = format!("{err}");
    assert!(rendered.contains("not-json"));
}
