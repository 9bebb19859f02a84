//! PID resolution from runtime inspection output.
//!
//! The three runtimes return inspection JSON with nothing in common:
//!
//! | runtime    | shape                | PID location                           |
//! |------------|----------------------|----------------------------------------|
//! | docker     | array, first element | `[0].State.Pid`                        |
//! | containerd | object               | netns path in `info.runtimeSpec.linux.namespaces[]` |
//! | crio       | object               | `info.pid`, wrapper-shape fallback     |
//!
//! The shapes are kept as separate serde structs keyed on the runtime rather
//! than merged into one schema; the containerd branch additionally parses a
//! `/proc/<pid>/ns/net` path, which is isolated in
//! [`pid_from_netns_path`] because it is the brittle part.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::runtimes::Runtime;

// =============================================================================
// Inspection Shapes
// =============================================================================

/// One element of `docker inspect` output.
#[derive(Debug, Deserialize)]
struct DockerInspect {
    #[serde(rename = "State", default)]
    state: DockerState,
}

#[derive(Debug, Default, Deserialize)]
struct DockerState {
    #[serde(rename = "Pid", default)]
    pid: i64,
}

/// `crictl inspect` output under the `info` wrapper.
///
/// containerd nests the runtime spec here; crio nests its `pid` here when
/// the top-level shape carries none.
#[derive(Debug, Default, Deserialize)]
struct CrictlInspect {
    #[serde(default)]
    info: InspectInfo,
}

/// Inspection payload, also used as the crio top-level shape.
#[derive(Debug, Default, Deserialize)]
struct InspectInfo {
    #[serde(rename = "runtimeSpec", default)]
    runtime_spec: RuntimeSpec,
    #[serde(default)]
    pid: i64,
}

#[derive(Debug, Default, Deserialize)]
struct RuntimeSpec {
    #[serde(default)]
    linux: LinuxSpec,
}

#[derive(Debug, Default, Deserialize)]
struct LinuxSpec {
    #[serde(default)]
    namespaces: Vec<NamespaceRef>,
}

/// Linux namespace entry of the runtime spec.
#[derive(Debug, Default, Deserialize)]
struct NamespaceRef {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    path: String,
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolves the host PID of the target container's network namespace from
/// raw inspection bytes.
///
/// A PID of zero (or a missing one) means no running container and yields
/// [`Error::PidNotFound`]; bytes that do not match the runtime's shape yield
/// [`Error::InspectParseFailed`] carrying the raw output.
pub fn resolve_pid(raw: &[u8], runtime: Runtime) -> Result<u32> {
    let pid = match runtime {
        Runtime::Docker => {
            let entries: Vec<DockerInspect> =
                serde_json::from_slice(raw).map_err(|e| parse_failed(raw, &e))?;
            entries.first().map(|entry| entry.state.pid).unwrap_or(0)
        }
        Runtime::Containerd => {
            let resp: CrictlInspect =
                serde_json::from_slice(raw).map_err(|e| parse_failed(raw, &e))?;
            resp.info
                .runtime_spec
                .linux
                .namespaces
                .iter()
                .find(|ns| ns.kind == "network")
                .and_then(|ns| pid_from_netns_path(&ns.path))
                .unwrap_or(0)
        }
        Runtime::Crio => {
            let info: InspectInfo =
                serde_json::from_slice(raw).map_err(|e| parse_failed(raw, &e))?;
            if info.pid != 0 {
                info.pid
            } else {
                // Some crio versions nest the pid under the crictl wrapper
                // instead. Re-parse under that shape; the two shapes are
                // deliberately not merged.
                let resp: CrictlInspect =
                    serde_json::from_slice(raw).map_err(|e| parse_failed(raw, &e))?;
                resp.info.pid
            }
        }
    };

    u32::try_from(pid).ok().filter(|pid| *pid > 0).ok_or(Error::PidNotFound)
}

/// Extracts the PID from a `/proc/<pid>/ns/net` namespace path.
///
/// Returns `None` when the path is too short or the segment is not an
/// integer.
fn pid_from_netns_path(path: &str) -> Option<i64> {
    path.split('/').nth(2).and_then(|segment| segment.parse().ok())
}

fn parse_failed(raw: &[u8], err: &serde_json::Error) -> Error {
    Error::InspectParseFailed {
        reason: err.to_string(),
        raw: String::from_utf8_lossy(raw).into_owned(),
    }
}
