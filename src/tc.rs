//! Traffic-control programming inside the target network namespace.
//!
//! Two programs exist, chosen by whether destination IPs were supplied:
//!
//! - **Global**: a single netem qdisc replaces the interface root, impairing
//!   all traffic.
//! - **Filtered**: a prio root qdisc (bands 1:1, 1:2, 1:3), a netem qdisc
//!   under band 1:3, then one u32 filter per destination steering matching
//!   packets into that band. The three phases must run in this order; until
//!   the filters land, no traffic flows through the netem band.
//!
//! Injection uses `qdisc replace` so a retry against a half-configured
//! interface does not fail on an existing qdisc. Revert deletes the root
//! qdisc, which atomically removes all child classes and filters.
//!
//! All commands run inside the target netns via
//! `nsenter -t <pid> -n tc ...`.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::command::{CmdOutput, CommandRunner};
use crate::constants::{
    QDISC_NO_FILE_FOUND, QDISC_NOT_FOUND, REVERT_RETRY_ATTEMPTS, REVERT_RETRY_DELAY,
};
use crate::error::{Error, Result};

// =============================================================================
// Program Construction
// =============================================================================

/// A tc program to install on the target interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TcProgram {
    /// Impair all destinations.
    Global {
        /// Opaque netem parameter string, e.g. `delay 200ms`.
        netem_params: String,
    },
    /// Impair traffic to specific IPv4 destinations only.
    Filtered {
        /// Opaque netem parameter string.
        netem_params: String,
        /// Unique IPv4 destinations in first-occurrence order.
        destinations: Vec<String>,
    },
}

impl TcProgram {
    /// Chooses and builds the program for the given configuration.
    ///
    /// An empty `destination_ips` selects the global program. Otherwise the
    /// comma-separated list is deduplicated preserving first occurrence and
    /// IPv6 entries (anything containing `:`) are silently dropped; a list
    /// of only IPv6 entries still selects the filtered program, which then
    /// installs no filters.
    pub fn from_params(netem_params: &str, destination_ips: &str) -> Self {
        if destination_ips.is_empty() {
            return Self::Global {
                netem_params: netem_params.to_string(),
            };
        }

        Self::Filtered {
            netem_params: netem_params.to_string(),
            destinations: unique_ipv4s(destination_ips),
        }
    }

    /// Expands the program into ordered tc argument lists (without the
    /// nsenter prefix).
    pub fn inject_steps(&self, interface: &str) -> Vec<Vec<String>> {
        match self {
            Self::Global { netem_params } => {
                let mut step = argv(&["qdisc", "replace", "dev", interface, "root", "netem"]);
                step.extend(netem_params.split_whitespace().map(ToString::to_string));
                vec![step]
            }
            Self::Filtered {
                netem_params,
                destinations,
            } => {
                let mut steps = Vec::with_capacity(2 + destinations.len());

                // Priority root instantly creates classes 1:1, 1:2, 1:3.
                steps.push(argv(&[
                    "qdisc", "replace", "dev", interface, "root", "handle", "1:", "prio",
                ]));

                // netem under 1:3; no traffic flows there until filters land.
                let mut netem = argv(&["qdisc", "replace", "dev", interface, "parent", "1:3", "netem"]);
                netem.extend(netem_params.split_whitespace().map(ToString::to_string));
                steps.push(netem);

                for destination in destinations {
                    steps.push(argv(&[
                        "filter", "add", "dev", interface, "protocol", "ip", "parent", "1:0",
                        "prio", "3", "u32", "match", "ip", "dst", destination, "flowid", "1:3",
                    ]));
                }

                steps
            }
        }
    }
}

/// Deduplicates a comma-separated IP list preserving first occurrence,
/// dropping IPv6 entries and empty segments.
fn unique_ipv4s(destination_ips: &str) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for ip in destination_ips.split(',').map(str::trim) {
        if ip.is_empty() || ip.contains(':') {
            continue;
        }
        if !unique.iter().any(|seen| seen == ip) {
            unique.push(ip.to_string());
        }
    }
    unique
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(ToString::to_string).collect()
}

// =============================================================================
// Programmer
// =============================================================================

/// Installs and removes tc programs inside the target netns.
#[derive(Clone)]
pub struct TcProgrammer {
    runner: Arc<dyn CommandRunner>,
    pid: u32,
    interface: String,
}

impl TcProgrammer {
    /// Creates a programmer for the netns of `pid` and the given interface.
    pub fn new(runner: Arc<dyn CommandRunner>, pid: u32, interface: impl Into<String>) -> Self {
        Self {
            runner,
            pid,
            interface: interface.into(),
        }
    }

    /// Runs one tc command inside the target netns.
    async fn run_tc(&self, tc_args: Vec<String>) -> Result<CmdOutput> {
        let mut args = argv(&["-t", &self.pid.to_string(), "-n", "tc"]);
        args.extend(tc_args);
        info!(command = %format!("nsenter {}", args.join(" ")), "running tc command");
        self.runner.run("nsenter", &args).await
    }

    /// Installs the program, executing its steps strictly in order.
    ///
    /// A failing step aborts immediately; already-installed steps are left
    /// in place for the abort watcher or the normal revert to remove.
    pub async fn inject(&self, program: &TcProgram) -> Result<()> {
        for step in program.inject_steps(&self.interface) {
            let out = self.run_tc(step).await?;
            if !out.success() {
                return Err(Error::InjectFailed(out.combined()));
            }
        }
        Ok(())
    }

    /// Deletes the root qdisc, removing all child classes and filters.
    ///
    /// An already-clean interface is reported by tc with one of two known
    /// messages; both count as success so revert stays idempotent.
    pub async fn revert(&self) -> Result<()> {
        let out = self
            .run_tc(argv(&["qdisc", "delete", "dev", &self.interface, "root"]))
            .await?;

        if out.success() {
            return Ok(());
        }

        let combined = out.combined();
        if is_benign_revert_output(&combined) {
            warn!("network chaos was already removed");
            return Ok(());
        }

        Err(Error::RevertFailed(combined))
    }

    /// Abort-path revert: a fixed number of attempts with a fixed delay,
    /// logging every failure without breaking the loop.
    pub async fn revert_with_retry(&self) {
        for attempt in 1..=REVERT_RETRY_ATTEMPTS {
            if let Err(e) = self.revert().await {
                error!(attempt, error = %e, "unable to revert network chaos");
            }
            tokio::time::sleep(REVERT_RETRY_DELAY).await;
        }
    }
}

/// Classifies tc delete output that means "nothing to delete".
fn is_benign_revert_output(output: &str) -> bool {
    output.contains(QDISC_NOT_FOUND) || output.contains(QDISC_NO_FILE_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benign_output_classification() {
        assert!(is_benign_revert_output(
            "Cannot delete qdisc with handle of zero"
        ));
        assert!(is_benign_revert_output(
            "RTNETLINK answers: No such file or directory"
        ));
        assert!(!is_benign_revert_output("RTNETLINK answers: Operation not permitted"));
        assert!(!is_benign_revert_output(""));
    }

    #[test]
    fn test_unique_ipv4s_preserves_first_occurrence() {
        assert_eq!(
            unique_ipv4s("10.0.0.2,10.0.0.1,10.0.0.2"),
            vec!["10.0.0.2", "10.0.0.1"]
        );
    }

    #[test]
    fn test_unique_ipv4s_drops_ipv6_and_empty() {
        assert_eq!(
            unique_ipv4s("1.2.3.4,fe80::1,,5.6.7.8,"),
            vec!["1.2.3.4", "5.6.7.8"]
        );
        assert!(unique_ipv4s("::1,fe80::2").is_empty());
    }
}
