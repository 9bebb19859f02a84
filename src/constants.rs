//! Constants for the chaos helper.
//!
//! All defaults, retry bounds, and kernel message fragments are defined
//! here to ensure consistency and prevent magic numbers throughout the
//! codebase.

use std::time::Duration;

// =============================================================================
// Configuration Defaults
// =============================================================================

/// Network interface inside the target netns when `NETWORK_INTERFACE` is unset.
pub const DEFAULT_NETWORK_INTERFACE: &str = "eth0";

/// Chaos duration in seconds when `TOTAL_CHAOS_DURATION` is unset or
/// unparseable.
pub const DEFAULT_CHAOS_DURATION_SECS: u64 = 30;

/// Operator namespace when `CHAOS_NAMESPACE` is unset.
pub const DEFAULT_CHAOS_NAMESPACE: &str = "litmus";

// =============================================================================
// Revert Retry Policy
// =============================================================================

/// Number of revert attempts made by the abort watcher.
pub const REVERT_RETRY_ATTEMPTS: u32 = 3;

/// Delay between revert attempts in the abort path.
pub const REVERT_RETRY_DELAY: Duration = Duration::from_secs(1);

// =============================================================================
// Benign tc Output
// =============================================================================
//
// Deleting the root qdisc on an interface that never had one installed (or
// already had it removed by a concurrent revert) fails with one of these
// messages. Both mean "already clean" and are never surfaced as errors.

/// tc stderr when no qdisc handle exists on the interface.
pub const QDISC_NOT_FOUND: &str = "Cannot delete qdisc with handle of zero";

/// RTNETLINK stderr when the qdisc entry is already gone.
pub const QDISC_NO_FILE_FOUND: &str = "RTNETLINK answers: No such file or directory";
