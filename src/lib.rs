//! # netchaos
//!
//! **Network chaos helper for containerized workloads**
//!
//! Given a target container on the local node, this crate resolves the
//! container to a host PID, enters its network namespace, and applies
//! tc/netem impairments (latency, loss, corruption, duplication, reorder,
//! bandwidth limits) for a bounded duration, then reverts them. Reverts are
//! guaranteed on every exit path, including termination signals.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                           netchaos                                 │
//! ├────────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────────────────────────────────────────┐      │
//! │  │                   ChaosLifecycle                         │      │
//! │  │  resolve → emit event → inject → wait → revert           │      │
//! │  └──────┬──────────────────┬──────────────────┬─────────────┘      │
//! │         │                  │                  │                    │
//! │  ┌──────┴────────┐  ┌──────┴───────┐  ┌───────┴────────┐           │
//! │  │ Runtime Probe │  │ PID Resolver │  │ TC Programmer  │           │
//! │  │ docker / CRI  │  │ 3 JSON shapes│  │ nsenter + tc   │           │
//! │  └───────────────┘  └──────────────┘  └────────────────┘           │
//! │                                                                    │
//! │  AbortWatcher ── SIGTERM/SIGINT ──► revert ×3 ──► exit(1)          │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Revert Guarantee
//!
//! The controller and a background abort watcher subscribe to the same
//! termination-signal broadcast. Whichever path runs, the root qdisc on the
//! target interface is deleted before the process exits; an already-clean
//! interface is treated as success, so concurrent reverts are harmless.
//!
//! # Scope
//!
//! The helper does not discover targets, model impairment effects, support
//! non-Linux hosts, or filter IPv6 destinations. IPv6 entries in the
//! destination list are silently dropped.

mod command;
mod config;
mod constants;
mod error;
mod events;
mod inspect;
mod lifecycle;
mod runtimes;
mod tc;

pub use command::{CmdOutput, CommandRunner, ProcessRunner};
pub use config::ExperimentConfig;
pub use error::{Error, Result};
pub use events::{EventReporter, Verdict, log_result};
pub use inspect::resolve_pid;
pub use lifecycle::{ChaosLifecycle, Phase, ShutdownSignal};
pub use runtimes::{ContainerInspector, CriInspector, DockerInspector, Runtime, inspector_for};
pub use tc::{TcProgram, TcProgrammer};
