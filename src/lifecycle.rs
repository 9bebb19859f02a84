//! Chaos lifecycle orchestration.
//!
//! The controller drives one run end to end:
//!
//! ```text
//! Init ──resolve──► Resolved ──inject──► Injected ──wait──► Reverting ──► Done
//!   │                  │                    │                   ▲
//!   └─fail──► Failed   └─fail──► Failed     └──abort────────────┘
//! ```
//!
//! Termination signals are wired into a single broadcast with two
//! subscribers: one polled exactly once immediately before the first tc
//! command (abort early without touching the interface), one consumed by
//! the background abort watcher, which reverts with retries and then
//! terminates the process. The watcher is spawned and forgotten; it never
//! coordinates with the normal path. Concurrent reverts are safe because
//! the revert command treats an already-clean interface as success.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::command::CommandRunner;
use crate::config::ExperimentConfig;
use crate::error::Result;
use crate::events::EventReporter;
use crate::inspect::resolve_pid;
use crate::runtimes::ContainerInspector;
use crate::tc::{TcProgram, TcProgrammer};

// =============================================================================
// Phase
// =============================================================================

/// Lifecycle phase of a chaos run.
///
/// Transitions are monotonic; `Injected → Reverting → Done` is reachable on
/// every exit path, normal or aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Signal handlers installed, nothing resolved yet.
    Init,
    /// Target container resolved to a host PID.
    Resolved,
    /// tc program installed on the target interface.
    Injected,
    /// Revert command issued.
    Reverting,
    /// Revert confirmed, run complete.
    Done,
    /// Run failed before or during injection.
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init => write!(f, "Init"),
            Self::Resolved => write!(f, "Resolved"),
            Self::Injected => write!(f, "Injected"),
            Self::Reverting => write!(f, "Reverting"),
            Self::Done => write!(f, "Done"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

// =============================================================================
// Signal Wiring
// =============================================================================

/// Broadcast source for OS termination signals.
///
/// One signal set feeds two logical streams: subscribe once for the
/// pre-inject poll and once for the abort watcher. Receivers only observe
/// signals arriving after they subscribe, so both subscriptions happen at
/// controller construction, before any work starts.
pub struct ShutdownSignal {
    tx: broadcast::Sender<()>,
}

impl ShutdownSignal {
    /// Creates the broadcast source.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribes a new receiver to the signal stream.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fires the signal, exactly as an OS termination signal would.
    pub fn notify(&self) {
        // Send fails only when no receiver is alive, which means nobody
        // is left to act on the signal anyway.
        let _ = self.tx.send(());
    }

    /// Installs SIGTERM and SIGINT handlers that relay into the broadcast.
    ///
    /// Must be called before any other work so that a signal arriving
    /// during target resolution is still observed.
    pub fn install_handlers(&self) -> Result<()> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let tx = self.tx.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
                let _ = tx.send(());
            }
        });

        Ok(())
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Lifecycle Controller
// =============================================================================

/// Drives one chaos run: resolve, inject, wait, revert.
pub struct ChaosLifecycle {
    config: ExperimentConfig,
    inspector: Box<dyn ContainerInspector>,
    runner: Arc<dyn CommandRunner>,
    reporter: Option<EventReporter>,
    inject_signal: broadcast::Receiver<()>,
    abort_signal: Option<broadcast::Receiver<()>>,
    phase: Phase,
}

impl ChaosLifecycle {
    /// Creates the controller, subscribing both signal streams immediately.
    pub fn new(
        config: ExperimentConfig,
        inspector: Box<dyn ContainerInspector>,
        runner: Arc<dyn CommandRunner>,
        reporter: Option<EventReporter>,
        shutdown: &ShutdownSignal,
    ) -> Self {
        Self {
            config,
            inspector,
            runner,
            reporter,
            inject_signal: shutdown.subscribe(),
            abort_signal: Some(shutdown.subscribe()),
            phase: Phase::Init,
        }
    }

    /// Runs the chaos lifecycle to completion.
    ///
    /// Failures before injection leave the interface untouched; an inject
    /// failure leaves any partially-installed state for the abort watcher
    /// or the operator to remove.
    pub async fn run(mut self) -> Result<()> {
        match self.execute().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.transition(Phase::Failed);
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> Result<()> {
        info!(
            pod = %self.config.app_pod,
            namespace = %self.config.app_namespace,
            container = %self.config.app_container,
            runtime = %self.config.runtime,
            "resolving target container"
        );
        let container_id = self.inspector.container_id().await?;
        let raw = self.inspector.inspect(&container_id).await?;
        let pid = resolve_pid(&raw, self.config.runtime)?;
        info!(container_id = %container_id, pid, "target container resolved");
        self.transition(Phase::Resolved);

        if let Some(reporter) = &self.reporter {
            if let Err(e) = reporter.chaos_injected().await {
                warn!(error = %e, "failed to emit chaos inject event");
            }
        }

        let programmer = TcProgrammer::new(
            Arc::clone(&self.runner),
            pid,
            self.config.network_interface.clone(),
        );

        if let Some(abort_signal) = self.abort_signal.take() {
            tokio::spawn(abort_watcher(abort_signal, programmer.clone()));
        }

        // A signal landing after this poll but before the first tc spawn is
        // handled by the abort watcher alone.
        if self.inject_signal.try_recv().is_ok() {
            warn!("termination signal received before injection, exiting");
            std::process::exit(1);
        }

        let program = TcProgram::from_params(&self.config.netem_params, &self.config.destination_ips);
        programmer.inject(&program).await?;
        self.transition(Phase::Injected);

        info!(
            duration_secs = self.config.chaos_duration,
            "waiting for chaos duration"
        );
        tokio::time::sleep(Duration::from_secs(self.config.chaos_duration)).await;

        info!("stopping the experiment");
        self.transition(Phase::Reverting);
        programmer.revert().await?;
        self.transition(Phase::Done);
        Ok(())
    }

    fn transition(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "phase transition");
        self.phase = phase;
    }
}

// =============================================================================
// Abort Watcher
// =============================================================================

/// Blocks on the abort stream; on signal, reverts with retries and
/// terminates the process.
///
/// The watcher is a hard preemption: it never advances the normal
/// lifecycle and the controller never joins it.
async fn abort_watcher(mut abort_signal: broadcast::Receiver<()>, programmer: TcProgrammer) {
    match abort_signal.recv().await {
        Ok(()) | Err(RecvError::Lagged(_)) => {}
        // Sender gone means the process is already tearing down normally.
        Err(RecvError::Closed) => return,
    }

    info!("termination signal received, starting chaos revert");
    programmer.revert_with_retry().await;
    info!("chaos revert completed");
    std::process::exit(1);
}
