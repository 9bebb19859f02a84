//! Network chaos helper binary.
//!
//! Runs as a privileged helper pod on the target's node. All configuration
//! comes from the environment (no CLI flags); see
//! [`netchaos::ExperimentConfig`] for the variable set. Exits 0 on a clean
//! run, 1 on any failure or signal-triggered abort.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};

use netchaos::{
    ChaosLifecycle, CommandRunner, EventReporter, ExperimentConfig, ProcessRunner, ShutdownSignal,
    Verdict, inspector_for, log_result,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match ExperimentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid helper configuration");
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        experiment = %config.experiment_name,
        pod = %config.app_pod,
        runtime = %config.runtime,
        "network chaos helper starting"
    );

    // Signals must be wired before any work so an early SIGTERM is not lost.
    let shutdown = ShutdownSignal::new();
    if let Err(e) = shutdown.install_handlers() {
        error!(error = %e, "failed to install signal handlers");
        return ExitCode::FAILURE;
    }

    // The cluster API is mandatory for CRI container lookup but only
    // best-effort for event emission.
    let wants_events = !config.engine_name.is_empty();
    let client = if config.needs_cluster_api() || wants_events {
        match kube::Client::try_default().await {
            Ok(client) => Some(client),
            Err(e) if config.needs_cluster_api() => {
                error!(error = %e, runtime = %config.runtime, "cluster API client required");
                return ExitCode::FAILURE;
            }
            Err(e) => {
                warn!(error = %e, "cluster API unavailable, chaos events will not be emitted");
                None
            }
        }
    } else {
        None
    };

    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::new());
    let inspector = match inspector_for(&config, client.clone(), Arc::clone(&runner)) {
        Ok(inspector) => inspector,
        Err(e) => {
            error!(error = %e, "failed to build runtime inspector");
            return ExitCode::FAILURE;
        }
    };

    let reporter = client
        .filter(|_| wants_events)
        .map(|client| EventReporter::new(client, &config));

    let lifecycle = ChaosLifecycle::new(config.clone(), inspector, runner, reporter, &shutdown);
    match lifecycle.run().await {
        Ok(()) => {
            log_result(&config, Verdict::Pass);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "helper pod failed");
            log_result(&config, Verdict::Fail);
            ExitCode::FAILURE
        }
    }
}
