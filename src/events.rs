//! Chaos event emission and terminal result reporting.
//!
//! One `ChaosInject` event is written against the engine object when the
//! experiment starts; a structured result record is logged when it ends.
//! Both are write-only and best-effort: a failed event never aborts the
//! chaos run.

use chrono::Utc;
use k8s_openapi::api::core::v1::{Event, EventSource, ObjectReference};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use kube::api::{Api, PostParams};
use tracing::info;

use crate::config::ExperimentConfig;
use crate::error::Result;

/// Terminal outcome of a chaos run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Injection and revert completed cleanly.
    Pass,
    /// The run failed or was aborted.
    Fail,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "Pass"),
            Self::Fail => write!(f, "Fail"),
        }
    }
}

/// Writes chaos events against the engine object in the operator namespace.
pub struct EventReporter {
    events: Api<Event>,
    chaos_namespace: String,
    experiment_name: String,
    engine_name: String,
    chaos_uid: String,
    helper_pod_name: String,
}

impl EventReporter {
    /// Creates a reporter scoped to the configured operator namespace.
    pub fn new(client: kube::Client, config: &ExperimentConfig) -> Self {
        Self {
            events: Api::namespaced(client, &config.chaos_namespace),
            chaos_namespace: config.chaos_namespace.clone(),
            experiment_name: config.experiment_name.clone(),
            engine_name: config.engine_name.clone(),
            chaos_uid: config.chaos_uid.clone(),
            helper_pod_name: config.helper_pod_name.clone(),
        }
    }

    /// Emits the `ChaosInject` event announcing the start of injection.
    pub async fn chaos_injected(&self) -> Result<()> {
        let now = Utc::now();
        let message = format!(
            "Injecting {} chaos on application pod",
            self.experiment_name
        );

        let event = Event {
            metadata: ObjectMeta {
                name: Some(format!(
                    "{}.{:x}",
                    self.engine_name,
                    now.timestamp_nanos_opt().unwrap_or_default()
                )),
                namespace: Some(self.chaos_namespace.clone()),
                ..Default::default()
            },
            involved_object: ObjectReference {
                kind: Some("ChaosEngine".to_string()),
                name: Some(self.engine_name.clone()),
                namespace: Some(self.chaos_namespace.clone()),
                uid: non_empty(&self.chaos_uid),
                ..Default::default()
            },
            reason: Some("ChaosInject".to_string()),
            message: Some(message),
            type_: Some("Normal".to_string()),
            source: Some(EventSource {
                component: non_empty(&self.helper_pod_name),
                host: None,
            }),
            first_timestamp: Some(Time(now)),
            last_timestamp: Some(Time(now)),
            count: Some(1),
            ..Default::default()
        };

        self.events.create(&PostParams::default(), &event).await?;
        info!(engine = %self.engine_name, "chaos inject event emitted");
        Ok(())
    }
}

/// Logs the structured completion record for the run.
pub fn log_result(config: &ExperimentConfig, verdict: Verdict) {
    info!(
        experiment = %config.experiment_name,
        engine = %config.engine_name,
        pod = %config.app_pod,
        verdict = %verdict,
        "chaos experiment finished"
    );
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
