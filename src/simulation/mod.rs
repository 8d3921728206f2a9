//! Simulation driver - runs annotators against the task API.
//!
//! Each annotator is an independent sequential actor on its own tokio task:
//! fetch a batch, decide and submit each task in order, take a break when
//! tired, repeat until the batch comes back empty or `max_batches` is hit.
//! Annotators share nothing, so their submissions interleave freely.

mod report;

pub use report::{AnnotatorReport, SimulationReport};

use chrono::Utc;
use futures::future::join_all;
use uuid::Uuid;

use crate::agents::{AgentError, Annotator, RECOVERED_ENERGY};
use crate::config::{Config, ConfigError};

/// Driver loop settings.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Batches each annotator requests at most
    pub max_batches: u32,

    /// Fetch attempts per batch
    pub max_retries: u32,

    /// Take a break once energy falls below this level (never if unset)
    pub break_below_energy: Option<u32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_batches: 5,
            max_retries: 3,
            break_below_energy: None,
        }
    }
}

impl SimulationConfig {
    /// The break threshold must not exceed `RECOVERED_ENERGY`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.break_below_energy {
            Some(threshold) if threshold > RECOVERED_ENERGY => Err(ConfigError::InvalidValue(
                "SIM_BREAK_BELOW_ENERGY".to_string(),
                format!("{} exceeds the post-break energy {}", threshold, RECOVERED_ENERGY),
            )),
            _ => Ok(()),
        }
    }
}

/// Build the annotators named in `config`.
///
/// With a run seed, annotator `i` is seeded with `seed + i` so a run is
/// reproducible end to end.
pub fn build_annotators(config: &Config) -> Result<Vec<Annotator>, AgentError> {
    config
        .agents
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            Annotator::new(
                spec.name.clone(),
                spec.kind,
                config.agent.clone(),
                config.seed.map(|s| s.wrapping_add(i as u64)),
            )
        })
        .collect()
}

/// Drive one annotator to completion and report what it did.
pub async fn run_annotator(mut annotator: Annotator, config: &SimulationConfig) -> AnnotatorReport {
    let mut report = AnnotatorReport::new(annotator.name(), annotator.kind());

    for _ in 0..config.max_batches {
        let outcome = annotator.fetch(config.max_retries).await;
        report.batches += 1;
        if outcome.is_exhausted() {
            report.failed_fetches += 1;
        }

        let tasks = outcome.into_tasks();
        if tasks.is_empty() {
            tracing::info!("[{}] no more tasks", annotator.name());
            break;
        }

        for task in &tasks {
            let Some(truth) = task.oracle() else {
                tracing::warn!(
                    "[{}] task {} has no ground truth, skipping",
                    annotator.name(),
                    task.id
                );
                report.skipped += 1;
                continue;
            };

            let decision = annotator.decide(task, &truth);
            let accepted = annotator.submit_task(task, &decision).await;
            report.record(&decision, &truth, accepted);

            if let Some(threshold) = config.break_below_energy {
                if annotator.state().energy() < threshold {
                    annotator.mark_break().await;
                    report.breaks += 1;
                }
            }
        }
    }

    report.final_energy = annotator.state().energy();
    tracing::info!(
        "[{}] finished: {} decided, {} submitted, {:.1}s labor",
        report.name,
        report.decided,
        report.submitted,
        report.labor_cost_ms / 1000.0
    );
    report
}

/// Run every annotator in parallel and collect their reports.
///
/// Reports come back in the order the annotators were given. An annotator
/// whose task panicked is logged and left out.
pub async fn run_simulation(annotators: Vec<Annotator>, config: SimulationConfig) -> SimulationReport {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    tracing::info!("Simulation {} starting with {} annotators", run_id, annotators.len());

    let handles: Vec<_> = annotators
        .into_iter()
        .map(|annotator| {
            let config = config.clone();
            tokio::spawn(async move { run_annotator(annotator, &config).await })
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for result in join_all(handles).await {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => tracing::error!("Annotator task failed: {}", e),
        }
    }

    SimulationReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        annotators: reports,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::agents::{BehaviorKind, RECOVERED_ENERGY};
    use crate::client::testing::ScriptedTransport;
    use crate::client::ClientError;
    use crate::config::AgentConfig;
    use crate::task::Task;

    fn batch(prefix: &str, n: usize, truth: &str) -> Vec<Task> {
        (0..n)
            .map(|i| {
                Task::new(format!("{prefix}-{i}"), "one two three four five six seven eight nine ten")
                    .with_ground_truth(truth)
            })
            .collect()
    }

    fn annotator(name: &str, kind: BehaviorKind, transport: Arc<ScriptedTransport>) -> Annotator {
        let config = AgentConfig::default().with_dataset("ds-1");
        Annotator::with_transport(name, kind, config, transport, 17).unwrap()
    }

    #[test]
    fn test_break_threshold_above_recovered_energy_rejected() {
        let config = SimulationConfig {
            break_below_energy: Some(RECOVERED_ENERGY + 1),
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(key, _)) if key == "SIM_BREAK_BELOW_ENERGY"
        ));

        for threshold in [None, Some(0), Some(40), Some(RECOVERED_ENERGY)] {
            let config = SimulationConfig {
                break_below_energy: threshold,
                ..SimulationConfig::default()
            };
            assert!(config.validate().is_ok(), "threshold {threshold:?}");
        }
    }

    #[tokio::test]
    async fn test_runs_until_empty_batch() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_batch(batch("a", 4, "Positive"))
                .then_batch(batch("b", 3, "Negative")),
        );
        let report = run_annotator(
            annotator("alice", BehaviorKind::Honest, transport.clone()),
            &SimulationConfig::default(),
        )
        .await;

        assert_eq!(report.batches, 3);
        assert_eq!(report.failed_fetches, 0);
        assert_eq!(report.decided, 7);
        assert_eq!(report.submitted, 7);
        assert!(report.labor_cost_ms >= 7.0 * 3000.0);

        let ids: Vec<String> = transport.submissions().into_iter().map(|s| s.task_id).collect();
        assert_eq!(ids, vec!["a-0", "a-1", "a-2", "a-3", "b-0", "b-1", "b-2"]);
    }

    #[tokio::test]
    async fn test_stops_at_max_batches() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_batch(batch("a", 2, "Positive"))
                .then_batch(batch("b", 2, "Positive"))
                .then_batch(batch("c", 2, "Positive")),
        );
        let config = SimulationConfig {
            max_batches: 2,
            ..SimulationConfig::default()
        };
        let report = run_annotator(annotator("s", BehaviorKind::Spammer, transport), &config).await;
        assert_eq!(report.batches, 2);
        assert_eq!(report.decided, 4);
    }

    #[tokio::test]
    async fn test_tasks_without_oracle_are_skipped() {
        let mut tasks = batch("a", 2, "Positive");
        tasks.push(Task::new("no-truth", "text"));
        let transport = Arc::new(ScriptedTransport::new().then_batch(tasks));
        let report = run_annotator(
            annotator("h", BehaviorKind::Honest, transport.clone()),
            &SimulationConfig::default(),
        )
        .await;
        assert_eq!(report.skipped, 1);
        assert_eq!(report.decided, 2);
        assert!(transport.submissions().iter().all(|s| s.task_id != "no-truth"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_api_ends_run_quietly() {
        let transport = Arc::new(ScriptedTransport::always_failing());
        let report = run_annotator(
            annotator("h", BehaviorKind::Honest, transport.clone()),
            &SimulationConfig::default(),
        )
        .await;
        assert_eq!(report.batches, 1);
        assert_eq!(report.failed_fetches, 1);
        assert_eq!(report.decided, 0);
        assert_eq!(transport.fetch_calls().len(), 3);
    }

    #[tokio::test]
    async fn test_dropped_submissions_are_counted() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_batch(batch("a", 3, "Positive"))
                .failing_submits(ClientError::Network("reset".to_string())),
        );
        let report = run_annotator(
            annotator("h", BehaviorKind::Honest, transport),
            &SimulationConfig::default(),
        )
        .await;
        assert_eq!(report.decided, 3);
        assert_eq!(report.submitted, 0);
        assert_eq!(report.dropped, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatigued_annotator_takes_breaks() {
        let transport = Arc::new(ScriptedTransport::new().then_batch(batch("a", 30, "Positive")));
        let config = SimulationConfig {
            break_below_energy: Some(60),
            ..SimulationConfig::default()
        };
        let report = run_annotator(annotator("f", BehaviorKind::Fatigued, transport), &config).await;

        // 100 -> 58 after 21 decisions, break to 80, then 9 more decisions end at 62.
        assert_eq!(report.decided, 30);
        assert_eq!(report.breaks, 1);
        assert_eq!(report.final_energy, 62);
        assert!(report.final_energy < RECOVERED_ENERGY);
    }

    #[tokio::test]
    async fn test_parallel_run_keeps_annotator_order() {
        let kinds = [BehaviorKind::Honest, BehaviorKind::Fatigued, BehaviorKind::Spammer];
        let annotators: Vec<Annotator> = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                let transport = Arc::new(ScriptedTransport::new().then_batch(batch("t", 5, "Positive")));
                annotator(&format!("agent-{i}"), *kind, transport)
            })
            .collect();

        let report = run_simulation(annotators, SimulationConfig::default()).await;
        let names: Vec<&str> = report.annotators.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["agent-0", "agent-1", "agent-2"]);
        assert_eq!(report.tasks_annotated(), 15);
        assert!(report.finished_at >= report.started_at);
        assert_eq!(report.annotator("agent-1").unwrap().final_energy, 90);
    }
}
