//! A single simulated annotator: state, behavior, network client and RNG.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{AgentError, AgentState, Behavior, BehaviorKind, Strategy, RECOVERED_ENERGY};
use crate::client::{BatchOutcome, TaskClient, TaskTransport};
use crate::config::AgentConfig;
use crate::task::{Decision, GroundTruth, Task};

/// One synthetic labeler.
///
/// # Invariants
/// - `state` is owned here and never shared with another annotator
/// - All mutating operations take `&mut self`, so deciding and taking a
///   break can never overlap on the same annotator
pub struct Annotator {
    state: AgentState,
    behavior: Behavior,
    client: TaskClient,
    config: AgentConfig,
    rng: StdRng,
}

impl Annotator {
    /// Create an annotator talking HTTP to `config.api_url`.
    ///
    /// With `seed == None` the behavior draws from OS entropy.
    pub fn new(
        name: impl Into<String>,
        kind: BehaviorKind,
        config: AgentConfig,
        seed: Option<u64>,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        let name = name.into();
        let client = TaskClient::new(&config, name.clone())?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self::assemble(name, kind, config, client, rng))
    }

    /// Create an annotator over an arbitrary transport with a fixed seed.
    pub fn with_transport(
        name: impl Into<String>,
        kind: BehaviorKind,
        config: AgentConfig,
        transport: Arc<dyn TaskTransport>,
        seed: u64,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        let name = name.into();
        let client = TaskClient::with_transport(transport, &config, name.clone());
        Ok(Self::assemble(
            name,
            kind,
            config,
            client,
            StdRng::seed_from_u64(seed),
        ))
    }

    fn assemble(
        name: String,
        kind: BehaviorKind,
        config: AgentConfig,
        client: TaskClient,
        rng: StdRng,
    ) -> Self {
        tracing::debug!("[{}] created {} annotator", name, kind);
        Self {
            state: AgentState::new(name),
            behavior: Behavior::new(kind, config.labels.clone()),
            client,
            config,
            rng,
        }
    }

    /// Start from a specific energy level instead of full.
    pub fn with_energy(mut self, energy: u32) -> Self {
        self.state.set_energy(energy);
        self
    }

    pub fn name(&self) -> &str {
        self.state.name()
    }

    pub fn kind(&self) -> BehaviorKind {
        self.behavior.kind()
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Decide one task. Never suspends.
    pub fn decide(&mut self, task: &Task, truth: &GroundTruth) -> Decision {
        self.behavior
            .decide(&mut self.state, task, truth, &mut self.rng)
    }

    /// Fetch the next batch, keeping the retry outcome.
    pub async fn fetch(&self, max_retries: u32) -> BatchOutcome {
        self.client
            .fetch_batch(self.config.dataset_id.as_deref(), max_retries)
            .await
    }

    /// Fetch the next batch; an exhausted fetch yields no tasks.
    pub async fn fetch_batch(&self, max_retries: u32) -> Vec<Task> {
        self.fetch(max_retries).await.into_tasks()
    }

    /// Submit a decision. Returns whether the server accepted it; only an
    /// accepted submission counts as completed.
    pub async fn submit_task(&mut self, task: &Task, decision: &Decision) -> bool {
        let accepted = self.client.submit_task(task, decision).await.is_accepted();
        if accepted {
            self.state.record_completion();
        }
        accepted
    }

    /// Take a break: pause for the configured duration, then come back at
    /// `RECOVERED_ENERGY` regardless of the level before the break.
    pub async fn mark_break(&mut self) {
        tracing::info!(
            "[{}] taking a break at energy {}",
            self.name(),
            self.state.energy()
        );
        tokio::time::sleep(self.config.break_duration).await;
        self.state.set_energy(RECOVERED_ENERGY);
        tracing::info!(
            "[{}] back to work, energy at {}",
            self.name(),
            self.state.energy()
        );
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::client::testing::ScriptedTransport;

    fn annotator(kind: BehaviorKind, transport: Arc<ScriptedTransport>) -> Annotator {
        Annotator::with_transport("alice", kind, AgentConfig::default(), transport, 7).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_resets_energy_to_exactly_recovered_level() {
        for start in [0u32, 10, 79, 80, 95, 100] {
            let mut agent = annotator(BehaviorKind::Fatigued, Arc::new(ScriptedTransport::new()))
                .with_energy(start);
            let before = tokio::time::Instant::now();
            agent.mark_break().await;
            assert_eq!(agent.state().energy(), RECOVERED_ENERGY, "start energy {start}");
            assert!(before.elapsed() >= Duration::from_millis(3000));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_duration_is_configurable() {
        let config = AgentConfig::default().with_break_duration(Duration::from_millis(250));
        let mut agent = Annotator::with_transport(
            "carol",
            BehaviorKind::Fatigued,
            config,
            Arc::new(ScriptedTransport::new()),
            3,
        )
        .unwrap()
        .with_energy(40);
        let before = tokio::time::Instant::now();
        agent.mark_break().await;
        let took = before.elapsed();
        assert!(took >= Duration::from_millis(250) && took < Duration::from_millis(3000));
        assert_eq!(agent.state().energy(), RECOVERED_ENERGY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_keeps_completed_count() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut agent = annotator(BehaviorKind::Fatigued, transport);
        let task = Task::new("t", "a b c");
        let decision = agent.decide(&task, &GroundTruth::new("Positive"));
        assert!(agent.submit_task(&task, &decision).await);
        agent.mark_break().await;
        assert_eq!(agent.state().tasks_completed(), 1);
    }

    #[tokio::test]
    async fn test_failed_submit_leaves_counter_unchanged() {
        let transport = Arc::new(ScriptedTransport::always_failing());
        let mut agent = annotator(BehaviorKind::Honest, transport);
        let task = Task::new("t", "a b c");
        let decision = agent.decide(&task, &GroundTruth::new("Positive"));
        assert!(!agent.submit_task(&task, &decision).await);
        assert_eq!(agent.state().tasks_completed(), 0);
    }

    #[tokio::test]
    async fn test_accepted_submit_counts_once() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut agent = annotator(BehaviorKind::Spammer, transport.clone());
        for i in 0..3 {
            let task = Task::new(format!("t{i}"), "x");
            let decision = agent.decide(&task, &GroundTruth::new("Negative"));
            agent.submit_task(&task, &decision).await;
        }
        assert_eq!(agent.state().tasks_completed(), 3);
        let ids: Vec<String> = transport.submissions().into_iter().map(|s| s.task_id).collect();
        assert_eq!(ids, vec!["t0", "t1", "t2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_degrades_to_empty_batch() {
        let transport = Arc::new(ScriptedTransport::always_failing());
        let agent = annotator(BehaviorKind::Honest, transport.clone());
        assert!(agent.fetch_batch(3).await.is_empty());
        assert_eq!(transport.fetch_calls().len(), 3);
    }

    #[test]
    fn test_same_seed_same_decisions() {
        let task = Task::new("t", "the quick brown fox jumps");
        let truth = GroundTruth::new("Positive");
        let mut a = annotator(BehaviorKind::Fatigued, Arc::new(ScriptedTransport::new()));
        let mut b = annotator(BehaviorKind::Fatigued, Arc::new(ScriptedTransport::new()));
        for _ in 0..20 {
            assert_eq!(a.decide(&task, &truth), b.decide(&task, &truth));
        }
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_only_fatigued_drains_energy() {
        let task = Task::new("t", "x y");
        let truth = GroundTruth::new("Positive");
        for kind in [BehaviorKind::Honest, BehaviorKind::Spammer] {
            let mut agent = annotator(kind, Arc::new(ScriptedTransport::new()));
            for _ in 0..10 {
                agent.decide(&task, &truth);
            }
            assert_eq!(agent.state().energy(), 100);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AgentConfig {
            labels: Vec::new(),
            ..AgentConfig::default()
        };
        let result = Annotator::with_transport(
            "bob",
            BehaviorKind::Honest,
            config,
            Arc::new(ScriptedTransport::new()),
            1,
        );
        assert!(matches!(result, Err(AgentError::Config(_))));
    }
}
