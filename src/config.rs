//! Configuration management for the annotator simulation.
//!
//! Configuration can be set via environment variables:
//! - `SIM_API_URL` - Optional. Task API base URL. Defaults to `http://localhost:5000/api`.
//! - `SIM_LABELS` - Optional. Comma-separated label vocabulary. Defaults to `Positive,Negative`.
//! - `SIM_DATASET_ID` - Optional. Dataset/project to request tasks from.
//! - `SIM_AGENTS` - Optional. Comma-separated `behavior:name` pairs with
//!   distinct names. Defaults to `honest:honest-1,fatigued:fatigued-1,spammer:spammer-1`.
//! - `SIM_SEED` - Optional. Run seed for reproducible behavior.
//! - `SIM_BATCH_SIZE` - Optional. Tasks requested per fetch. Defaults to `10`.
//! - `SIM_MAX_BATCHES` - Optional. Batches per annotator. Defaults to `5`.
//! - `SIM_MAX_RETRIES` - Optional. Fetch attempts per batch. Defaults to `3`.
//! - `SIM_BREAK_BELOW_ENERGY` - Optional. Energy under which an annotator takes a break.
//!   Must not exceed the post-break energy of 80.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::agents::BehaviorKind;
use crate::simulation::SimulationConfig;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_LABELS: [&str; 2] = ["Positive", "Negative"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Invalid API URL {0}: {1}")]
    InvalidUrl(String, url::ParseError),

    #[error("Unknown annotator behavior: {0}")]
    UnknownBehavior(String),
}

/// Per-annotator configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base URL of the task-serving API
    pub api_url: String,

    /// Label vocabulary the annotator may choose from
    pub labels: Vec<String>,

    /// Dataset/project to request tasks from
    pub dataset_id: Option<String>,

    /// Tasks requested per fetch
    pub batch_size: usize,

    /// Backoff unit; attempt `n` is followed by a `n * retry_base_delay` pause
    pub retry_base_delay: Duration,

    /// Simulated length of a break
    pub break_duration: Duration,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
            dataset_id: None,
            batch_size: 10,
            retry_base_delay: Duration::from_millis(1000),
            break_duration: Duration::from_millis(3000),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AgentConfig {
    /// Build a config, applying defaults for anything not given.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `api_url` does not parse and
    /// `ConfigError::InvalidValue` if `labels` is given but empty.
    pub fn new(
        api_url: Option<String>,
        labels: Option<Vec<String>>,
        dataset_id: Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            api_url: api_url.unwrap_or(defaults.api_url),
            labels: labels.unwrap_or(defaults.labels),
            dataset_id,
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the URL parses and the vocabulary is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.api_url)
            .map_err(|e| ConfigError::InvalidUrl(self.api_url.clone(), e))?;
        if self.labels.is_empty() {
            return Err(ConfigError::InvalidValue(
                "labels".to_string(),
                "at least one label is required".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue(
                "batch_size".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Join a path onto the API base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn with_dataset(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(dataset_id.into());
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn with_break_duration(mut self, duration: Duration) -> Self {
        self.break_duration = duration;
        self
    }
}

/// One annotator to launch: its behavior and its attribution name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    pub kind: BehaviorKind,
    pub name: String,
}

impl FromStr for AgentSpec {
    type Err = ConfigError;

    /// Parse `behavior:name`, e.g. `fatigued:bob`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, name) = s.trim().split_once(':').ok_or_else(|| {
            ConfigError::InvalidValue("SIM_AGENTS".to_string(), format!("expected behavior:name, got {s:?}"))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SIM_AGENTS".to_string(),
                format!("empty annotator name in {s:?}"),
            ));
        }
        Ok(Self {
            kind: kind.parse()?,
            name: name.to_string(),
        })
    }
}

/// Process-level configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared per-annotator settings
    pub agent: AgentConfig,

    /// Annotators to launch
    pub agents: Vec<AgentSpec>,

    /// Run seed (random if unset)
    pub seed: Option<u64>,

    /// Driver loop settings
    pub simulation: SimulationConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let labels = std::env::var("SIM_LABELS").ok().map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

        let mut agent = AgentConfig::new(
            std::env::var("SIM_API_URL").ok(),
            labels,
            std::env::var("SIM_DATASET_ID").ok(),
        )?;
        if let Some(batch_size) = parse_env::<usize>("SIM_BATCH_SIZE")? {
            agent.batch_size = batch_size;
            agent.validate()?;
        }

        let agents = match std::env::var("SIM_AGENTS") {
            Ok(raw) => Self::parse_agents(&raw)?,
            Err(_) => Self::default_agents(),
        };

        let mut simulation = SimulationConfig::default();
        if let Some(max_batches) = parse_env("SIM_MAX_BATCHES")? {
            simulation.max_batches = max_batches;
        }
        if let Some(max_retries) = parse_env("SIM_MAX_RETRIES")? {
            simulation.max_retries = max_retries;
        }
        simulation.break_below_energy = parse_env("SIM_BREAK_BELOW_ENERGY")?;
        simulation.validate()?;

        Ok(Self {
            agent,
            agents,
            seed: parse_env("SIM_SEED")?,
            simulation,
        })
    }

    /// Parse a comma-separated list of `behavior:name` pairs.
    ///
    /// Names attribute submissions on the server, so they must be unique.
    pub fn parse_agents(raw: &str) -> Result<Vec<AgentSpec>, ConfigError> {
        let agents = raw
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<AgentSpec>, _>>()?;
        if agents.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SIM_AGENTS".to_string(),
                "no annotators configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.name.clone()) {
                return Err(ConfigError::InvalidValue(
                    "SIM_AGENTS".to_string(),
                    format!("duplicate annotator name {:?}", agent.name),
                ));
            }
        }
        Ok(agents)
    }

    /// One annotator of each behavior.
    pub fn default_agents() -> Vec<AgentSpec> {
        BehaviorKind::ALL
            .iter()
            .map(|kind| AgentSpec {
                kind: *kind,
                name: format!("{}-1", kind),
            })
            .collect()
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), format!("{}", e))),
        Err(_) => Ok(None),
    }
}
