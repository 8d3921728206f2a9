//! annotator-sim - simulation entry point
//!
//! Launches the configured annotators against the task API and prints the
//! run report as JSON.

use annotator_sim::{config::Config, simulation};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "annotator_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    info!(
        "Loaded configuration: api={}, labels={:?}, annotators={}",
        config.agent.api_url,
        config.agent.labels,
        config.agents.len()
    );

    let annotators = simulation::build_annotators(&config)?;
    let report = simulation::run_simulation(annotators, config.simulation.clone()).await;

    info!(
        "Run {} done: {} tasks annotated, {:.1}s total labor",
        report.run_id,
        report.tasks_annotated(),
        report.total_cost_secs()
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
