//! Discover command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{ConsoleObserver, Output, RunArgs};
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, RunOptions};
use anyhow::Result;

/// Run the content discovery agent on a topic.
pub async fn run_discover(topic: &str, run: RunArgs, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Agent, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'curio doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if settings.discovery.tavily_key().is_none() {
        Output::warning("No Tavily key configured; web_search will fail.");
    }
    if settings.discovery.google_key().is_none() {
        Output::warning("No Google key configured; youtube_search will fail.");
    }

    let orchestrator = Orchestrator::new(settings)?;
    let opts = RunOptions {
        model: run.model,
        max_iterations: run.max_iterations,
        live: None,
    };

    Output::header("Content Discovery Agent");
    Output::kv("Topic", topic);

    let observer = ConsoleObserver::new();
    let result = orchestrator.run_discovery(topic, &opts, &observer).await;
    observer.finish();

    match result {
        Ok(run) => {
            Output::run_summary(&run, orchestrator.estimated_cost(&run));
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Agent failed: {}", e));
            Err(e.into())
        }
    }
}
