//! Podcast command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{ConsoleObserver, Output, RunArgs};
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, RunOptions, Scenario};
use anyhow::Result;

/// Run the podcast agent.
pub async fn run_podcast(
    goal: Option<String>,
    scenario: Option<Scenario>,
    live: bool,
    run: RunArgs,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Agent, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'curio doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let goal = match (goal, scenario) {
        (Some(goal), _) => goal,
        (None, Some(scenario)) => scenario.goal().to_string(),
        (None, None) => anyhow::bail!("Provide a goal or --scenario"),
    };

    let live = live || settings.podcast.live;
    let orchestrator = Orchestrator::new(settings)?;
    let opts = RunOptions {
        model: run.model,
        max_iterations: run.max_iterations,
        live: Some(live),
    };

    Output::header("Podcast Agent");
    Output::kv("Goal", &goal);
    Output::kv("Mode", if live { "live" } else { "mock" });

    let observer = ConsoleObserver::new();
    let result = orchestrator.run_podcast(&goal, &opts, &observer).await;
    observer.finish();

    match result {
        Ok(run) => {
            Output::run_summary(&run, orchestrator.estimated_cost(&run));

            let sent = orchestrator.outbox().sent();
            if !sent.is_empty() {
                Output::header(&format!("Email digests ({})", sent.len()));
                for digest in &sent {
                    Output::list_item(&format!("[{:?}] {}", digest.priority, digest.subject));
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Agent failed: {}", e));
            Err(e.into())
        }
    }
}
