//! Tools command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;

/// List every tool the agents can call.
pub fn run_tools(settings: Settings) -> Result<()> {
    let live = settings.podcast.live;
    let orchestrator = Orchestrator::new(settings)?;
    let tools = orchestrator.all_tools()?;

    Output::header(&format!(
        "Tools ({}, podcast tools in {} mode)",
        tools.len(),
        if live { "live" } else { "mock" }
    ));
    println!();

    for spec in tools.specs() {
        println!("  {} {}", style("*").cyan(), style(&spec.name).bold());
        println!("    {}", spec.description);
        let required = spec.required_fields();
        if !required.is_empty() {
            println!("    {} {}", style("requires:").dim(), required.join(", "));
        }
    }

    Ok(())
}
