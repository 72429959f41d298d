//! CLI output formatting utilities.

use crate::agent::{AgentRun, RunObserver, RunOutcome, ToolInvocation, ToolResult, TruncationReason};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print the outcome of an agent run with its tool usage and cost.
    pub fn run_summary(run: &AgentRun, cost: f64) {
        match &run.outcome {
            RunOutcome::Completed { content } => {
                Output::header("Result");
                println!("\n{}\n", content);
            }
            RunOutcome::Truncated { reason, .. } => {
                let why = match reason {
                    TruncationReason::IterationCap => "iteration cap reached".to_string(),
                    TruncationReason::UnexpectedStop(stop) => format!("model stopped ({})", stop),
                };
                Output::warning(&format!("Run incomplete: {}", why));
                println!("\n{}\n", run.outcome.content_or_marker());
            }
        }

        let tools = run.tools_used();
        if tools.is_empty() {
            Output::kv("Tools used", "none");
        } else {
            Output::kv("Tools used", &tools.join(", "));
        }
        Output::kv("Tool calls", &run.tool_calls.len().to_string());
        Output::kv("Iterations", &run.iterations.to_string());
        Output::kv(
            "Tokens",
            &format!("{} in / {} out", run.usage.input_tokens, run.usage.output_tokens),
        );
        Output::kv("Estimated cost", &format!("${:.4}", cost));
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Prints the model's reasoning and tool traffic while a run progresses.
pub struct ConsoleObserver {
    spinner: ProgressBar,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self {
            spinner: Output::spinner("Agent starting..."),
        }
    }

    /// Stop the spinner before printing final output.
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl RunObserver for ConsoleObserver {
    fn on_iteration(&self, iteration: usize, max_iterations: usize) {
        self.spinner
            .set_message(format!("Thinking (iteration {}/{})", iteration, max_iterations));
    }

    fn on_reasoning(&self, text: &str) {
        self.spinner.suspend(|| {
            println!("\n{} {}", style("Reasoning:").magenta().bold(), text.trim());
        });
    }

    fn on_tool_call(&self, call: &ToolInvocation) {
        self.spinner.suspend(|| {
            println!(
                "{} {} {}",
                style("->").cyan().bold(),
                style(&call.name).bold(),
                style(content_preview(&call.arguments, 120)).dim()
            );
        });
    }

    fn on_tool_result(&self, result: &ToolResult) {
        self.spinner.suspend(|| match result.error_message() {
            Some(error) => println!("   {} {}", style("failed:").red(), error),
            None => println!(
                "   {} {}",
                style("ok:").green(),
                style(content_preview(&result.content(), 160)).dim()
            ),
        });
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_len: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_len {
        content
    } else {
        let cut: String = content.chars().take(max_len).collect();
        format!("{}...", cut)
    }
}
