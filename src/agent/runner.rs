//! Agent runner with tool calling loop.

use super::message::{Conversation, Message, ToolInvocation};
use super::model::{ChatModel, StopReason, Usage};
use super::registry::{ToolRegistry, ToolResult};
use crate::config::{AgentSettings, Prompts};
use crate::error::{CurioError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Marker returned when a run ends without a final answer.
pub const TRUNCATION_MARKER: &str = "Task incomplete - max iterations reached";

/// Receives progress events while an agent runs.
///
/// All methods default to no-ops.
pub trait RunObserver: Send + Sync {
    fn on_iteration(&self, _iteration: usize, _max_iterations: usize) {}

    /// Text the model produced alongside tool calls.
    fn on_reasoning(&self, _text: &str) {}

    fn on_tool_call(&self, _call: &ToolInvocation) {}

    fn on_tool_result(&self, _result: &ToolResult) {}
}

/// Observer that ignores every event.
pub struct SilentObserver;

impl RunObserver for SilentObserver {}

/// Why a run ended without a voluntary stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TruncationReason {
    /// The iteration cap was reached.
    IterationCap,
    /// The model ended a turn without tools and without a voluntary stop.
    UnexpectedStop(String),
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed {
        content: String,
    },
    Truncated {
        reason: TruncationReason,
        partial: Option<String>,
    },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    /// Final text, or the best partial text, or the truncation marker.
    pub fn content_or_marker(&self) -> &str {
        match self {
            RunOutcome::Completed { content } => content,
            RunOutcome::Truncated {
                partial: Some(text),
                ..
            } => text,
            RunOutcome::Truncated { partial: None, .. } => TRUNCATION_MARKER,
        }
    }
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: serde_json::Value,
    pub is_error: bool,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRun {
    pub outcome: RunOutcome,
    /// Number of model calls made.
    pub iterations: usize,
    pub tool_calls: Vec<ToolCallRecord>,
    pub usage: Usage,
    /// Full, unwindowed message history.
    #[serde(skip)]
    pub messages: Vec<Message>,
}

impl AgentRun {
    /// Tool names in call order, without repeats.
    pub fn tools_used(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for record in &self.tool_calls {
            if !seen.contains(&record.name.as_str()) {
                seen.push(record.name.as_str());
            }
        }
        seen
    }
}

/// Agent driving a model through a tool catalog toward a goal.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    max_iterations: usize,
    context_window: Option<usize>,
    system_prompt: Option<String>,
    framing: Option<String>,
}

impl Agent {
    /// Create a new agent with default limits (15 iterations, unbounded context).
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolRegistry) -> Self {
        let defaults = AgentSettings::default();
        Self {
            model,
            tools,
            max_iterations: defaults.max_iterations,
            context_window: defaults.context_window,
            system_prompt: None,
            framing: None,
        }
    }

    /// Apply iteration cap and context window from settings.
    pub fn with_settings(self, settings: &AgentSettings) -> Self {
        self.with_max_iterations(settings.max_iterations)
            .with_context_window(settings.context_window)
    }

    /// Set a system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = Some(prompt.to_string());
        self
    }

    /// Wrap the goal in a template; `{{goal}}` is replaced by the goal text.
    pub fn with_framing(mut self, template: &str) -> Self {
        self.framing = Some(template.to_string());
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Limit how many trailing messages are sent per model call.
    pub fn with_context_window(mut self, window: Option<usize>) -> Self {
        self.context_window = window;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Run the agent toward a goal.
    pub async fn run(&self, goal: &str) -> Result<AgentRun> {
        self.run_with_observer(goal, &SilentObserver).await
    }

    /// Run the agent, reporting progress to an observer.
    pub async fn run_with_observer(
        &self,
        goal: &str,
        observer: &dyn RunObserver,
    ) -> Result<AgentRun> {
        if self.max_iterations == 0 {
            return Err(CurioError::InvalidInput(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.context_window == Some(0) {
            return Err(CurioError::InvalidInput(
                "context_window must be at least 1 when set".to_string(),
            ));
        }

        let opening = self.opening_message(goal);
        let mut conversation = Conversation::new(self.system_prompt.as_deref(), &opening);
        let specs = self.tools.specs();

        let mut usage = Usage::default();
        let mut records = Vec::new();
        let mut last_text: Option<String> = None;

        info!(
            "Agent starting with model {} and {} tool(s)",
            self.model.name(),
            specs.len()
        );

        for iteration in 1..=self.max_iterations {
            debug!("Agent iteration {}", iteration);
            observer.on_iteration(iteration, self.max_iterations);

            debug_assert!(conversation.unresolved_calls().is_empty());
            let context = conversation.context(self.context_window);
            let turn = self.model.complete(&context, &specs).await?;
            usage += turn.usage;

            let text = turn.text_content().map(str::to_string);
            if text.is_some() {
                last_text = text.clone();
            }

            // Tool calls take priority over any stop signal in the same turn.
            if !turn.tool_calls.is_empty() {
                if let Some(reasoning) = &text {
                    observer.on_reasoning(reasoning);
                }

                conversation.push(Message::assistant(text, turn.tool_calls.clone()));

                for call in &turn.tool_calls {
                    observer.on_tool_call(call);
                    let result = self.tools.invoke(call).await;
                    observer.on_tool_result(&result);

                    conversation.push(Message::tool(&result.call_id, result.content()));
                    records.push(ToolCallRecord {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                        result: result.payload,
                        is_error: result.is_error,
                    });
                }
                continue;
            }

            let outcome = match turn.stop_reason {
                StopReason::EndTurn | StopReason::ToolUse => {
                    info!("Agent completed after {} iteration(s)", iteration);
                    RunOutcome::Completed {
                        content: text.clone().unwrap_or_default(),
                    }
                }
                other => {
                    warn!("Unexpected stop reason: {}", other);
                    RunOutcome::Truncated {
                        reason: TruncationReason::UnexpectedStop(other.to_string()),
                        partial: last_text.clone(),
                    }
                }
            };

            conversation.push(Message::assistant(text, Vec::new()));
            return Ok(AgentRun {
                outcome,
                iterations: iteration,
                tool_calls: records,
                usage,
                messages: conversation.into_messages(),
            });
        }

        warn!("Reached max iterations ({})", self.max_iterations);
        Ok(AgentRun {
            outcome: RunOutcome::Truncated {
                reason: TruncationReason::IterationCap,
                partial: last_text,
            },
            iterations: self.max_iterations,
            tool_calls: records,
            usage,
            messages: conversation.into_messages(),
        })
    }

    fn opening_message(&self, goal: &str) -> String {
        match &self.framing {
            Some(template) => {
                let mut vars = HashMap::new();
                vars.insert("goal".to_string(), goal.to_string());
                Prompts::render(template, &vars)
            }
            None => goal.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::mock::ScriptedModel;
    use crate::agent::model::ModelTurn;
    use crate::agent::registry::{Tool, ToolSpec};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts executions; returns the call count.
    #[derive(Default)]
    struct Counter {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for Counter {
        fn spec(&self) -> ToolSpec {
            ToolSpec::new("count", "Count calls", json!({ "type": "object", "properties": {} }))
        }

        async fn execute(&self, _args: Value) -> Result<Value> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(json!({ "success": true, "count": n }))
        }
    }

    struct Failing;

    #[async_trait]
    impl Tool for Failing {
        fn spec(&self) -> ToolSpec {
            ToolSpec::new("fail", "Always fails", json!({ "type": "object", "properties": {} }))
        }

        async fn execute(&self, _args: Value) -> Result<Value> {
            Err(CurioError::Tool("HTTP error occurred: 503".to_string()))
        }
    }

    fn call(id: &str, name: &str) -> ToolInvocation {
        ToolInvocation::new(id, name, "{}")
    }

    fn agent_with(model: Arc<ScriptedModel>, calls: Arc<AtomicUsize>, max: usize) -> Agent {
        let tools = ToolRegistry::new()
            .with(Counter { calls })
            .with(Failing);
        Agent::new(model, tools).with_max_iterations(max)
    }

    #[tokio::test]
    async fn test_stops_on_first_turn_without_tools() {
        let model = Arc::new(ScriptedModel::new(vec![ModelTurn::text("Nothing to do.")]));
        let calls = Arc::new(AtomicUsize::new(0));
        let agent = agent_with(model.clone(), calls.clone(), 5);

        let run = agent.run("say hello").await.unwrap();

        assert_eq!(
            run.outcome,
            RunOutcome::Completed {
                content: "Nothing to do.".to_string()
            }
        );
        assert_eq!(run.iterations, 1);
        assert_eq!(model.call_count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_two_tool_turns_then_stop_within_cap_of_three() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelTurn::tools(vec![call("a", "count")]),
            ModelTurn::tools(vec![call("b", "count")]),
            ModelTurn::text("Done: counted twice."),
        ]));
        let calls = Arc::new(AtomicUsize::new(0));
        let agent = agent_with(model.clone(), calls.clone(), 3);

        let run = agent.run("count twice").await.unwrap();

        assert_eq!(run.outcome.content_or_marker(), "Done: counted twice.");
        assert!(run.outcome.is_completed());
        assert_eq!(model.call_count(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(run.tool_calls.len(), 2);
    }

    #[tokio::test]
    async fn test_truncates_after_cap_when_model_never_stops() {
        let model = Arc::new(ScriptedModel::repeating(ModelTurn::tools(vec![call(
            "x", "count",
        )])));
        let calls = Arc::new(AtomicUsize::new(0));
        let agent = agent_with(model.clone(), calls.clone(), 2);

        let run = agent.run("loop forever").await.unwrap();

        assert_eq!(model.call_count(), 2);
        assert_eq!(run.iterations, 2);
        assert_eq!(
            run.outcome,
            RunOutcome::Truncated {
                reason: TruncationReason::IterationCap,
                partial: None
            }
        );
        assert_eq!(run.outcome.content_or_marker(), TRUNCATION_MARKER);
    }

    #[tokio::test]
    async fn test_never_exceeds_cap_for_any_n() {
        for cap in 1..=6 {
            let model = Arc::new(ScriptedModel::repeating(ModelTurn::tools(vec![call(
                "x", "count",
            )])));
            let agent = agent_with(model.clone(), Arc::new(AtomicUsize::new(0)), cap);
            let run = agent.run("loop").await.unwrap();
            assert_eq!(model.call_count(), cap);
            assert!(!run.outcome.is_completed());
        }
    }

    #[tokio::test]
    async fn test_truncation_keeps_partial_reasoning() {
        let model = Arc::new(ScriptedModel::repeating(
            ModelTurn::tools(vec![call("x", "count")]).with_content("Still researching..."),
        ));
        let agent = agent_with(model, Arc::new(AtomicUsize::new(0)), 1);

        let run = agent.run("goal").await.unwrap();
        assert_eq!(run.outcome.content_or_marker(), "Still researching...");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_and_loop_continues() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelTurn::tools(vec![call("u1", "does_not_exist")]),
            ModelTurn::text("Recovered."),
        ]));
        let agent = agent_with(model.clone(), Arc::new(AtomicUsize::new(0)), 5);

        let run = agent.run("goal").await.unwrap();

        assert!(run.outcome.is_completed());
        assert!(run.tool_calls[0].is_error);
        assert_eq!(run.tool_calls[0].result["error"], "Unknown tool: does_not_exist");

        // The second request carried the error result back to the model.
        let second = &model.requests()[1];
        assert!(matches!(
            second.last(),
            Some(Message::Tool { tool_call_id, content }) if tool_call_id == "u1" && content.contains("Unknown tool")
        ));
    }

    #[tokio::test]
    async fn test_failing_tool_does_not_abort_run() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelTurn::tools(vec![call("f1", "fail"), call("c1", "count")]),
            ModelTurn::text("Partial results are fine."),
        ]));
        let calls = Arc::new(AtomicUsize::new(0));
        let agent = agent_with(model, calls.clone(), 5);

        let run = agent.run("goal").await.unwrap();

        assert!(run.outcome.is_completed());
        assert!(run.tool_calls[0].is_error);
        assert!(!run.tool_calls[1].is_error);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_every_call_resolved_before_next_model_call() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelTurn::tools(vec![call("a", "count"), call("b", "fail"), call("c", "nope")]),
            ModelTurn::tools(vec![call("d", "count")]),
            ModelTurn::text("ok"),
        ]));
        let agent = agent_with(model.clone(), Arc::new(AtomicUsize::new(0)), 5);
        agent.run("goal").await.unwrap();

        for request in model.requests() {
            let mut convo = Conversation::new(None, "");
            for message in request {
                convo.push(message);
            }
            assert!(convo.unresolved_calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_results_follow_call_order() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelTurn::tools(vec![call("first", "count"), call("second", "fail"), call("third", "count")]),
            ModelTurn::text("ok"),
        ]));
        let agent = agent_with(model, Arc::new(AtomicUsize::new(0)), 5);
        let run = agent.run("goal").await.unwrap();

        let ids: Vec<&str> = run
            .messages
            .iter()
            .filter_map(|m| match m {
                Message::Tool { tool_call_id, .. } => Some(tool_call_id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_tool_calls_take_priority_over_stop_reason() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelTurn::tools(vec![call("a", "count")])
                .with_content("I'm done.")
                .with_stop_reason(StopReason::EndTurn),
            ModelTurn::text("Really done."),
        ]));
        let calls = Arc::new(AtomicUsize::new(0));
        let agent = agent_with(model.clone(), calls.clone(), 5);

        let run = agent.run("goal").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(run.outcome.content_or_marker(), "Really done.");
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_length_stop_without_tools_is_truncation() {
        let model = Arc::new(ScriptedModel::new(vec![ModelTurn::text("Cut off mid")
            .with_stop_reason(StopReason::MaxTokens)]));
        let agent = agent_with(model, Arc::new(AtomicUsize::new(0)), 5);

        let run = agent.run("goal").await.unwrap();
        assert_eq!(
            run.outcome,
            RunOutcome::Truncated {
                reason: TruncationReason::UnexpectedStop("max_tokens".to_string()),
                partial: Some("Cut off mid".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_model_failure_is_fatal_and_distinct() {
        let model = Arc::new(ScriptedModel::from_results(vec![
            Ok(ModelTurn::tools(vec![call("a", "fail")])),
            Err(CurioError::ModelApi("connection refused".to_string())),
        ]));
        let agent = agent_with(model, Arc::new(AtomicUsize::new(0)), 5);

        let err = agent.run("goal").await.unwrap_err();
        assert!(err.is_model_failure());
    }

    #[tokio::test]
    async fn test_framing_and_system_prompt() {
        let model = Arc::new(ScriptedModel::new(vec![ModelTurn::text("ok")]));
        let agent = Agent::new(model.clone(), ToolRegistry::new())
            .with_system_prompt("You curate content.")
            .with_framing("Your goal: {{goal}}");

        agent.run("find podcasts").await.unwrap();

        let first = &model.requests()[0];
        assert_eq!(first[0], Message::system("You curate content."));
        assert_eq!(first[1], Message::user("Your goal: find podcasts"));
    }

    #[tokio::test]
    async fn test_usage_is_accumulated() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelTurn::tools(vec![call("a", "count")]).with_usage(Usage::new(100, 20)),
            ModelTurn::text("ok").with_usage(Usage::new(150, 30)),
        ]));
        let agent = agent_with(model, Arc::new(AtomicUsize::new(0)), 5);

        let run = agent.run("goal").await.unwrap();
        assert_eq!(run.usage, Usage::new(250, 50));
    }

    #[tokio::test]
    async fn test_zero_iterations_rejected() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let agent = Agent::new(model.clone(), ToolRegistry::new()).with_max_iterations(0);
        assert!(matches!(
            agent.run("goal").await,
            Err(CurioError::InvalidInput(_))
        ));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_context_window_limits_sent_messages() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelTurn::tools(vec![call("a", "count")]),
            ModelTurn::tools(vec![call("b", "count")]),
            ModelTurn::tools(vec![call("c", "count")]),
            ModelTurn::text("ok"),
        ]));
        let agent = agent_with(model.clone(), Arc::new(AtomicUsize::new(0)), 5)
            .with_context_window(Some(2));

        let run = agent.run("goal").await.unwrap();

        // opening turn + last assistant/tool pair
        assert_eq!(model.requests()[3].len(), 3);
        // history itself is never pruned
        assert_eq!(run.messages.len(), 8);
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            id: "1".to_string(),
            name: "web_search".to_string(),
            arguments: r#"{"query": "rust"}"#.to_string(),
            result: json!({}),
            is_error: false,
        };
        assert_eq!(format!("{}", record), r#"web_search({"query": "rust"})"#);
    }
}
