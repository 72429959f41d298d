//! Chat model abstraction used by the agent loop.

use super::message::{Message, ToolInvocation};
use super::registry::ToolSpec;
use crate::config::Pricing;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Why the model ended its turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Voluntary stop: the model considers its answer final.
    EndTurn,
    /// The model wants tools executed.
    ToolUse,
    /// Output hit the token limit.
    MaxTokens,
    /// Anything else the provider reports (e.g. content filter).
    Other(String),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::EndTurn => write!(f, "end_turn"),
            StopReason::ToolUse => write!(f, "tool_use"),
            StopReason::MaxTokens => write!(f, "max_tokens"),
            StopReason::Other(reason) => write!(f, "{}", reason),
        }
    }
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Estimated cost in USD.
    pub fn estimated_cost(&self, pricing: &Pricing) -> f64 {
        let input = self.input_tokens as f64 / 1_000_000.0 * pricing.input_per_million;
        let output = self.output_tokens as f64 / 1_000_000.0 * pricing.output_per_million;
        input + output
    }
}

impl std::ops::AddAssign for Usage {
    fn add_assign(&mut self, other: Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// One model response.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTurn {
    /// Free text (reasoning or final answer).
    pub content: Option<String>,
    /// Requested tool invocations, in the order the model produced them.
    pub tool_calls: Vec<ToolInvocation>,
    pub stop_reason: StopReason,
    pub usage: Usage,
}

impl ModelTurn {
    /// A voluntary-stop text answer.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        }
    }

    /// A turn requesting tools.
    pub fn tools(tool_calls: Vec<ToolInvocation>) -> Self {
        Self {
            content: None,
            tool_calls,
            stop_reason: StopReason::ToolUse,
            usage: Usage::default(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_stop_reason(mut self, stop_reason: StopReason) -> Self {
        self.stop_reason = stop_reason;
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    /// Non-empty text content, if any.
    pub fn text_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// A hosted chat-completion model with tool calling.
///
/// Implementations report transport and API failures as
/// [`CurioError::ModelApi`](crate::error::CurioError::ModelApi) (HTTP 502 from the API
/// server). A request that cannot be built locally from the conversation is a bug on this
/// side and is reported as [`CurioError::Agent`](crate::error::CurioError::Agent) (500).
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, for logs and reports.
    fn name(&self) -> &str;

    /// Send the conversation and tool catalog; return the model's next turn.
    async fn complete(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelTurn>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_cost() {
        let usage = Usage::new(1_000_000, 100_000);
        let cost = usage.estimated_cost(&Pricing::default());
        assert!((cost - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_usage_accumulates() {
        let mut total = Usage::default();
        total += Usage::new(10, 5);
        total += Usage::new(3, 2);
        assert_eq!(total, Usage::new(13, 7));
        assert_eq!(total.total(), 20);
    }

    #[test]
    fn test_blank_text_is_not_content() {
        let turn = ModelTurn::tools(vec![]).with_content("   ");
        assert!(turn.text_content().is_none());
    }
}
