//! Tool-calling agent loop.
//!
//! An [`Agent`] alternates between asking a [`ChatModel`] for its next turn
//! and executing the tool calls that turn requests, feeding every result
//! back into the conversation. The loop ends when the model answers without
//! requesting tools, or when the iteration cap is reached.

mod message;
mod mock;
mod model;
mod openai;
mod registry;
mod runner;

pub use message::{Conversation, Message, ToolInvocation};
pub use mock::ScriptedModel;
pub use model::{ChatModel, ModelTurn, StopReason, Usage};
pub use openai::OpenAIChatModel;
pub use registry::{parse_args, Tool, ToolRegistry, ToolResult, ToolSpec};
pub use runner::{
    Agent, AgentRun, RunObserver, RunOutcome, SilentObserver, ToolCallRecord, TruncationReason,
    TRUNCATION_MARKER,
};
