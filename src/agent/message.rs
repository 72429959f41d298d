//! Conversation messages exchanged with the model.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Correlation id matching the invocation to its result.
    pub id: String,
    /// Name of the requested tool.
    pub name: String,
    /// Raw JSON arguments as produced by the model.
    pub arguments: String,
}

impl ToolInvocation {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// One turn in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolInvocation>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: Option<String>, tool_calls: Vec<ToolInvocation>) -> Self {
        Message::Assistant {
            content,
            tool_calls,
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Message::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }

    fn is_tool_result(&self) -> bool {
        matches!(self, Message::Tool { .. })
    }
}

/// Append-only message history for one agent run.
///
/// The opening turns (system prompt and goal) are pinned: they are always
/// part of the context sent to the model, even when a window is applied.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    pinned: usize,
}

impl Conversation {
    /// Start a conversation with an optional system prompt and the opening user turn.
    pub fn new(system_prompt: Option<&str>, opening: &str) -> Self {
        let mut messages = Vec::with_capacity(8);
        if let Some(system) = system_prompt {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(opening));
        let pinned = messages.len();
        Self { messages, pinned }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Ids of tool calls that have no matching result yet.
    pub fn unresolved_calls(&self) -> Vec<String> {
        let answered: HashSet<&str> = self
            .messages
            .iter()
            .filter_map(|m| match m {
                Message::Tool { tool_call_id, .. } => Some(tool_call_id.as_str()),
                _ => None,
            })
            .collect();

        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Assistant { tool_calls, .. } => Some(tool_calls),
                _ => None,
            })
            .flatten()
            .filter(|call| !answered.contains(call.id.as_str()))
            .map(|call| call.id.clone())
            .collect()
    }

    /// The messages to send to the model.
    ///
    /// With `Some(n)`, keeps the pinned opening turns plus roughly the last `n`
    /// messages. The cut never lands on a tool result: it moves back to the
    /// assistant turn that requested it, so every sent result has its call.
    pub fn context(&self, window: Option<usize>) -> Vec<Message> {
        let tail_len = self.messages.len() - self.pinned;
        let Some(max_tail) = window else {
            return self.messages.clone();
        };
        if tail_len <= max_tail {
            return self.messages.clone();
        }

        let mut start = self.messages.len() - max_tail;
        while start > self.pinned && self.messages[start].is_tool_result() {
            start -= 1;
        }

        let mut context = Vec::with_capacity(self.pinned + self.messages.len() - start);
        context.extend_from_slice(&self.messages[..self.pinned]);
        context.extend_from_slice(&self.messages[start..]);
        context
    }
}
