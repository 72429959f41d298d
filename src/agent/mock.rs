//! Deterministic chat model for tests and offline runs.

use super::message::Message;
use super::model::{ChatModel, ModelTurn};
use super::registry::ToolSpec;
use crate::error::{CurioError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

enum Script {
    Queue(VecDeque<Result<ModelTurn>>),
    Repeat(ModelTurn),
}

/// A pre-scripted model. Each call to `complete` pops the next scripted
/// turn; every request is recorded so tests can inspect what was sent.
pub struct ScriptedModel {
    script: Mutex<Script>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    /// Model that replays the given turns in order, then reports an API error.
    pub fn new(turns: Vec<ModelTurn>) -> Self {
        Self::from_results(turns.into_iter().map(Ok).collect())
    }

    /// Model that replays results, including scripted transport failures.
    pub fn from_results(results: Vec<Result<ModelTurn>>) -> Self {
        Self {
            script: Mutex::new(Script::Queue(results.into())),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Model that returns the same turn forever.
    pub fn repeating(turn: ModelTurn) -> Self {
        Self {
            script: Mutex::new(Script::Repeat(turn)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of `complete` calls made so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// Messages sent on each call, in order.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, messages: &[Message], _tools: &[ToolSpec]) -> Result<ModelTurn> {
        self.requests
            .lock()
            .map_err(|e| CurioError::ModelApi(format!("Failed to acquire lock: {}", e)))?
            .push(messages.to_vec());

        let mut script = self
            .script
            .lock()
            .map_err(|e| CurioError::ModelApi(format!("Failed to acquire lock: {}", e)))?;

        match &mut *script {
            Script::Repeat(turn) => Ok(turn.clone()),
            Script::Queue(queue) => queue
                .pop_front()
                .unwrap_or_else(|| Err(CurioError::ModelApi("script exhausted".to_string()))),
        }
    }
}
