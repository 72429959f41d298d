//! OpenAI-compatible chat model backed by `async-openai`.

use super::message::{Message, ToolInvocation};
use super::model::{ChatModel, ModelTurn, StopReason, Usage};
use super::registry::ToolSpec;
use crate::config::ModelSettings;
use crate::error::{CurioError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FinishReason,
    FunctionCall, FunctionObject,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Chat model speaking the OpenAI chat-completions protocol.
pub struct OpenAIChatModel {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIChatModel {
    /// Create a model client from settings, overriding the model name if given.
    pub fn from_settings(settings: &ModelSettings, model: Option<&str>) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: model.unwrap_or(&settings.name).to_string(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, messages, tools), fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelTurn> {
        let request_messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(request_messages)
            .temperature(self.temperature)
            .max_completion_tokens(self.max_tokens);
        if !tools.is_empty() {
            builder.tools(tools.iter().map(to_tool).collect::<Vec<_>>());
        }
        let request = builder.build().map_err(request_error)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| CurioError::ModelApi(e.to_string()))?;

        let usage = response
            .usage
            .as_ref()
            .map(|u| Usage::new(u.prompt_tokens as u64, u.completion_tokens as u64))
            .unwrap_or_default();

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CurioError::ModelApi("No choices in model response".to_string()))?;

        let tool_calls: Vec<ToolInvocation> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(from_tool_call)
            .collect();

        let stop_reason = match choice.finish_reason {
            Some(FinishReason::Stop) | None => StopReason::EndTurn,
            Some(FinishReason::ToolCalls) | Some(FinishReason::FunctionCall) => {
                StopReason::ToolUse
            }
            Some(FinishReason::Length) => StopReason::MaxTokens,
            Some(other) => StopReason::Other(format!("{:?}", other).to_lowercase()),
        };

        debug!(
            "Model returned {} tool call(s), stop reason {}",
            tool_calls.len(),
            stop_reason
        );

        Ok(ModelTurn {
            content: choice.message.content,
            tool_calls,
            stop_reason,
            usage,
        })
    }
}

fn request_error(e: impl std::fmt::Display) -> CurioError {
    CurioError::Agent(format!("Failed to build model request: {}", e))
}

fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage> {
    let converted = match message {
        Message::System { content } => ChatCompletionRequestSystemMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(request_error)?
            .into(),
        Message::User { content } => ChatCompletionRequestUserMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(request_error)?
            .into(),
        Message::Assistant {
            content,
            tool_calls,
        } => {
            let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(text) = content {
                builder.content(text.clone());
            }
            if !tool_calls.is_empty() {
                builder.tool_calls(tool_calls.iter().map(to_tool_call).collect::<Vec<_>>());
            }
            builder.build().map_err(request_error)?.into()
        }
        Message::Tool {
            tool_call_id,
            content,
        } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(tool_call_id.clone())
            .content(content.clone())
            .build()
            .map_err(request_error)?
            .into(),
    };
    Ok(converted)
}

fn to_tool(spec: &ToolSpec) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: spec.name.clone(),
            description: Some(spec.description.clone()),
            parameters: Some(spec.parameters.clone()),
            strict: None,
        },
    }
}

fn to_tool_call(call: &ToolInvocation) -> ChatCompletionMessageToolCall {
    ChatCompletionMessageToolCall {
        id: call.id.clone(),
        r#type: ChatCompletionToolType::Function,
        function: FunctionCall {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        },
    }
}

/// Some OpenAI-compatible servers omit call ids; results still need one to correlate.
fn from_tool_call(call: ChatCompletionMessageToolCall) -> ToolInvocation {
    let id = if call.id.trim().is_empty() {
        format!("call_{}", Uuid::new_v4().simple())
    } else {
        call.id
    };
    ToolInvocation::new(id, call.function.name, call.function.arguments)
}
