//! OpenAI client configuration with sensible defaults.

use crate::config::ModelSettings;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create an OpenAI client from model settings.
///
/// Credentials come from `model.api_key` or `OPENAI_API_KEY`; `model.api_base`
/// points the client at any OpenAI-compatible server.
pub fn create_client(settings: &ModelSettings) -> crate::error::Result<Client<OpenAIConfig>> {
    let mut config = OpenAIConfig::default();
    if let Some(key) = settings.resolved_api_key() {
        config = config.with_api_key(key);
    }
    if let Some(base) = settings.api_base.as_deref().filter(|b| !b.is_empty()) {
        config = config.with_api_base(base);
    }

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_seconds))
        .build()?;

    Ok(Client::with_config(config).with_http_client(http_client))
}
