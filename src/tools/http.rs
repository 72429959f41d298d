//! Shared HTTP plumbing for tools that call public REST APIs.

use crate::error::{CurioError, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Result count used when the model omits `max_results`.
pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// Build the HTTP client shared by all tools.
pub fn build_client(timeout_seconds: u64, user_agent: &str) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Clamp a requested result count to 1-10.
pub fn clamp_max_results(requested: Option<u32>, default: u32) -> u32 {
    requested.unwrap_or(default).clamp(1, 10)
}

/// Readable message for a failed HTTP status.
pub fn status_message(service: &str, status: StatusCode) -> String {
    match status.as_u16() {
        400 => format!("Bad request to {}. Check your search query.", service),
        401 => format!("Authentication failed. Check your {} API key.", service),
        403 => format!(
            "{} rate limit exceeded or key doesn't have required permissions.",
            service
        ),
        422 => "Invalid search query. Check your search syntax.".to_string(),
        429 => format!("{} rate limit exceeded. Try again later.", service),
        code => format!("HTTP error occurred: {}", code),
    }
}

/// Convert a transport error into a tool error with a readable message.
pub fn request_error(service: &str, e: reqwest::Error) -> CurioError {
    if e.is_timeout() {
        CurioError::Tool(format!(
            "Request timed out. {} took too long to respond.",
            service
        ))
    } else if let Some(status) = e.status() {
        CurioError::Tool(status_message(service, status))
    } else {
        CurioError::Tool(format!("Request failed: {}", e))
    }
}

/// Send a request and decode the JSON body, mapping failures to tool errors.
pub async fn send_json<T: DeserializeOwned>(service: &str, request: RequestBuilder) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| request_error(service, e))?;

    let status = response.status();
    debug!("{} responded with {}", service, status);
    if !status.is_success() {
        return Err(CurioError::Tool(status_message(service, status)));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| CurioError::Tool(format!("Invalid response from {}: {}", service, e)))
}

/// Fetch a response body as text, mapping failures to tool errors.
pub async fn send_text(service: &str, request: RequestBuilder) -> Result<String> {
    let response = request
        .send()
        .await
        .map_err(|e| request_error(service, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CurioError::Tool(status_message(service, status)));
    }

    response.text().await.map_err(|e| request_error(service, e))
}

/// Truncate to at most `max` characters, marking the cut with "...".
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Keep at most `max` characters, without a marker.
pub fn head(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
