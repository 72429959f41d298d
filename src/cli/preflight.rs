//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail on the first model call.

use crate::config::Settings;
use crate::error::{CurioError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Agent runs call the model API.
    Agent,
    /// Listing tools or the reading list needs nothing external.
    Local,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Agent => check_api_key(settings)?,
        Operation::Local => {}
    }
    Ok(())
}

/// Check the model API key unless a custom endpoint is configured.
fn check_api_key(settings: &Settings) -> Result<()> {
    if settings
        .model
        .api_base
        .as_deref()
        .is_some_and(|base| !base.is_empty())
    {
        // Local servers usually need no key.
        return Ok(());
    }
    match settings.model.resolved_api_key() {
        Some(_) => Ok(()),
        None => Err(CurioError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}
