//! Error types for Curio.

use thiserror::Error;

/// Library-level error type for Curio operations.
#[derive(Error, Debug)]
pub enum CurioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The model API was unreachable or rejected the request. Fatal to a run.
    #[error("Model API error: {0}")]
    ModelApi(String),

    #[error("Agent error: {0}")]
    Agent(String),

    /// A registered tool failed while executing. Recovered inside a run.
    #[error("{0}")]
    Tool(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Reading list error: {0}")]
    ReadingList(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CurioError {
    /// Whether this error came from the model transport rather than a tool.
    pub fn is_model_failure(&self) -> bool {
        matches!(self, CurioError::ModelApi(_))
    }
}

/// Result type alias for Curio operations.
pub type Result<T> = std::result::Result<T, CurioError>;
