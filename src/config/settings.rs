//! Configuration settings for Curio.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub agent: AgentSettings,
    pub podcast: PodcastSettings,
    pub discovery: DiscoverySettings,
    pub reading_list: ReadingListSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.curio".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Chat model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Model used to drive the agent loop.
    pub name: String,
    /// Model used by the live `generate_summary` tool.
    pub summary_model: String,
    /// Alternative OpenAI-compatible endpoint (e.g. a local server).
    pub api_base: Option<String>,
    /// API key. Falls back to OPENAI_API_KEY.
    pub api_key: Option<String>,
    pub temperature: f32,
    /// Maximum completion tokens per model turn.
    pub max_tokens: u32,
    /// HTTP timeout for one model call.
    pub timeout_seconds: u64,
    pub pricing: Pricing,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: "gpt-4o-mini".to_string(),
            summary_model: "gpt-4o-mini".to_string(),
            api_base: None,
            api_key: None,
            temperature: 0.7,
            max_tokens: 4096,
            timeout_seconds: 300,
            pricing: Pricing::default(),
        }
    }
}

impl ModelSettings {
    /// Resolve the API key from config, then environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        non_empty(self.api_key.clone()).or_else(|| env_key("OPENAI_API_KEY"))
    }
}

/// Token prices in USD per million tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Pricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            input_per_million: 3.0,
            output_per_million: 15.0,
        }
    }
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Hard cap on model round trips per run.
    pub max_iterations: usize,
    /// Number of trailing messages sent to the model. None sends everything.
    pub context_window: Option<usize>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            context_window: None,
        }
    }
}

/// Podcast agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PodcastSettings {
    /// Use iTunes, RSS feeds and the model instead of fixture data.
    pub live: bool,
    pub preferences: PodcastPreferences,
    pub subscriptions: Vec<Subscription>,
    /// Number of feed entries inspected per subscription.
    pub entries_per_feed: usize,
    /// Country code for iTunes search.
    pub itunes_country: String,
}

impl Default for PodcastSettings {
    fn default() -> Self {
        Self {
            live: false,
            preferences: PodcastPreferences::default(),
            subscriptions: vec![
                Subscription {
                    name: "Lex Fridman Podcast".to_string(),
                    rss_url: "https://lexfridman.com/feed/podcast/".to_string(),
                    tags: vec!["AI".into(), "technology".into(), "science".into()],
                },
                Subscription {
                    name: "a16z Podcast".to_string(),
                    rss_url: "https://feeds.simplecast.com/JGE3yC0V".to_string(),
                    tags: vec!["technology".into(), "startups".into(), "AI".into()],
                },
                Subscription {
                    name: "The AI Podcast".to_string(),
                    rss_url: "https://feeds.pacific-content.com/ai-podcast".to_string(),
                    tags: vec!["AI".into(), "technology".into()],
                },
            ],
            entries_per_feed: 10,
            itunes_country: "US".to_string(),
        }
    }
}

/// What the listener cares about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PodcastPreferences {
    pub recent_topics: Vec<String>,
    pub preferred_length: String,
    pub active_time: String,
    pub skip_topics: Vec<String>,
}

impl Default for PodcastPreferences {
    fn default() -> Self {
        Self {
            recent_topics: vec!["AI".into(), "productivity".into(), "technology".into()],
            preferred_length: "detailed".to_string(),
            active_time: "morning".to_string(),
            skip_topics: vec!["sports".into(), "politics".into()],
        }
    }
}

/// A subscribed podcast feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub name: String,
    pub rss_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Content discovery agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Tavily key for web search. Falls back to TAVILY_API_KEY.
    pub tavily_api_key: Option<String>,
    /// GitHub token. Falls back to GITHUB_TOKEN.
    pub github_token: Option<String>,
    /// Google key for Books and YouTube. Falls back to GOOGLE_API_KEY.
    pub google_api_key: Option<String>,
    /// Default result count per tool.
    pub max_results: u32,
    pub request_timeout_seconds: u64,
    /// User-Agent sent to APIs that require one.
    pub user_agent: String,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            github_token: None,
            google_api_key: None,
            max_results: 5,
            request_timeout_seconds: 30,
            user_agent: format!("curio/{} (content discovery)", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl DiscoverySettings {
    pub fn tavily_key(&self) -> Option<String> {
        non_empty(self.tavily_api_key.clone()).or_else(|| env_key("TAVILY_API_KEY"))
    }

    pub fn github_key(&self) -> Option<String> {
        non_empty(self.github_token.clone()).or_else(|| env_key("GITHUB_TOKEN"))
    }

    pub fn google_key(&self) -> Option<String> {
        non_empty(self.google_api_key.clone()).or_else(|| env_key("GOOGLE_API_KEY"))
    }
}

/// Reading list backend type.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ReadingListProvider {
    #[default]
    Sqlite,
    Memory,
}

impl std::str::FromStr for ReadingListProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(ReadingListProvider::Sqlite),
            "memory" => Ok(ReadingListProvider::Memory),
            _ => Err(format!("Unknown reading list provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ReadingListProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadingListProvider::Sqlite => write!(f, "sqlite"),
            ReadingListProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Reading list storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingListSettings {
    pub provider: ReadingListProvider,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for ReadingListSettings {
    fn default() -> Self {
        Self {
            provider: ReadingListProvider::Sqlite,
            sqlite_path: "~/.curio/reading_list.db".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Reject values the agent cannot run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.agent.max_iterations == 0 {
            return Err(crate::error::CurioError::Config(
                "agent.max_iterations must be at least 1".to_string(),
            ));
        }
        if self.agent.context_window == Some(0) {
            return Err(crate::error::CurioError::Config(
                "agent.context_window must be at least 1 when set".to_string(),
            ));
        }
        for sub in &self.podcast.subscriptions {
            url::Url::parse(&sub.rss_url).map_err(|e| {
                crate::error::CurioError::Config(format!(
                    "Invalid feed URL for '{}': {}",
                    sub.name, e
                ))
            })?;
        }
        Ok(())
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::CurioError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("curio")
            .join("config.toml")
    }

    /// The `--config` override when given, otherwise the default location.
    pub fn config_path(custom: Option<&str>) -> PathBuf {
        custom.map_or_else(Self::default_config_path, Self::expand_path)
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded reading list database path.
    pub fn reading_list_path(&self) -> PathBuf {
        Self::expand_path(&self.reading_list.sqlite_path)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_key(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.agent.max_iterations, 15);
        assert!(settings.agent.context_window.is_none());
        assert_eq!(settings.podcast.subscriptions.len(), 3);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [agent]
            max_iterations = 5

            [model]
            name = "gpt-4.1"
            "#,
        )
        .unwrap();

        assert_eq!(settings.agent.max_iterations, 5);
        assert_eq!(settings.model.name, "gpt-4.1");
        assert_eq!(settings.model.timeout_seconds, 300);
        assert_eq!(settings.discovery.max_results, 5);
        assert_eq!(settings.reading_list.provider, ReadingListProvider::Sqlite);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let mut settings = Settings::default();
        settings.agent.max_iterations = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_bad_feed_url_rejected() {
        let mut settings = Settings::default();
        settings.podcast.subscriptions.push(Subscription {
            name: "Broken".to_string(),
            rss_url: "not a url".to_string(),
            tags: vec![],
        });
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_and_save_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.podcast.live = true;
        settings.agent.context_window = Some(12);
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert!(loaded.podcast.live);
        assert_eq!(loaded.agent.context_window, Some(12));
    }

    #[test]
    fn test_configured_key_wins_over_blank() {
        let discovery = DiscoverySettings {
            tavily_api_key: Some("tvly-123".to_string()),
            ..Default::default()
        };
        assert_eq!(discovery.tavily_key().as_deref(), Some("tvly-123"));
    }

    #[test]
    fn test_reading_list_provider_parse() {
        assert_eq!(
            "SQLite".parse::<ReadingListProvider>().unwrap(),
            ReadingListProvider::Sqlite
        );
        assert!("redis".parse::<ReadingListProvider>().is_err());
    }
}
