//! Podcast research tools.
//!
//! In mock mode every tool answers from fixtures. In live mode podcast search
//! goes to iTunes, episodes come from the subscribed RSS feeds and summaries
//! are written by the model.

use super::feeds::{fetch_subscriptions, search_itunes, FeedParser};
use super::fixtures;
use super::http::head;
use crate::agent::{parse_args, ChatModel, Message, Tool, ToolSpec};
use crate::config::{PodcastPreferences, PodcastSettings, Prompts, Subscription, SummaryPrompts};
use crate::error::{CurioError, Result};
use crate::reading_list::{ReadingList, SavedItem};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

/// Summary style chosen by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    Brief,
    Detailed,
    Technical,
}

impl SummaryStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStyle::Brief => "brief",
            SummaryStyle::Detailed => "detailed",
            SummaryStyle::Technical => "technical",
        }
    }
}

/// Email priority chosen by the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

// --- check_user_preferences ---

/// Reports the listener's preferences and subscriptions.
pub struct CheckUserPreferences {
    preferences: PodcastPreferences,
    subscriptions: Vec<Subscription>,
}

impl CheckUserPreferences {
    pub fn new(settings: &PodcastSettings) -> Self {
        Self {
            preferences: settings.preferences.clone(),
            subscriptions: settings.subscriptions.clone(),
        }
    }
}

#[async_trait]
impl Tool for CheckUserPreferences {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "check_user_preferences",
            "Check user's interests, preferred summary length, topics to skip, subscribed \
             podcasts and optimal delivery time. Use this FIRST to understand what the user values.",
            json!({ "type": "object", "properties": {}, "required": [] }),
        )
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        let subscriptions: Vec<Value> = self
            .subscriptions
            .iter()
            .map(|s| json!({ "name": s.name, "tags": s.tags }))
            .collect();

        Ok(json!({
            "success": true,
            "preferences": self.preferences,
            "subscriptions": subscriptions,
            "message": "User preferences loaded",
        }))
    }
}

// --- fetch_new_episodes ---

#[derive(Debug, Deserialize)]
struct FetchArgs {
    hours_back: f64,
}

fn fetch_spec(description: &str) -> ToolSpec {
    ToolSpec::new(
        "fetch_new_episodes",
        description,
        json!({
            "type": "object",
            "properties": {
                "hours_back": {
                    "type": "number",
                    "description": "How many hours back to check for new episodes (e.g., 24, 168)"
                }
            },
            "required": ["hours_back"]
        }),
    )
}

fn cutoff(hours_back: f64) -> Result<DateTime<Utc>> {
    let invalid = || CurioError::InvalidArguments {
        tool: "fetch_new_episodes".to_string(),
        message: "hours_back must be a non-negative number of hours".to_string(),
    };
    if !hours_back.is_finite() || hours_back < 0.0 {
        return Err(invalid());
    }
    let minutes = (hours_back * 60.0).round() as i64;
    Duration::try_minutes(minutes)
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .ok_or_else(invalid)
}

/// Returns fixture episodes.
pub struct MockEpisodeFeed;

#[async_trait]
impl Tool for MockEpisodeFeed {
    fn spec(&self) -> ToolSpec {
        fetch_spec(
            "Fetch new podcast episodes from configured RSS feeds. Returns list of episodes \
             with metadata (title, description, duration, published date).",
        )
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: FetchArgs = parse_args("fetch_new_episodes", args)?;
        cutoff(args.hours_back)?;

        Ok(json!({
            "success": true,
            "count": fixtures::EPISODES.len(),
            "episodes": fixtures::EPISODES,
            "time_range": format!("Last {} hours", args.hours_back),
        }))
    }
}

/// Polls the subscribed RSS feeds.
pub struct RssEpisodeFeed {
    client: reqwest::Client,
    parser: FeedParser,
    subscriptions: Vec<Subscription>,
    entries_per_feed: usize,
}

impl RssEpisodeFeed {
    pub fn new(client: reqwest::Client, settings: &PodcastSettings) -> Self {
        Self {
            client,
            parser: FeedParser::new(),
            subscriptions: settings.subscriptions.clone(),
            entries_per_feed: settings.entries_per_feed,
        }
    }
}

#[async_trait]
impl Tool for RssEpisodeFeed {
    fn spec(&self) -> ToolSpec {
        fetch_spec("Fetch recent episodes from the user's subscribed podcast RSS feeds.")
    }

    #[instrument(skip(self, args))]
    async fn execute(&self, args: Value) -> Result<Value> {
        let args: FetchArgs = parse_args("fetch_new_episodes", args)?;
        let since = cutoff(args.hours_back)?;

        info!(
            "Parsing RSS feeds from {} subscriptions",
            self.subscriptions.len()
        );
        let report = fetch_subscriptions(
            &self.client,
            &self.parser,
            &self.subscriptions,
            self.entries_per_feed,
            since,
        )
        .await;

        Ok(json!({
            "success": true,
            "episodes": report.episodes,
            "count": report.episodes.len(),
            "failed_feeds": report.failed,
            "source": "RSS Feeds",
            "time_range": format!("Last {} hours", args.hours_back),
        }))
    }
}

// --- search_web_for_podcasts ---

#[derive(Debug, Deserialize)]
struct PodcastSearchArgs {
    topics: Vec<String>,
    limit: Option<f64>,
}

impl PodcastSearchArgs {
    /// The schema declares a number, so accept fractional input.
    fn limit(&self) -> u32 {
        self.limit.map_or(5, |l| l.clamp(1.0, 50.0) as u32)
    }
}

fn podcast_search_spec(description: &str) -> ToolSpec {
    ToolSpec::new(
        "search_web_for_podcasts",
        description,
        json!({
            "type": "object",
            "properties": {
                "topics": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Topics to search for (e.g., ['AI safety', 'quantum computing'])"
                },
                "limit": {
                    "type": "number",
                    "description": "Maximum number of recommendations",
                    "default": 5
                }
            },
            "required": ["topics"]
        }),
    )
}

/// Returns a fixture recommendation.
pub struct MockPodcastSearch;

#[async_trait]
impl Tool for MockPodcastSearch {
    fn spec(&self) -> ToolSpec {
        podcast_search_spec(
            "Search the web for NEW podcast recommendations based on topics. Use when user \
             wants to discover podcasts beyond their current subscriptions.",
        )
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: PodcastSearchArgs = parse_args("search_web_for_podcasts", args)?;
        let limit = args.limit() as usize;
        let recommendations: Vec<_> = fixtures::recommendations(&args.topics)
            .into_iter()
            .take(limit)
            .collect();

        Ok(json!({
            "success": true,
            "recommendations": recommendations,
        }))
    }
}

/// Searches the iTunes podcast directory.
pub struct ItunesPodcastSearch {
    client: reqwest::Client,
    country: String,
}

impl ItunesPodcastSearch {
    pub fn new(client: reqwest::Client, settings: &PodcastSettings) -> Self {
        Self {
            client,
            country: settings.itunes_country.clone(),
        }
    }
}

#[async_trait]
impl Tool for ItunesPodcastSearch {
    fn spec(&self) -> ToolSpec {
        podcast_search_spec(
            "Search iTunes/Apple Podcasts for new podcast recommendations based on topics.",
        )
    }

    #[instrument(skip(self, args))]
    async fn execute(&self, args: Value) -> Result<Value> {
        let args: PodcastSearchArgs = parse_args("search_web_for_podcasts", args)?;
        let term = args.topics.join(" ");
        let limit = args.limit();

        info!("Searching iTunes for: {}", term);
        let shows = search_itunes(&self.client, &term, limit, &self.country).await?;

        Ok(json!({
            "success": true,
            "recommendations": shows,
            "count": shows.len(),
            "source": "iTunes API",
        }))
    }
}

// --- analyze_episode_relevance ---

/// How keyword matches turn into a relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoring {
    /// Demo catalog: generous base, "summarize" above 0.6.
    Mock,
    /// Real feeds: stricter base, "summarize" above 0.5.
    Live,
}

impl Scoring {
    fn base(self) -> f64 {
        match self {
            Scoring::Mock => 0.5,
            Scoring::Live => 0.3,
        }
    }

    fn per_match(self) -> f64 {
        match self {
            Scoring::Mock => 0.15,
            Scoring::Live => 0.2,
        }
    }

    fn threshold(self) -> f64 {
        match self {
            Scoring::Mock => 0.6,
            Scoring::Live => 0.5,
        }
    }
}

/// Keyword relevance of an episode to a set of interests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relevance {
    pub score: f64,
    pub matches: Vec<String>,
    #[serde(skip)]
    threshold: f64,
}

impl Relevance {
    pub fn recommendation(&self) -> &'static str {
        if self.score > self.threshold {
            "summarize"
        } else {
            "skip"
        }
    }
}

/// Base score plus a fixed step per interest found in the title or description, capped at 1.0.
pub fn score_relevance(
    scoring: Scoring,
    title: &str,
    description: &str,
    interests: &[String],
) -> Relevance {
    let text = format!("{} {}", title, description).to_lowercase();
    let matches: Vec<String> = interests
        .iter()
        .filter(|interest| text.contains(&interest.to_lowercase()))
        .cloned()
        .collect();

    let score = (scoring.base() + scoring.per_match() * matches.len() as f64).min(1.0);
    Relevance {
        score: (score * 100.0).round() / 100.0,
        matches,
        threshold: scoring.threshold(),
    }
}

#[derive(Debug, Deserialize)]
struct RelevanceArgs {
    episode_title: String,
    #[serde(default)]
    episode_description: String,
    user_interests: Vec<String>,
}

/// Scores an episode against the listener's interests.
pub struct AnalyzeEpisodeRelevance {
    scoring: Scoring,
}

impl AnalyzeEpisodeRelevance {
    pub fn new(scoring: Scoring) -> Self {
        Self { scoring }
    }
}

#[async_trait]
impl Tool for AnalyzeEpisodeRelevance {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "analyze_episode_relevance",
            "Analyze if an episode is relevant to user's interests. Returns relevance score \
             (0-1) and reasoning. Use this to filter episodes intelligently.",
            json!({
                "type": "object",
                "properties": {
                    "episode_title": { "type": "string", "description": "Episode title" },
                    "episode_description": { "type": "string", "description": "Episode description" },
                    "user_interests": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "User's interest topics"
                    }
                },
                "required": ["episode_title", "user_interests"]
            }),
        )
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: RelevanceArgs = parse_args("analyze_episode_relevance", args)?;
        let relevance = score_relevance(
            self.scoring,
            &args.episode_title,
            &args.episode_description,
            &args.user_interests,
        );

        let reasoning = match self.scoring {
            Scoring::Mock => format!(
                "Episode matches {} of user's interests",
                relevance.matches.len()
            ),
            Scoring::Live if relevance.matches.is_empty() => {
                "Found 0 keyword matches: none".to_string()
            }
            Scoring::Live => format!(
                "Found {} keyword matches: {}",
                relevance.matches.len(),
                relevance.matches.join(", ")
            ),
        };

        Ok(json!({
            "success": true,
            "relevance_score": relevance.score,
            "matches": relevance.matches,
            "reasoning": reasoning,
            "recommendation": relevance.recommendation(),
        }))
    }
}

// --- get_transcript ---

#[derive(Debug, Deserialize)]
struct TranscriptArgs {
    episode_id: String,
}

/// Returns fixture transcripts.
pub struct GetTranscript;

#[async_trait]
impl Tool for GetTranscript {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "get_transcript",
            "Get transcript or content for a specific episode. Try this before summarizing.",
            json!({
                "type": "object",
                "properties": {
                    "episode_id": { "type": "string", "description": "Episode identifier" },
                    "episode_url": { "type": "string", "description": "Episode URL" }
                },
                "required": ["episode_id"]
            }),
        )
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: TranscriptArgs = parse_args("get_transcript", args)?;
        let transcript = fixtures::transcript(&args.episode_id).unwrap_or("Transcript not available");

        Ok(json!({
            "success": true,
            "transcript": transcript,
            "length": transcript.chars().count(),
        }))
    }
}

// --- generate_summary ---

#[derive(Debug, Deserialize)]
struct MockSummaryArgs {
    episode_id: String,
    style: SummaryStyle,
    #[serde(default)]
    focus_areas: Vec<String>,
}

fn style_schema() -> Value {
    json!({
        "type": "string",
        "enum": ["brief", "detailed", "technical"],
        "description": "Summary style - choose based on: brief (user is busy), detailed (user has time), technical (complex topic needs depth)"
    })
}

/// Returns canned summaries.
pub struct MockSummary;

#[async_trait]
impl Tool for MockSummary {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "generate_summary",
            "Generate AI-powered summary of episode. YOU decide the style based on content \
             complexity and user's current context (busy vs free time).",
            json!({
                "type": "object",
                "properties": {
                    "episode_id": { "type": "string" },
                    "transcript": { "type": "string", "description": "Episode transcript" },
                    "style": style_schema(),
                    "focus_areas": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Specific areas to focus on in the summary"
                    }
                },
                "required": ["episode_id", "transcript", "style"]
            }),
        )
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: MockSummaryArgs = parse_args("generate_summary", args)?;
        let summary = fixtures::summary(&args.episode_id, args.style.as_str())
            .unwrap_or("Summary not available");

        Ok(json!({
            "success": true,
            "summary": summary,
            "style_used": args.style,
            "focus_areas": args.focus_areas,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct LiveSummaryArgs {
    episode_title: String,
    #[serde(default)]
    episode_description: String,
    style: SummaryStyle,
}

/// Writes summaries with a one-shot model completion.
pub struct ModelSummary {
    model: Arc<dyn ChatModel>,
    prompts: SummaryPrompts,
    variables: HashMap<String, String>,
}

impl ModelSummary {
    pub fn new(model: Arc<dyn ChatModel>, prompts: &Prompts) -> Self {
        Self {
            model,
            prompts: prompts.summary.clone(),
            variables: prompts.variables.clone(),
        }
    }

    fn instruction(&self, style: SummaryStyle) -> &str {
        match style {
            SummaryStyle::Brief => &self.prompts.brief,
            SummaryStyle::Detailed => &self.prompts.detailed,
            SummaryStyle::Technical => &self.prompts.technical,
        }
    }

    fn prompt(&self, args: &LiveSummaryArgs) -> String {
        let mut vars = self.variables.clone();
        vars.insert("instruction".to_string(), self.instruction(args.style).to_string());
        vars.insert("title".to_string(), args.episode_title.clone());
        vars.insert(
            "description".to_string(),
            head(&args.episode_description, 4000),
        );
        Prompts::render(&self.prompts.user, &vars)
    }
}

#[async_trait]
impl Tool for ModelSummary {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "generate_summary",
            "Generate an AI summary of an episode from its title and description.",
            json!({
                "type": "object",
                "properties": {
                    "episode_title": { "type": "string" },
                    "episode_description": { "type": "string" },
                    "style": style_schema()
                },
                "required": ["episode_title", "episode_description", "style"]
            }),
        )
    }

    #[instrument(skip(self, args))]
    async fn execute(&self, args: Value) -> Result<Value> {
        let args: LiveSummaryArgs = parse_args("generate_summary", args)?;
        info!("Generating {} summary with {}", args.style.as_str(), self.model.name());

        let messages = [Message::user(self.prompt(&args))];
        let turn = self
            .model
            .complete(&messages, &[])
            .await
            .map_err(|e| CurioError::Tool(format!("Summary generation failed: {}", e)))?;

        let summary = turn
            .text_content()
            .ok_or_else(|| CurioError::Tool("Model returned an empty summary".to_string()))?;

        Ok(json!({
            "success": true,
            "summary": summary,
            "style_used": args.style,
            "source": self.model.name(),
        }))
    }
}

// --- send_email_digest ---

/// A digest the agent decided to send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailDigest {
    pub subject: String,
    pub content: String,
    pub priority: Priority,
    pub sent_at: DateTime<Utc>,
}

/// In-process record of sent digests; delivery is simulated.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    sent: Arc<Mutex<Vec<EmailDigest>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, digest: EmailDigest) -> Result<()> {
        self.sent
            .lock()
            .map_err(|e| CurioError::Tool(format!("Failed to acquire lock: {}", e)))?
            .push(digest);
        Ok(())
    }

    /// Digests sent so far, oldest first.
    pub fn sent(&self) -> Vec<EmailDigest> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct EmailArgs {
    subject: String,
    content: String,
    #[serde(default)]
    priority: Priority,
}

/// Records a digest in the outbox.
pub struct SendEmailDigest {
    outbox: Outbox,
}

impl SendEmailDigest {
    pub fn new(outbox: Outbox) -> Self {
        Self { outbox }
    }
}

#[async_trait]
impl Tool for SendEmailDigest {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "send_email_digest",
            "Send email digest to user. Only use when you have valuable content to deliver.",
            json!({
                "type": "object",
                "properties": {
                    "subject": { "type": "string", "description": "Email subject line" },
                    "content": { "type": "string", "description": "Email body in markdown format" },
                    "priority": {
                        "type": "string",
                        "enum": ["low", "normal", "high"],
                        "description": "Email priority based on content value"
                    }
                },
                "required": ["subject", "content"]
            }),
        )
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: EmailArgs = parse_args("send_email_digest", args)?;
        let sent_at = Utc::now();

        info!("Email digest queued: {} ({:?})", args.subject, args.priority);
        self.outbox.push(EmailDigest {
            subject: args.subject,
            content: args.content,
            priority: args.priority,
            sent_at,
        })?;

        Ok(json!({
            "success": true,
            "message": "Email sent successfully",
            "sent_at": sent_at.to_rfc3339(),
        }))
    }
}

// --- save_for_later ---

/// Saves an episode to the reading list.
///
/// Mock mode identifies episodes by `episode_id`, live mode by `episode_title`.
pub struct SaveForLater {
    reading_list: Arc<dyn ReadingList>,
    key: &'static str,
}

impl SaveForLater {
    pub fn by_id(reading_list: Arc<dyn ReadingList>) -> Self {
        Self {
            reading_list,
            key: "episode_id",
        }
    }

    pub fn by_title(reading_list: Arc<dyn ReadingList>) -> Self {
        Self {
            reading_list,
            key: "episode_title",
        }
    }
}

#[derive(Debug, Deserialize)]
struct SaveArgs {
    #[serde(alias = "episode_id", alias = "episode_title")]
    episode: String,
    reason: String,
}

#[async_trait]
impl Tool for SaveForLater {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "save_for_later",
            "Save episode to user's reading list for later review. Use when episode is \
             valuable but not urgent.",
            json!({
                "type": "object",
                "properties": {
                    (self.key): { "type": "string" },
                    "reason": {
                        "type": "string",
                        "description": "Why this should be saved for later"
                    }
                },
                "required": [self.key, "reason"]
            }),
        )
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: SaveArgs = parse_args("save_for_later", args)?;
        let item = SavedItem::new(args.episode, args.reason);
        self.reading_list.save(&item).await?;

        info!("Saved for later: {}", item.episode);
        Ok(json!({
            "success": true,
            "message": format!("Episode {} saved to reading list", item.episode),
            "id": item.id,
            "reason": item.reason,
        }))
    }
}
