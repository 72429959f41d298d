//! Tool catalogs for the podcast and content discovery agents.

pub mod discovery;
pub mod feeds;
pub mod fixtures;
pub mod http;
pub mod podcast;

use crate::agent::{ChatModel, ToolRegistry};
use crate::config::Settings;
use crate::error::Result;
use crate::reading_list::ReadingList;
use discovery::{
    ArxivSearch, BooksSearch, DiscoveryContext, GithubSearch, RedditSearch, WebSearch,
    YoutubeSearch,
};
use podcast::{
    AnalyzeEpisodeRelevance, CheckUserPreferences, GetTranscript, ItunesPodcastSearch,
    MockEpisodeFeed, MockPodcastSearch, MockSummary, ModelSummary, Outbox, RssEpisodeFeed,
    SaveForLater, Scoring, SendEmailDigest,
};
use std::sync::Arc;

pub use podcast::{EmailDigest, Priority, SummaryStyle};

/// Collaborators the podcast tools need.
pub struct PodcastDeps {
    pub reading_list: Arc<dyn ReadingList>,
    pub outbox: Outbox,
    /// Model used by the live summary tool.
    pub summarizer: Arc<dyn ChatModel>,
    pub prompts: crate::config::Prompts,
}

/// Build the podcast agent's catalog.
///
/// Mock mode offers eight fixture-backed tools. Live mode replaces search,
/// episode fetching and summarizing with real sources and drops the
/// transcript and email tools.
pub fn podcast_registry(settings: &Settings, live: bool, deps: PodcastDeps) -> Result<ToolRegistry> {
    let podcast = &settings.podcast;
    let registry = ToolRegistry::new().with(CheckUserPreferences::new(podcast));

    if !live {
        return Ok(registry
            .with(MockEpisodeFeed)
            .with(MockPodcastSearch)
            .with(AnalyzeEpisodeRelevance::new(Scoring::Mock))
            .with(GetTranscript)
            .with(MockSummary)
            .with(SendEmailDigest::new(deps.outbox))
            .with(SaveForLater::by_id(deps.reading_list)));
    }

    let client = http::build_client(
        settings.discovery.request_timeout_seconds,
        &settings.discovery.user_agent,
    )?;

    Ok(registry
        .with(ItunesPodcastSearch::new(client.clone(), podcast))
        .with(RssEpisodeFeed::new(client, podcast))
        .with(AnalyzeEpisodeRelevance::new(Scoring::Live))
        .with(ModelSummary::new(deps.summarizer, &deps.prompts))
        .with(SaveForLater::by_title(deps.reading_list)))
}

/// Build the content discovery agent's catalog.
pub fn discovery_registry(settings: &Settings) -> Result<ToolRegistry> {
    let client = http::build_client(
        settings.discovery.request_timeout_seconds,
        &settings.discovery.user_agent,
    )?;
    let ctx = DiscoveryContext::new(client, settings.discovery.clone());

    Ok(ToolRegistry::new()
        .with(WebSearch::new(ctx.clone()))
        .with(GithubSearch::new(ctx.clone()))
        .with(BooksSearch::new(ctx.clone()))
        .with(YoutubeSearch::new(ctx.clone()))
        .with(RedditSearch::new(ctx.clone()))
        .with(ArxivSearch::new(ctx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ScriptedModel;
    use crate::reading_list::MemoryReadingList;

    fn deps() -> PodcastDeps {
        PodcastDeps {
            reading_list: Arc::new(MemoryReadingList::new()),
            outbox: Outbox::new(),
            summarizer: Arc::new(ScriptedModel::new(vec![])),
            prompts: crate::config::Prompts::default(),
        }
    }

    #[test]
    fn test_mock_podcast_catalog() {
        let registry = podcast_registry(&Settings::default(), false, deps()).unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "check_user_preferences",
                "fetch_new_episodes",
                "search_web_for_podcasts",
                "analyze_episode_relevance",
                "get_transcript",
                "generate_summary",
                "send_email_digest",
                "save_for_later",
            ]
        );
    }

    #[test]
    fn test_live_podcast_catalog() {
        let registry = podcast_registry(&Settings::default(), true, deps()).unwrap();
        assert_eq!(registry.len(), 6);
        assert!(!registry.contains("get_transcript"));
        assert!(!registry.contains("send_email_digest"));
        let summary = registry.get("generate_summary").unwrap().spec();
        assert!(summary.required_fields().contains(&"episode_title"));
    }

    #[test]
    fn test_discovery_catalog() {
        let registry = discovery_registry(&Settings::default()).unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "web_search",
                "github_search",
                "books_search",
                "youtube_search",
                "reddit_search",
                "arxiv_search"
            ]
        );
    }
}
