//! Content discovery tools: thin wrappers over public search APIs.
//!
//! Every tool takes `query` and an optional `max_results` (1-10) and
//! returns `{"success": true, "results": [...], "total": n}`. Transport
//! and status failures become tool errors with readable messages.

use super::feeds::FeedParser;
use super::http::{clamp_max_results, head, send_json, send_text, truncate, DEFAULT_MAX_RESULTS};
use crate::agent::{parse_args, Tool, ToolSpec};
use crate::config::DiscoverySettings;
use crate::error::{CurioError, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, instrument};

const TAVILY_URL: &str = "https://api.tavily.com/search";
const GITHUB_URL: &str = "https://api.github.com/search/repositories";
const BOOKS_URL: &str = "https://www.googleapis.com/books/v1/volumes";
const YOUTUBE_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const REDDIT_URL: &str = "https://www.reddit.com/search.json";
const ARXIV_URL: &str = "https://export.arxiv.org/api/query";

/// Titles that usually mean an unrelated classic rather than a topical book.
const GENERIC_TITLES: &[&str] = &["the architect", "the builder", "the engineer", "the republic"];

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    max_results: Option<u32>,
}

fn search_schema(query_description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": query_description
            },
            "max_results": {
                "type": "integer",
                "description": "Maximum number of results to return (1-10). Default is 5.",
                "default": 5
            }
        },
        "required": ["query"]
    })
}

fn search_output<T: Serialize>(results: &[T]) -> Value {
    json!({
        "success": true,
        "results": results,
        "total": results.len(),
    })
}

fn missing_key(service: &str, env_var: &str) -> CurioError {
    CurioError::Tool(format!(
        "No {} API key configured. Set {} or add it to the [discovery] config section.",
        service, env_var
    ))
}

/// Shared state for discovery tools.
#[derive(Clone)]
pub struct DiscoveryContext {
    pub client: reqwest::Client,
    pub settings: DiscoverySettings,
}

impl DiscoveryContext {
    pub fn new(client: reqwest::Client, settings: DiscoverySettings) -> Self {
        Self { client, settings }
    }

    fn parse(&self, tool: &str, args: Value) -> Result<(String, u32)> {
        let args: SearchArgs = parse_args(tool, args)?;
        let max = clamp_max_results(args.max_results, self.default_max());
        Ok((args.query, max))
    }

    fn default_max(&self) -> u32 {
        if self.settings.max_results == 0 {
            DEFAULT_MAX_RESULTS
        } else {
            self.settings.max_results
        }
    }
}

// --- Tavily web search ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TavilyResponse {
    results: Vec<TavilyItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TavilyItem {
    title: String,
    url: String,
    content: String,
    score: f64,
}

/// A web search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebResult {
    pub title: String,
    pub url: String,
    pub content: String,
    pub score: f64,
}

fn parse_tavily(response: TavilyResponse) -> Vec<WebResult> {
    response
        .results
        .into_iter()
        .map(|item| WebResult {
            title: item.title,
            url: item.url,
            content: item.content,
            score: item.score,
        })
        .collect()
}

/// Web search via Tavily.
pub struct WebSearch {
    ctx: DiscoveryContext,
}

impl WebSearch {
    pub fn new(ctx: DiscoveryContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "web_search",
            "Search the web for current information, articles, and blogs. \
             Best for finding recent content, articles, blog posts, and general information. \
             Use this when the user wants to find online resources, current trends, or \
             up-to-date information on any topic.",
            search_schema("The search query. Be specific and include relevant keywords."),
        )
    }

    #[instrument(skip(self, args))]
    async fn execute(&self, args: Value) -> Result<Value> {
        let (query, max) = self.ctx.parse("web_search", args)?;
        let key = self
            .ctx
            .settings
            .tavily_key()
            .ok_or_else(|| missing_key("Tavily", "TAVILY_API_KEY"))?;

        info!("Searching the web for: {}", query);
        let request = self.ctx.client.post(TAVILY_URL).json(&json!({
            "api_key": key,
            "query": query,
            "max_results": max,
            "search_depth": "basic",
            "include_answer": false,
            "include_raw_content": false,
        }));

        let response: TavilyResponse = send_json("Tavily", request).await?;
        Ok(search_output(&parse_tavily(response)))
    }
}

// --- GitHub repository search ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GithubResponse {
    items: Vec<GithubRepo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GithubRepo {
    full_name: String,
    description: Option<String>,
    html_url: String,
    stargazers_count: u64,
    language: Option<String>,
    topics: Vec<String>,
    updated_at: String,
}

/// A repository hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoResult {
    pub name: String,
    pub description: String,
    pub url: String,
    pub stars: u64,
    pub language: String,
    pub topics: Vec<String>,
    pub last_updated: String,
}

fn parse_github(response: GithubResponse) -> Vec<RepoResult> {
    response
        .items
        .into_iter()
        .map(|repo| RepoResult {
            name: repo.full_name,
            description: repo
                .description
                .unwrap_or_else(|| "No description provided".to_string()),
            url: repo.html_url,
            stars: repo.stargazers_count,
            language: repo.language.unwrap_or_else(|| "Not specified".to_string()),
            topics: repo.topics,
            last_updated: repo.updated_at,
        })
        .collect()
}

/// Repository search on GitHub, sorted by stars.
pub struct GithubSearch {
    ctx: DiscoveryContext,
}

impl GithubSearch {
    pub fn new(ctx: DiscoveryContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GithubSearch {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "github_search",
            "Search GitHub for relevant code repositories and projects. \
             Best for technical topics where open-source projects, code examples, \
             or developer tools are relevant. Returns repository name, description, \
             stars, programming language, and URL.",
            search_schema(
                "Search query for GitHub repositories. Can include qualifiers like \
                 'language:python' or 'stars:>1000'.",
            ),
        )
    }

    #[instrument(skip(self, args))]
    async fn execute(&self, args: Value) -> Result<Value> {
        let (query, max) = self.ctx.parse("github_search", args)?;

        info!("Searching GitHub for: {}", query);
        let per_page = max.to_string();
        let mut request = self
            .ctx
            .client
            .get(GITHUB_URL)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .query(&[
                ("q", query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ]);
        // Unauthenticated search works with a lower rate limit.
        if let Some(token) = self.ctx.settings.github_key() {
            request = request.bearer_auth(token);
        }

        let response: GithubResponse = send_json("GitHub", request).await?;
        Ok(search_output(&parse_github(response)))
    }
}

// --- Google Books search ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BooksResponse {
    items: Vec<BookItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BookItem {
    #[serde(rename = "volumeInfo")]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    authors: Vec<String>,
    published_date: Option<String>,
    description: Option<String>,
    average_rating: Option<f64>,
    ratings_count: u64,
    page_count: Option<u64>,
    categories: Vec<String>,
    info_link: String,
    preview_link: String,
}

/// A book hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookResult {
    pub title: String,
    pub authors: String,
    pub published_date: String,
    pub description: String,
    pub rating: Option<f64>,
    pub rating_count: u64,
    pub page_count: Option<u64>,
    pub categories: Vec<String>,
    pub info_link: String,
    pub preview_link: String,
}

/// Whether a book looks relevant to the query.
///
/// Rejects missing or short descriptions (< 50 chars) and generic titles, and
/// requires query terms in the title or description: at least one term for
/// queries of up to two terms, at least two otherwise.
pub fn is_book_relevant(book: &BookResult, query: &str) -> bool {
    if book.description.chars().count() < 50 {
        return false;
    }

    let title = book.title.to_lowercase();
    if GENERIC_TITLES.iter().any(|generic| title.contains(generic)) {
        return false;
    }

    let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    let text = format!("{} {}", title, book.description.to_lowercase());
    let min_matches = if terms.len() <= 2 { 1 } else { 2 };
    let matches = terms.iter().filter(|term| text.contains(term.as_str())).count();

    matches >= min_matches
}

fn book_from_volume(info: VolumeInfo) -> BookResult {
    let authors = if info.authors.is_empty() {
        "Unknown Author".to_string()
    } else {
        info.authors.join(", ")
    };
    BookResult {
        title: info.title.unwrap_or_else(|| "Unknown Title".to_string()),
        authors,
        published_date: info.published_date.unwrap_or_else(|| "Unknown".to_string()),
        description: info
            .description
            .map(|d| truncate(&d, 300))
            .unwrap_or_default(),
        rating: info.average_rating,
        rating_count: info.ratings_count,
        page_count: info.page_count,
        categories: info.categories,
        info_link: info.info_link,
        preview_link: info.preview_link,
    }
}

/// Filter fetched books for relevance. Returns the kept books and how many were dropped.
fn parse_books(response: BooksResponse, query: &str, max: usize) -> (Vec<BookResult>, usize) {
    let raw: Vec<BookResult> = response
        .items
        .into_iter()
        .take(max * 3)
        .map(|item| book_from_volume(item.volume_info))
        .collect();
    let raw_count = raw.len();

    let relevant: Vec<BookResult> = raw
        .into_iter()
        .filter(|book| is_book_relevant(book, query))
        .collect();
    let filtered_count = raw_count - relevant.len();

    (relevant.into_iter().take(max).collect(), filtered_count)
}

/// Book search on Google Books with a relevance filter.
pub struct BooksSearch {
    ctx: DiscoveryContext,
}

impl BooksSearch {
    pub fn new(ctx: DiscoveryContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for BooksSearch {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "books_search",
            "Search Google Books for relevant books and publications. \
             Best for topics where comprehensive guides, deep reading, or structured \
             learning materials are valuable. Returns book title, authors, description, \
             ratings, and links.",
            search_schema(
                "Search query for books. Include topic keywords and optionally author names.",
            ),
        )
    }

    #[instrument(skip(self, args))]
    async fn execute(&self, args: Value) -> Result<Value> {
        let (query, max) = self.ctx.parse("books_search", args)?;

        info!("Searching Google Books for: {}", query);
        // Over-fetch so the relevance filter still leaves enough results.
        let fetch = (max * 3).min(40).to_string();
        let mut params = vec![
            ("q", query.clone()),
            ("maxResults", fetch),
            ("orderBy", "relevance".to_string()),
            ("printType", "books".to_string()),
        ];
        if let Some(key) = self.ctx.settings.google_key() {
            params.push(("key", key));
        }

        let request = self.ctx.client.get(BOOKS_URL).query(&params);
        let response: BooksResponse = send_json("Google Books", request).await?;
        let (books, filtered_count) = parse_books(response, &query, max as usize);

        Ok(json!({
            "success": true,
            "results": books,
            "total": books.len(),
            "filtered_count": filtered_count,
        }))
    }
}

// --- YouTube video search ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YoutubeResponse {
    items: Vec<YoutubeItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YoutubeItem {
    id: YoutubeId,
    snippet: YoutubeSnippet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct YoutubeId {
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct YoutubeSnippet {
    title: String,
    description: String,
    channel_title: String,
    published_at: String,
    thumbnails: Value,
}

/// A video hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoResult {
    pub title: String,
    pub description: String,
    pub channel: String,
    pub published_at: String,
    pub url: String,
    pub thumbnail: String,
}

fn parse_youtube(response: YoutubeResponse) -> Vec<VideoResult> {
    response
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = item.id.video_id?;
            let snippet = item.snippet;
            let thumbnail = snippet
                .thumbnails
                .pointer("/medium/url")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Some(VideoResult {
                title: snippet.title,
                description: head(&snippet.description, 300),
                channel: snippet.channel_title,
                published_at: head(&snippet.published_at, 10),
                url: format!("https://www.youtube.com/watch?v={}", video_id),
                thumbnail,
            })
        })
        .collect()
}

/// Video search on YouTube.
pub struct YoutubeSearch {
    ctx: DiscoveryContext,
}

impl YoutubeSearch {
    pub fn new(ctx: DiscoveryContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for YoutubeSearch {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "youtube_search",
            "Search YouTube for relevant videos, tutorials, and educational content. \
             Best for topics where visual demonstrations, walkthroughs, or video tutorials \
             would be helpful. Returns video title, description, channel, and URL.",
            search_schema(
                "Search query for YouTube videos. Include relevant keywords and context.",
            ),
        )
    }

    #[instrument(skip(self, args))]
    async fn execute(&self, args: Value) -> Result<Value> {
        let (query, max) = self.ctx.parse("youtube_search", args)?;
        let key = self
            .ctx
            .settings
            .google_key()
            .ok_or_else(|| missing_key("YouTube", "GOOGLE_API_KEY"))?;

        info!("Searching YouTube for: {}", query);
        let max_results = max.to_string();
        let request = self.ctx.client.get(YOUTUBE_URL).query(&[
            ("part", "snippet"),
            ("q", query.as_str()),
            ("key", key.as_str()),
            ("maxResults", max_results.as_str()),
            ("type", "video"),
            ("order", "relevance"),
            ("safeSearch", "moderate"),
        ]);

        let response: YoutubeResponse = send_json("YouTube", request).await?;
        Ok(search_output(&parse_youtube(response)))
    }
}

// --- Reddit search ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RedditResponse {
    data: RedditListing,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RedditListing {
    children: Vec<RedditChild>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RedditChild {
    data: RedditPost,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RedditPost {
    title: String,
    subreddit_name_prefixed: String,
    author: String,
    score: i64,
    num_comments: u64,
    permalink: String,
    selftext: String,
    created_utc: f64,
}

/// A discussion hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostResult {
    pub title: String,
    pub subreddit: String,
    pub author: String,
    pub score: i64,
    pub num_comments: u64,
    pub url: String,
    pub content: String,
    pub created: f64,
}

fn parse_reddit(response: RedditResponse) -> Vec<PostResult> {
    response
        .data
        .children
        .into_iter()
        .map(|child| {
            let post = child.data;
            PostResult {
                title: post.title,
                subreddit: post.subreddit_name_prefixed,
                author: post.author,
                score: post.score,
                num_comments: post.num_comments,
                url: format!("https://www.reddit.com{}", post.permalink),
                content: head(&post.selftext, 300),
                created: post.created_utc,
            }
        })
        .collect()
}

/// Discussion search on Reddit's public JSON endpoint.
pub struct RedditSearch {
    ctx: DiscoveryContext,
}

impl RedditSearch {
    pub fn new(ctx: DiscoveryContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for RedditSearch {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "reddit_search",
            "Search Reddit for community discussions, user experiences, and practical advice. \
             Best for finding real-world perspectives, troubleshooting tips, and community \
             insights. Returns post title, subreddit, discussion URL, score, and number of comments.",
            search_schema("Search query for Reddit discussions. Use natural language."),
        )
    }

    #[instrument(skip(self, args))]
    async fn execute(&self, args: Value) -> Result<Value> {
        let (query, max) = self.ctx.parse("reddit_search", args)?;

        info!("Searching Reddit for: {}", query);
        let limit = max.to_string();
        // Reddit rejects requests without a descriptive User-Agent.
        let request = self
            .ctx
            .client
            .get(REDDIT_URL)
            .header(reqwest::header::USER_AGENT, &self.ctx.settings.user_agent)
            .query(&[
                ("q", query.as_str()),
                ("limit", limit.as_str()),
                ("sort", "relevance"),
                ("type", "link"),
            ]);

        let response: RedditResponse = send_json("Reddit", request).await?;
        Ok(search_output(&parse_reddit(response)))
    }
}

// --- arXiv search ---

/// An academic paper.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperResult {
    pub title: String,
    pub authors: String,
    pub summary: String,
    pub category: String,
    pub published_date: String,
    pub url: String,
    pub pdf_url: String,
}

/// Reads the Atom feed returned by the arXiv query API.
pub struct ArxivParser {
    feed: FeedParser,
    category: Regex,
}

impl Default for ArxivParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ArxivParser {
    pub fn new() -> Self {
        Self {
            feed: FeedParser::new(),
            category: Regex::new(r#"(?i)<arxiv:primary_category\b[^>]*\bterm\s*=\s*["']([^"']+)["']"#)
                .expect("Invalid regex"),
        }
    }

    pub fn parse(&self, xml: &str, max: usize) -> Vec<PaperResult> {
        self.feed
            .entries(xml, max)
            .into_iter()
            .map(|entry| self.paper(entry))
            .collect()
    }

    fn paper(&self, entry: &str) -> PaperResult {
        let title = self
            .feed
            .element(entry, "title")
            .map(|t| collapse_whitespace(&t))
            .unwrap_or_else(|| "No title".to_string());
        let summary = self
            .feed
            .element(entry, "summary")
            .map(|s| head(&collapse_whitespace(&s), 300))
            .unwrap_or_default();
        let category = self
            .category
            .captures(entry)
            .and_then(|c| c.get(1))
            .map_or_else(|| "Unknown".to_string(), |m| m.as_str().to_string());
        let published_date = self
            .feed
            .element(entry, "published")
            .map(|p| head(&p, 10))
            .unwrap_or_else(|| "Unknown".to_string());
        let url = self.feed.element(entry, "id").unwrap_or_default();
        let pdf_url = if url.is_empty() {
            String::new()
        } else {
            format!("{}.pdf", url.replace("/abs/", "/pdf/"))
        };

        PaperResult {
            title,
            authors: author_list(&self.feed.elements(entry, "name")),
            summary,
            category,
            published_date,
            url,
            pdf_url,
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First three authors, then "et al.".
fn author_list(authors: &[String]) -> String {
    let shown = authors.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
    if authors.len() > 3 {
        format!("{} et al.", shown)
    } else {
        shown
    }
}

/// Paper search on the open arXiv API.
pub struct ArxivSearch {
    ctx: DiscoveryContext,
    parser: ArxivParser,
}

impl ArxivSearch {
    pub fn new(ctx: DiscoveryContext) -> Self {
        Self {
            ctx,
            parser: ArxivParser::new(),
        }
    }
}

#[async_trait]
impl Tool for ArxivSearch {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "arxiv_search",
            "Search arXiv for academic papers and research publications. Best for scientific \
             and technical topics where cutting-edge research or theoretical foundations are \
             valuable. Returns paper title, authors, abstract, category, and PDF link.",
            search_schema("Search query for academic papers. Use technical terms and keywords."),
        )
    }

    #[instrument(skip(self, args))]
    async fn execute(&self, args: Value) -> Result<Value> {
        let (query, max) = self.ctx.parse("arxiv_search", args)?;

        info!("Searching arXiv for: {}", query);
        let search_query = format!("all:{}", query);
        let max_results = max.to_string();
        let request = self.ctx.client.get(ARXIV_URL).query(&[
            ("search_query", search_query.as_str()),
            ("start", "0"),
            ("max_results", max_results.as_str()),
            ("sortBy", "relevance"),
            ("sortOrder", "descending"),
        ]);

        let xml = send_text("arXiv", request).await?;
        Ok(search_output(&self.parser.parse(&xml, max as usize)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, description: &str) -> BookResult {
        BookResult {
            title: title.to_string(),
            authors: "Someone".to_string(),
            published_date: "2020".to_string(),
            description: description.to_string(),
            rating: None,
            rating_count: 0,
            page_count: None,
            categories: vec![],
            info_link: String::new(),
            preview_link: String::new(),
        }
    }

    fn ctx() -> DiscoveryContext {
        DiscoveryContext::new(reqwest::Client::new(), DiscoverySettings::default())
    }

    #[test]
    fn test_parse_tavily() {
        let response: TavilyResponse = serde_json::from_value(json!({
            "results": [
                { "title": "Rust Book", "url": "https://doc.rust-lang.org/book/", "content": "Learn Rust", "score": 0.98 },
                { "title": "No score", "url": "https://example.com" }
            ]
        }))
        .unwrap();

        let results = parse_tavily(response);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust Book");
        assert_eq!(results[1].score, 0.0);
        assert_eq!(results[1].content, "");
    }

    #[test]
    fn test_parse_github_fills_missing_fields() {
        let response: GithubResponse = serde_json::from_value(json!({
            "total_count": 1,
            "items": [{
                "full_name": "tokio-rs/tokio",
                "description": null,
                "html_url": "https://github.com/tokio-rs/tokio",
                "stargazers_count": 27000,
                "language": null,
                "topics": ["async"],
                "updated_at": "2025-01-01T00:00:00Z"
            }]
        }))
        .unwrap();

        let repos = parse_github(response);
        assert_eq!(repos[0].name, "tokio-rs/tokio");
        assert_eq!(repos[0].description, "No description provided");
        assert_eq!(repos[0].language, "Not specified");
        assert_eq!(repos[0].stars, 27000);
    }

    #[test]
    fn test_book_relevance_rules() {
        let long = "A practical guide to product management for AI products, covering discovery and delivery.";

        assert!(is_book_relevant(&book("AI Product Management", long), "AI product"));
        // Short description.
        assert!(!is_book_relevant(&book("AI Product Management", "Too short."), "AI"));
        // Generic title.
        assert!(!is_book_relevant(&book("The Republic", long), "product"));
        // Long query needs two matching terms.
        assert!(!is_book_relevant(
            &book("Cooking Basics", "An introduction to cooking for beginners with simple recipes and tips."),
            "quantum error correction codes"
        ));
        assert!(is_book_relevant(&book("AI Product Management", long), "product management strategy guide"));
    }

    #[test]
    fn test_parse_books_filters_and_counts() {
        let long = "Deep learning explained from first principles, with worked examples in Python.";
        let response: BooksResponse = serde_json::from_value(json!({
            "items": [
                { "volumeInfo": { "title": "Deep Learning", "authors": ["Goodfellow", "Bengio"], "description": long } },
                { "volumeInfo": { "title": "Untitled pamphlet" } },
                { "volumeInfo": { "title": "The Architect", "description": long } },
                { "volumeInfo": { "title": "Learning Deep Structures", "description": long } }
            ]
        }))
        .unwrap();

        let (books, filtered) = parse_books(response, "deep learning", 1);
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].authors, "Goodfellow, Bengio");
        assert_eq!(filtered, 2);
    }

    #[test]
    fn test_book_description_truncated() {
        let info = VolumeInfo {
            title: Some("Long".to_string()),
            description: Some("word ".repeat(100)),
            ..Default::default()
        };
        let book = book_from_volume(info);
        assert_eq!(book.description.chars().count(), 300);
        assert_eq!(book.authors, "Unknown Author");
    }

    #[test]
    fn test_parse_youtube_skips_non_videos() {
        let response: YoutubeResponse = serde_json::from_value(json!({
            "items": [
                {
                    "id": { "kind": "youtube#video", "videoId": "abc123def45" },
                    "snippet": {
                        "title": "Rust in 100 seconds",
                        "description": "Quick intro",
                        "channelTitle": "Fireship",
                        "publishedAt": "2021-05-03T14:00:00Z",
                        "thumbnails": { "medium": { "url": "https://i.ytimg.com/vi/abc/mq.jpg" } }
                    }
                },
                { "id": { "kind": "youtube#channel", "channelId": "xyz" }, "snippet": { "title": "A channel" } }
            ]
        }))
        .unwrap();

        let videos = parse_youtube(response);
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].url, "https://www.youtube.com/watch?v=abc123def45");
        assert_eq!(videos[0].published_at, "2021-05-03");
        assert_eq!(videos[0].thumbnail, "https://i.ytimg.com/vi/abc/mq.jpg");
    }

    #[test]
    fn test_parse_reddit() {
        let response: RedditResponse = serde_json::from_value(json!({
            "data": {
                "children": [{
                    "kind": "t3",
                    "data": {
                        "title": "Best resources for learning Rust?",
                        "subreddit_name_prefixed": "r/rust",
                        "author": "ferris",
                        "score": 420,
                        "num_comments": 69,
                        "permalink": "/r/rust/comments/abc/best_resources/",
                        "selftext": "x".repeat(500),
                        "created_utc": 1700000000.0
                    }
                }]
            }
        }))
        .unwrap();

        let posts = parse_reddit(response);
        assert_eq!(posts[0].url, "https://www.reddit.com/r/rust/comments/abc/best_resources/");
        assert_eq!(posts[0].content.len(), 300);
        assert_eq!(posts[0].subreddit, "r/rust");
    }

    #[test]
    fn test_args_clamped() {
        let (query, max) = ctx()
            .parse("web_search", json!({ "query": "rust", "max_results": 99 }))
            .unwrap();
        assert_eq!(query, "rust");
        assert_eq!(max, 10);

        let (_, max) = ctx().parse("web_search", json!({ "query": "rust" })).unwrap();
        assert_eq!(max, 5);
    }

    #[tokio::test]
    async fn test_missing_key_is_tool_error() {
        std::env::remove_var("TAVILY_API_KEY");
        let tool = WebSearch::new(ctx());
        let err = tool.execute(json!({ "query": "rust" })).await.unwrap_err();
        assert!(err.to_string().contains("TAVILY_API_KEY"));
    }

    #[test]
    fn test_all_specs_require_query() {
        let specs = [
            WebSearch::new(ctx()).spec(),
            GithubSearch::new(ctx()).spec(),
            BooksSearch::new(ctx()).spec(),
            YoutubeSearch::new(ctx()).spec(),
            RedditSearch::new(ctx()).spec(),
            ArxivSearch::new(ctx()).spec(),
        ];
        for spec in specs {
            assert_eq!(spec.required_fields(), vec!["query"]);
        }
    }

    const ARXIV_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:transformers</title>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All
      You Need</title>
    <summary>  The dominant sequence transduction models are based on complex
recurrent or convolutional neural networks.</summary>
    <author><name>Ashish Vaswani</name></author>
    <author><name>Noam Shazeer</name></author>
    <author><name>Niki Parmar</name></author>
    <author><name>Jakob Uszkoreit</name></author>
    <arxiv:primary_category xmlns:arxiv="http://arxiv.org/schemas/atom" term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2001.00001v1</id>
    <title>Short Paper</title>
    <author><name>Solo Author</name></author>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_arxiv_feed() {
        let papers = ArxivParser::new().parse(ARXIV_FEED, 5);
        assert_eq!(papers.len(), 2);

        let paper = &papers[0];
        assert_eq!(paper.title, "Attention Is All You Need");
        assert_eq!(paper.authors, "Ashish Vaswani, Noam Shazeer, Niki Parmar et al.");
        assert!(paper.summary.starts_with("The dominant sequence"));
        assert!(!paper.summary.contains('\n'));
        assert_eq!(paper.category, "cs.CL");
        assert_eq!(paper.published_date, "2017-06-12");
        assert_eq!(paper.url, "http://arxiv.org/abs/1706.03762v7");
        assert_eq!(paper.pdf_url, "http://arxiv.org/pdf/1706.03762v7.pdf");

        let short = &papers[1];
        assert_eq!(short.authors, "Solo Author");
        assert_eq!(short.category, "Unknown");
        assert_eq!(short.published_date, "Unknown");
        assert_eq!(short.summary, "");
    }

    #[test]
    fn test_arxiv_respects_max_and_truncates_summary() {
        let long = "word ".repeat(200);
        let xml = format!(
            "<feed><entry><id>x</id><title>A</title><summary>{}</summary></entry>\
             <entry><id>y</id><title>B</title></entry></feed>",
            long
        );
        let papers = ArxivParser::new().parse(&xml, 1);
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].summary.chars().count(), 300);
    }

    #[test]
    fn test_author_list() {
        let names: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        assert_eq!(author_list(&names), "A, B, C");
        assert_eq!(author_list(&[]), "");
    }
}
