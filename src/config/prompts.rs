//! Prompt templates for Curio.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub podcast: PodcastPrompts,
    pub discovery: DiscoveryPrompts,
    pub summary: SummaryPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the podcast research agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PodcastPrompts {
    /// Wraps the user's goal in the single opening user turn.
    pub framing: String,
}

impl Default for PodcastPrompts {
    fn default() -> Self {
        Self {
            framing: r#"You are an intelligent, autonomous podcast research agent.

Your goal: {{goal}}

You have access to tools to help achieve this goal. Think strategically:

1. ALWAYS start by checking user preferences to understand what they value
2. Decide if you should fetch recent episodes or search for new podcasts
3. Intelligently filter episodes - don't waste time on irrelevant content
4. Choose appropriate summary styles based on:
   - Content complexity (technical topics need detailed summaries)
   - User's current context (if they mention being busy, use brief)
   - Content type (interviews vs tutorials need different approaches)
5. Only send email when you have genuinely valuable content
6. Use save_for_later for good but not urgent content

Think step-by-step. Explain your reasoning before each tool use.
Make smart decisions autonomously."#
                .to_string(),
        }
    }
}

/// Prompts for the content discovery agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryPrompts {
    pub system: String,
    pub user: String,
}

impl Default for DiscoveryPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an expert content discovery agent. Your job is to help users find the best resources (blogs, articles, repositories, books, videos, etc.) on any topic they're interested in.

When given a topic:
1. First, reason about what types of content would be most valuable for this topic
2. Decide which tools to use based on the topic:
   - web_search: For current articles, blogs, general information
   - github_search: For technical topics where code/projects exist
   - books_search: For topics where deep reading or comprehensive guides help
   - youtube_search: For visual learning, tutorials, demonstrations
   - reddit_search: For community discussions, real user experiences
   - arxiv_search: For academic papers and cutting-edge research
3. Call the appropriate tools to gather information
4. Synthesize the results into a curated, ranked list
5. Explain your reasoning

Important:
- Use multiple tools when appropriate (e.g., web + books + youtube for learning topics)
- Don't use GitHub for non-technical topics (e.g., parenting, relationships)
- Reddit is good for practical experiences and troubleshooting
- YouTube is great for visual/practical learning
- arXiv is for scientific and research topics, not everyday subjects
- Be selective - quality over quantity (max 3-4 tools per query)

After gathering information, provide a structured summary with:
1. Overview of what you found
2. Top recommendations for each category
3. Why you chose these specific resources
4. Suggested order for consuming the content"#
                .to_string(),

            user: "I want to learn about: {{topic}}\n\nPlease find me the best resources available."
                .to_string(),
        }
    }
}

/// Instructions for the live summary tool, one per style.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub brief: String,
    pub detailed: String,
    pub technical: String,
    pub user: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            brief: "Create a brief 2-3 sentence summary.".to_string(),
            detailed: "Create a detailed summary with 5-7 key bullet points.".to_string(),
            technical: "Create an in-depth technical analysis with detailed explanations."
                .to_string(),
            user: r#"{{instruction}}

Episode Title: {{title}}

Episode Description:
{{description}}

Provide a clear, informative summary."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let podcast_path = custom_path.join("podcast.toml");
            if podcast_path.exists() {
                let content = std::fs::read_to_string(&podcast_path)?;
                prompts.podcast = toml::from_str(&content)?;
            }

            let discovery_path = custom_path.join("discovery.toml");
            if discovery_path.exists() {
                let content = std::fs::read_to_string(&discovery_path)?;
                prompts.discovery = toml::from_str(&content)?;
            }

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.podcast.framing.contains("{{goal}}"));
        assert!(prompts.discovery.user.contains("{{topic}}"));
        assert!(!prompts.discovery.system.is_empty());
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut custom = HashMap::new();
        custom.insert("name".to_string(), "config".to_string());
        custom.insert("team".to_string(), "research".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "caller".to_string());

        let result = prompts.render_with_custom("{{name}} / {{team}}", &vars);
        assert_eq!(result, "caller / research");
    }

    #[test]
    fn test_custom_dir_overrides_podcast_framing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("podcast.toml"),
            "framing = \"Goal: {{goal}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.podcast.framing, "Goal: {{goal}}");
        assert!(prompts.discovery.user.contains("{{topic}}"));
    }
}
