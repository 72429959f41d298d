//! Agent orchestrator for Curio.
//!
//! Builds the podcast and content discovery agents from settings and runs them.

use crate::agent::{Agent, AgentRun, ChatModel, OpenAIChatModel, RunObserver, ToolRegistry};
use crate::config::{Prompts, Settings};
use crate::error::{CurioError, Result};
use crate::reading_list::{self, ReadingList};
use crate::tools::{self, podcast::Outbox, PodcastDeps};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Preset podcast goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Busy listener who only wants high-value content.
    Busy,
    /// Listener exploring a new area.
    Discovery,
}

impl Scenario {
    pub fn goal(&self) -> &'static str {
        match self {
            Scenario::Busy => {
                "I'm extremely busy this week. Only send me podcast insights if there's \
                 something genuinely important about AI or technology. Skip everything else. \
                 Keep summaries brief."
            }
            Scenario::Discovery => {
                "I've been listening to tech podcasts but want to explore AI safety and \
                 ethics more deeply. Find me relevant episodes or suggest new podcasts \
                 in this space. Give me detailed summaries since I have time this weekend."
            }
        }
    }
}

/// Per-run overrides of the configured defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Model driving the loop.
    pub model: Option<String>,
    pub max_iterations: Option<usize>,
    /// Use live podcast sources. Falls back to `podcast.live`.
    pub live: Option<bool>,
}

/// The main orchestrator for Curio agents.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
    reading_list: Arc<dyn ReadingList>,
    outbox: Outbox,
    /// Fixed model used instead of the OpenAI client.
    model: Option<Arc<dyn ChatModel>>,
}

impl Orchestrator {
    /// Create a new orchestrator from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let reading_list = reading_list::open(&settings)?;
        info!(
            "Using {} reading list, model {}",
            settings.reading_list.provider, settings.model.name
        );

        Ok(Self {
            settings,
            prompts,
            reading_list,
            outbox: Outbox::new(),
            model: None,
        })
    }

    /// Create an orchestrator with explicit collaborators.
    ///
    /// Every agent and the live summary tool use `model`.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        reading_list: Arc<dyn ReadingList>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            settings,
            prompts,
            reading_list,
            outbox: Outbox::new(),
            model: Some(model),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn prompts(&self) -> &Prompts {
        &self.prompts
    }

    pub fn reading_list(&self) -> &Arc<dyn ReadingList> {
        &self.reading_list
    }

    /// Digests sent by `send_email_digest` during this process.
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    fn chat_model(&self, name: Option<&str>) -> Result<Arc<dyn ChatModel>> {
        match &self.model {
            Some(model) => Ok(model.clone()),
            None => Ok(Arc::new(OpenAIChatModel::from_settings(
                &self.settings.model,
                name,
            )?)),
        }
    }

    fn is_live(&self, opts: &RunOptions) -> bool {
        opts.live.unwrap_or(self.settings.podcast.live)
    }

    fn podcast_tools(&self, live: bool) -> Result<ToolRegistry> {
        let deps = PodcastDeps {
            reading_list: self.reading_list.clone(),
            outbox: self.outbox.clone(),
            summarizer: self.chat_model(Some(&self.settings.model.summary_model))?,
            prompts: self.prompts.clone(),
        };
        tools::podcast_registry(&self.settings, live, deps)
    }

    fn configure(&self, agent: Agent, opts: &RunOptions) -> Agent {
        let agent = agent.with_settings(&self.settings.agent);
        match opts.max_iterations {
            Some(max) => agent.with_max_iterations(max),
            None => agent,
        }
    }

    /// Build the podcast agent.
    pub fn podcast_agent(&self, opts: &RunOptions) -> Result<Agent> {
        let live = self.is_live(opts);
        let tools = self.podcast_tools(live)?;
        let model = self.chat_model(opts.model.as_deref())?;

        // Custom variables first; the agent fills in {{goal}} itself.
        let framing = self
            .prompts
            .render_with_custom(&self.prompts.podcast.framing, &HashMap::new());

        Ok(self.configure(Agent::new(model, tools), opts).with_framing(&framing))
    }

    /// Build the content discovery agent.
    pub fn discovery_agent(&self, opts: &RunOptions) -> Result<Agent> {
        let tools = tools::discovery_registry(&self.settings)?;
        let model = self.chat_model(opts.model.as_deref())?;
        let system = self
            .prompts
            .render_with_custom(&self.prompts.discovery.system, &HashMap::new());

        Ok(self
            .configure(Agent::new(model, tools), opts)
            .with_system_prompt(&system))
    }

    /// Run the podcast agent toward a goal.
    #[instrument(skip(self, observer), fields(live = self.is_live(opts)))]
    pub async fn run_podcast(
        &self,
        goal: &str,
        opts: &RunOptions,
        observer: &dyn RunObserver,
    ) -> Result<AgentRun> {
        let goal = non_empty("goal", goal)?;
        let agent = self.podcast_agent(opts)?;
        info!("Running podcast agent with {} tools", agent.tools().len());
        agent.run_with_observer(goal, observer).await
    }

    /// Run the content discovery agent on a topic.
    #[instrument(skip(self, observer))]
    pub async fn run_discovery(
        &self,
        topic: &str,
        opts: &RunOptions,
        observer: &dyn RunObserver,
    ) -> Result<AgentRun> {
        let topic = non_empty("topic", topic)?;
        let agent = self.discovery_agent(opts)?;

        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), topic.to_string());
        let request = self
            .prompts
            .render_with_custom(&self.prompts.discovery.user, &vars);

        info!("Running discovery agent with {} tools", agent.tools().len());
        agent.run_with_observer(&request, observer).await
    }

    /// Estimated USD cost of a run at the configured prices.
    pub fn estimated_cost(&self, run: &AgentRun) -> f64 {
        run.usage.estimated_cost(&self.settings.model.pricing)
    }

    /// Podcast and discovery tools in one catalog.
    pub fn all_tools(&self) -> Result<ToolRegistry> {
        let live = self.settings.podcast.live;
        Ok(self
            .podcast_tools(live)?
            .merge(tools::discovery_registry(&self.settings)?))
    }
}

fn non_empty<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CurioError::InvalidInput(format!("{} must not be empty", what)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{
        Message, ModelTurn, RunOutcome, ScriptedModel, SilentObserver, ToolInvocation,
        TruncationReason, Usage,
    };
    use crate::reading_list::MemoryReadingList;

    fn orchestrator(model: Arc<ScriptedModel>) -> Orchestrator {
        Orchestrator::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(MemoryReadingList::new()),
            model,
        )
    }

    fn user_text(messages: &[Message]) -> String {
        messages
            .iter()
            .find_map(|m| match m {
                Message::User { content } => Some(content.clone()),
                _ => None,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_podcast_goal_is_framed() {
        let model = Arc::new(ScriptedModel::new(vec![ModelTurn::text("done")]));
        let orch = orchestrator(model.clone());

        let run = orch
            .run_podcast("Find AI episodes", &RunOptions::default(), &SilentObserver)
            .await
            .unwrap();

        assert!(run.outcome.is_completed());
        let sent = user_text(&model.requests()[0]);
        assert!(sent.contains("Find AI episodes"));
        assert!(!sent.contains("{{goal}}"));
    }

    #[tokio::test]
    async fn test_podcast_run_saves_to_reading_list() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelTurn::tools(vec![ToolInvocation::new(
                "call_1",
                "save_for_later",
                r#"{"episode_id": "ep_003", "reason": "weekend"}"#,
            )]),
            ModelTurn::text("Saved one episode."),
        ]));
        let orch = orchestrator(model);

        let run = orch
            .run_podcast(Scenario::Busy.goal(), &RunOptions::default(), &SilentObserver)
            .await
            .unwrap();

        assert_eq!(run.tools_used(), vec!["save_for_later"]);
        let saved = orch.reading_list().list().await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].episode, "ep_003");
    }

    #[tokio::test]
    async fn test_max_iterations_override() {
        let model = Arc::new(ScriptedModel::repeating(ModelTurn::tools(vec![
            ToolInvocation::new("call_1", "check_user_preferences", "{}"),
        ])));
        let orch = orchestrator(model.clone());
        let opts = RunOptions {
            max_iterations: Some(2),
            ..Default::default()
        };

        let run = orch.run_podcast("anything", &opts, &SilentObserver).await.unwrap();

        assert_eq!(model.call_count(), 2);
        assert!(matches!(
            run.outcome,
            RunOutcome::Truncated {
                reason: TruncationReason::IterationCap,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_discovery_uses_system_prompt_and_topic() {
        let model = Arc::new(ScriptedModel::new(vec![ModelTurn::text("resources")]));
        let orch = orchestrator(model.clone());

        orch.run_discovery("Rust async", &RunOptions::default(), &SilentObserver)
            .await
            .unwrap();

        let request = &model.requests()[0];
        assert!(matches!(request[0], Message::System { .. }));
        assert!(user_text(request).contains("Rust async"));
    }

    #[tokio::test]
    async fn test_empty_goal_rejected() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let orch = orchestrator(model.clone());

        let err = orch
            .run_podcast("   ", &RunOptions::default(), &SilentObserver)
            .await
            .unwrap_err();

        assert!(matches!(err, CurioError::InvalidInput(_)));
        assert_eq!(model.call_count(), 0);
    }

    #[test]
    fn test_live_flag_selects_catalog() {
        let orch = orchestrator(Arc::new(ScriptedModel::new(vec![])));
        let mock = orch.podcast_agent(&RunOptions::default()).unwrap();
        assert!(mock.tools().contains("get_transcript"));

        let live = orch
            .podcast_agent(&RunOptions {
                live: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert!(!live.tools().contains("get_transcript"));
    }

    #[test]
    fn test_all_tools_combines_catalogs() {
        let orch = orchestrator(Arc::new(ScriptedModel::new(vec![])));
        let tools = orch.all_tools().unwrap();
        assert_eq!(tools.len(), 14);
        assert!(tools.contains("web_search"));
        assert!(tools.contains("fetch_new_episodes"));
    }

    #[test]
    fn test_estimated_cost() {
        let orch = orchestrator(Arc::new(ScriptedModel::new(vec![])));
        let run = AgentRun {
            outcome: RunOutcome::Completed {
                content: String::new(),
            },
            iterations: 1,
            tool_calls: vec![],
            usage: Usage::new(1_000_000, 0),
            messages: vec![],
        };
        assert!((orch.estimated_cost(&run) - 3.0).abs() < 1e-9);
    }
}
