//! Configuration module for Curio.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{DiscoveryPrompts, PodcastPrompts, Prompts, SummaryPrompts};
pub use settings::{
    AgentSettings, DiscoverySettings, GeneralSettings, ModelSettings, PodcastPreferences,
    PodcastSettings, Pricing, PromptSettings, ReadingListProvider, ReadingListSettings, Settings,
    Subscription,
};
