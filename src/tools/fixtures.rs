//! Fixture data served by the podcast tools in mock mode.

use serde::Serialize;

/// A podcast episode as returned by `fetch_new_episodes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Episode {
    pub id: &'static str,
    pub podcast: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub url: &'static str,
    pub duration: &'static str,
    pub published: &'static str,
}

pub const EPISODES: &[Episode] = &[
    Episode {
        id: "ep_001",
        podcast: "Lex Fridman Podcast",
        title: "Yann LeCun: AI Safety, Deep Learning, and the Future of AI",
        description: "Yann LeCun discusses AI safety concerns, the limitations of current LLMs, \
                      and why he believes AGI is still far away. Deep dive into self-supervised \
                      learning and world models.",
        url: "https://example.com/lex-yann-lecun",
        duration: "3h 15m",
        published: "2024-01-03",
    },
    Episode {
        id: "ep_002",
        podcast: "Tim Ferriss Show",
        title: "Master Chef Gordon Ramsay on Cooking Techniques",
        description: "Gordon Ramsay shares his favorite recipes and cooking tips for home chefs.",
        url: "https://example.com/tim-gordon",
        duration: "2h 10m",
        published: "2024-01-03",
    },
    Episode {
        id: "ep_003",
        podcast: "Acquired",
        title: "NVIDIA: The AI Chip Wars",
        description: "Deep dive into NVIDIA's dominance in AI chips, Jensen Huang's strategy, \
                      and the competitive landscape with AMD and startups.",
        url: "https://example.com/acquired-nvidia",
        duration: "4h 30m",
        published: "2024-01-02",
    },
];

/// A recommended show from the mock podcast search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub name: String,
    pub description: String,
    pub rss_url: String,
    pub relevance_score: f64,
}

/// Mock search result for the given topics.
pub fn recommendations(topics: &[String]) -> Vec<Recommendation> {
    vec![Recommendation {
        name: "The Robot Brains Podcast".to_string(),
        description: format!(
            "Interviews with AI researchers about {}",
            topics.join(", ")
        ),
        rss_url: "https://example.com/robot-brains/feed".to_string(),
        relevance_score: 0.92,
    }]
}

pub fn transcript(episode_id: &str) -> Option<&'static str> {
    match episode_id {
        "ep_001" => Some(
            "Lex: Welcome Yann LeCun. Let's talk about AI safety...\n\
             Yann: Thanks for having me. I think the current panic about AI existential risk is overblown...\n\
             [Full transcript would be much longer]",
        ),
        "ep_002" => Some(
            "Tim: Gordon Ramsay is here. Gordon: Hello Tim, let's talk about cooking...",
        ),
        "ep_003" => Some(
            "Ben: Today we're diving into NVIDIA...\n\
             David: Jensen Huang has built an incredible company...",
        ),
        _ => None,
    }
}

const EP_001_DETAILED: &str = r#"## Overview
Yann LeCun, Chief AI Scientist at Meta, shares his contrarian views on AI safety and the path to AGI.

## Key Points
- Current LLMs are limited - they lack true understanding and can't plan
- AI safety panic is premature; we're far from human-level AI
- Self-supervised learning + world models are the key to next-gen AI
- Open source AI development is crucial for safety and democracy

## Highlights
- "The idea that LLMs will lead to AGI is like thinking taller ladders will get you to the moon"
- Discussion of JEPA (Joint Embedding Predictive Architecture)

## Takeaways
- Focus on building AI that understands the world through prediction
- Open collaboration beats closed development for safety"#;

/// Canned summary for an episode in the given style.
pub fn summary(episode_id: &str, style: &str) -> Option<&'static str> {
    match (episode_id, style) {
        ("ep_001", "brief") => Some(
            "Yann LeCun discusses why he thinks AI safety concerns are overblown and explains \
             his vision for future AI systems based on world models.",
        ),
        ("ep_001", "detailed") => Some(EP_001_DETAILED),
        ("ep_001", "technical") => Some(
            "[Technical deep-dive version with architecture details, mathematical concepts, etc.]",
        ),
        _ => None,
    }
}
