//! Curio - tool-calling agents for podcasts and learning resources
//!
//! A model is given a goal and a catalog of tools, and decides which tools to
//! call, in what order, until it is satisfied or runs out of iterations.
//!
//! # Overview
//!
//! Curio provides two agents:
//! - A podcast agent that checks preferences, fetches episodes, scores their
//!   relevance, summarizes and saves them
//! - A content discovery agent that searches the web, GitHub, Google Books,
//!   YouTube and Reddit for learning resources
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `agent` - The agent loop, tool registry and model abstraction
//! - `tools` - Podcast and discovery tool implementations
//! - `reading_list` - Storage for episodes saved by the podcast agent
//! - `config` - Configuration and prompt templates
//! - `orchestrator` - Builds and runs the agents from settings
//! - `mcp` - MCP server exposing the tools
//!
//! # Example
//!
//! ```rust,no_run
//! use curio::agent::SilentObserver;
//! use curio::config::Settings;
//! use curio::orchestrator::{Orchestrator, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let run = orchestrator
//!         .run_discovery("Rust async programming", &RunOptions::default(), &SilentObserver)
//!         .await?;
//!     println!("{}", run.outcome.content_or_marker());
//!     println!("Tools used: {:?}", run.tools_used());
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod mcp;
pub mod openai;
pub mod orchestrator;
pub mod reading_list;
pub mod tools;

pub use error::{CurioError, Result};
