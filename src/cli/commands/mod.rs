//! CLI command implementations.

mod config;
mod discover;
mod doctor;
mod mcp;
mod podcast;
mod saved;
mod serve;
mod tools;

pub use config::run_config;
pub use discover::run_discover;
pub use doctor::run_doctor;
pub use mcp::run_mcp;
pub use podcast::run_podcast;
pub use saved::run_saved;
pub use serve::run_serve;
pub use tools::run_tools;
