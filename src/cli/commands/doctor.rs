//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{ReadingListProvider, Settings};
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Curio Doctor");
    println!();
    println!("Checking configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("Model API").bold());
    let model_check = check_model(settings);
    model_check.print();
    checks.push(model_check);

    println!();

    println!("{}", style("Discovery APIs").bold());
    let key_checks = check_discovery_keys(settings);
    for check in &key_checks {
        check.print();
    }
    checks.extend(key_checks);

    println!();

    println!("{}", style("Directories").bold());
    let dir_checks = check_directories(settings);
    for check in &dir_checks {
        check.print();
    }
    checks.extend(dir_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Curio.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!(
            "All checks passed with {} warning(s).",
            warnings
        ));
    } else {
        Output::success("All checks passed! Curio is ready to use.");
    }

    Ok(())
}

/// Check the model API key, or the custom endpoint replacing it.
fn check_model(settings: &Settings) -> CheckResult {
    if let Some(base) = settings.model.api_base.as_deref().filter(|b| !b.is_empty()) {
        return CheckResult::ok("Model endpoint", &format!("{} ({})", base, settings.model.name));
    }
    match settings.model.resolved_api_key() {
        Some(key) if key.starts_with("sk-") && key.len() > 20 => CheckResult::ok(
            "OPENAI_API_KEY",
            &format!("configured ({})", mask(&key)),
        ),
        Some(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        None => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Discovery keys are optional; a missing key disables one tool.
fn check_discovery_keys(settings: &Settings) -> Vec<CheckResult> {
    let discovery = &settings.discovery;
    vec![
        optional_key(
            "TAVILY_API_KEY",
            discovery.tavily_key(),
            "web_search unavailable",
            "Get a key at https://tavily.com",
        ),
        optional_key(
            "GITHUB_TOKEN",
            discovery.github_key(),
            "unauthenticated (lower rate limit)",
            "Create a token at https://github.com/settings/tokens",
        ),
        optional_key(
            "GOOGLE_API_KEY",
            discovery.google_key(),
            "youtube_search unavailable, books_search unauthenticated",
            "Enable the YouTube Data and Books APIs in Google Cloud",
        ),
    ]
}

fn optional_key(name: &str, key: Option<String>, missing: &str, hint: &str) -> CheckResult {
    match key {
        Some(key) => CheckResult::ok(name, &format!("configured ({})", mask(&key))),
        None => CheckResult::warning(name, missing, hint),
    }
}

fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Check data directories.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.exists() {
        results.push(CheckResult::ok(
            "Data directory",
            &format!("{}", data_dir.display()),
        ));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        ));
    }

    if settings.reading_list.provider == ReadingListProvider::Memory {
        results.push(CheckResult::warning(
            "Reading list",
            "in memory (not persisted)",
            "Set reading_list.provider = \"sqlite\" to keep saved items",
        ));
        return results;
    }

    let db_path = settings.reading_list_path();
    if db_path.exists() {
        let size = std::fs::metadata(&db_path)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        results.push(CheckResult::ok(
            "Reading list",
            &format!("{} ({})", db_path.display(), size),
        ));
    } else {
        results.push(CheckResult::warning(
            "Reading list",
            &format!("{} (not created yet)", db_path.display()),
            "Database will be created on first save",
        ));
    }

    results
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: curio config edit",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_mask_keeps_ends() {
        assert_eq!(mask("sk-abcdefghijklmnop1234"), "sk-abcd...1234");
        assert_eq!(mask("short"), "***");
    }

    #[test]
    fn test_missing_discovery_key_is_warning() {
        let result = optional_key("GOOGLE_API_KEY", None, "missing", "hint");
        assert_eq!(result.status, CheckStatus::Warning);
    }

    #[test]
    fn test_custom_endpoint_needs_no_key() {
        let mut settings = Settings::default();
        settings.model.api_base = Some("http://localhost:8080/v1".to_string());
        assert_eq!(check_model(&settings).status, CheckStatus::Ok);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
    }
}
