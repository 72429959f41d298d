//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Run the config command against the active config file.
pub fn run_config(action: &ConfigAction, config_path: &Path, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Edit => {
            if write_if_missing(config_path, &settings)? {
                Output::info(&format!("Created config at {}", config_path.display()));
            }

            let editor = editor();
            Output::info(&format!("Opening config in {}...", editor));

            match std::process::Command::new(&editor).arg(config_path).status() {
                Ok(s) if s.success() => match Settings::load_from(Some(&config_path.to_path_buf())) {
                    Ok(_) => Output::success("Config saved."),
                    Err(e) => Output::warning(&format!("Config no longer loads: {}", e)),
                },
                Ok(_) => Output::warning("Editor exited with non-zero status."),
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {}", config_path.display()));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
            if !config_path.exists() {
                Output::info("File does not exist yet; defaults are in use.");
            }
        }
    }

    Ok(())
}

/// Write the current settings to `path` unless a file is already there.
fn write_if_missing(path: &Path, settings: &Settings) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    settings.save_to(&PathBuf::from(path))?;
    Ok(true)
}

fn editor() -> String {
    std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vim".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_creates_file_at_custom_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("curio.toml");

        assert!(write_if_missing(&path, &Settings::default()).unwrap());
        assert!(path.exists());
        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.agent.max_iterations, Settings::default().agent.max_iterations);
    }

    #[test]
    fn test_existing_config_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curio.toml");
        std::fs::write(&path, "# hand written\n").unwrap();

        assert!(!write_if_missing(&path, &Settings::default()).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# hand written\n");
    }

    #[test]
    fn test_path_honours_override() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("other.toml");
        let resolved = Settings::config_path(custom.to_str());
        assert_eq!(resolved, custom);
        assert_eq!(Settings::config_path(None), Settings::default_config_path());

        run_config(&ConfigAction::Path, &resolved, Settings::default()).unwrap();
    }
}
