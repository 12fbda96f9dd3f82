//! Project Config Loading
//!
//! The config file is re-read on every call; nothing is cached here.

use std::path::Path;

use anyhow::{Context, Result};

use super::base::BaseRules;
use super::schema::ProjectConfig;

/// Name of the per-project config file
pub const CONFIG_FILE_NAME: &str = ".code-check.toml";

/// Load the lint configuration for a project root.
///
/// Without a root, or when the file is missing or invalid, the result is an
/// empty configuration and the base rules are not merged. Failures are only
/// logged at debug level.
pub async fn load_project_config(root: Option<&Path>, base: &BaseRules) -> ProjectConfig {
    let Some(root) = root.filter(|r| !r.as_os_str().is_empty()) else {
        return ProjectConfig::default();
    };

    let path = root.join(CONFIG_FILE_NAME);
    match read_project_config(&path).await {
        Ok(mut config) => {
            config.apply_defaults(base.rules());
            config
        }
        Err(e) => {
            log::debug!("No usable project config: {:#}", e);
            ProjectConfig::default()
        }
    }
}

async fn read_project_config(path: &Path) -> Result<ProjectConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    parse_project_config(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse the TOML content of a project config file
pub fn parse_project_config(content: &str) -> Result<ProjectConfig> {
    Ok(toml::from_str(content)?)
}
