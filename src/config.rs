use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::github::DEFAULT_TOKEN_ENV;

pub const CONFIG_FILE: &str = ".readysteady.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub owner: Option<String>,
    pub repo: Option<String>,
    /// Environment variable holding the GitHub token.
    pub token_env: Option<String>,
    /// GitHub API base, for GitHub Enterprise installs.
    pub api_url: Option<String>,
    #[serde(default)]
    pub strict_tag_check: bool,
}

impl Config {
    pub fn token_env(&self) -> &str {
        self.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV)
    }
}

pub async fn load_config(dir: &Path) -> Result<Config> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(cfg)
}
