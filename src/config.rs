//! Application configuration and environment variable parsing.
//!
//! Settings are read from the environment (optionally seeded from a `.env` file).
//! Every field has a default, so the tool runs with an empty environment; a
//! value that is present but unparsable is a startup error.

use serde::Deserialize;
use std::fmt;

/// A unique identifier for a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoId {
    /// The owner of the repository (e.g., "facebook").
    pub owner: String,
    /// The name of the repository (e.g., "react").
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// GitHub access token. When set, the stored token is neither read nor prompted for.
    pub github_token: Option<String>,

    /// Key in the global git config under which the access token is persisted.
    #[serde(default = "default_token_config_key")]
    pub token_config_key: String,

    /// Number of items requested per page from the GitHub API.
    #[serde(default = "default_pr_page_size")]
    pub pr_page_size: u8,

    /// Length of the bar drawn for the largest bucket of a histogram.
    #[serde(default = "default_histogram_width")]
    pub histogram_width: usize,
}

fn default_token_config_key() -> String {
    "github-pr-stats.token".to_string()
}

fn default_pr_page_size() -> u8 {
    100
}

fn default_histogram_width() -> usize {
    50
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}
