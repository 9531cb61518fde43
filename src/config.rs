//! Configuration management for gh2jira
//!
//! Settings come from `~/.config/gh2jira/config.yaml` (or `--config`), then
//! command line flags and environment variables override the file:
//!
//! ```yaml
//! github:
//!   token: ghp_xxx
//! jira:
//!   base_url: https://issues.example.com
//!   project: OSDK
//!   token: xxx
//! http:
//!   timeout_secs: 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The name of the package, used for config directory naming
const PKG_NAME: &str = "gh2jira";

const CONFIG_FILE: &str = "config.yaml";

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub github: GitHubConfig,
    pub jira: JiraConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubConfig {
    pub token: Option<String>,
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JiraConfig {
    pub base_url: Option<String>,
    pub project: Option<String>,
    /// When set, the token is sent as HTTP basic auth for this user
    pub user: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub github_token: Option<String>,
    pub jira_token: Option<String>,
    pub jira_user: Option<String>,
    pub jira_base_url: Option<String>,
    pub jira_project: Option<String>,
}

impl Config {
    /// Load configuration from a YAML file, or defaults if it doesn't exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&contents).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply flag and environment values on top of the file values
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if overrides.github_token.is_some() {
            self.github.token = overrides.github_token;
        }
        if overrides.jira_token.is_some() {
            self.jira.token = overrides.jira_token;
        }
        if overrides.jira_user.is_some() {
            self.jira.user = overrides.jira_user;
        }
        if overrides.jira_base_url.is_some() {
            self.jira.base_url = overrides.jira_base_url;
        }
        if overrides.jira_project.is_some() {
            self.jira.project = overrides.jira_project;
        }
        self
    }

    /// The Jira project to reconcile, which must be set
    pub fn jira_project(&self) -> Result<&str> {
        non_empty(&self.jira.project).ok_or(Error::MissingProject)
    }

    pub fn jira_base_url(&self) -> Result<&str> {
        non_empty(&self.jira.base_url)
            .ok_or_else(|| Error::Config("must specify jira base url".into()))
    }

    pub fn jira_token(&self) -> Result<&str> {
        non_empty(&self.jira.token).ok_or_else(|| Error::Config("must specify jira token".into()))
    }

    pub fn jira_user(&self) -> Option<&str> {
        non_empty(&self.jira.user)
    }

    pub fn github_token(&self) -> Option<&str> {
        non_empty(&self.github.token)
    }

    /// Request timeout; zero falls back to the default
    pub fn timeout(&self) -> Duration {
        match self.http.timeout_secs {
            0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Get the default configuration file path
///
/// Returns `~/.config/gh2jira/config.yaml` on Linux, or the platform
/// equivalent. `None` when no config directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(PKG_NAME).join(CONFIG_FILE))
}
