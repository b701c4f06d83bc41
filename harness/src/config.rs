//! Run configuration file.
//!
//! ```json
//! { "agent": "agent", "time_budget": 300, "policy": { "max_depth": 12 } }
//! ```
//!
//! Every field is optional. Values here sit below CLI flags and above world
//! and scenario defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::policy::PolicyConfig;

/// Agent name used when nothing else is configured.
pub const DEFAULT_AGENT: &str = "agent";
/// Time budget used by `forge plan` when nothing else is configured.
pub const DEFAULT_TIME_BUDGET: i64 = 300;

/// Error loading a [`RunConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {detail}")]
    Io { path: String, detail: String },
    #[error("malformed config {path}: {detail}")]
    Parse { path: String, detail: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub agent: Option<String>,
    pub time_budget: Option<i64>,
    pub policy: PolicyConfig,
}

impl RunConfig {
    /// Load from a JSON file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if unreadable, [`ConfigError::Parse`] if malformed.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            detail: e.to_string(),
        })
    }

    #[must_use]
    pub fn agent(&self) -> &str {
        self.agent.as_deref().unwrap_or(DEFAULT_AGENT)
    }

    #[must_use]
    pub fn time_budget(&self) -> i64 {
        self.time_budget.unwrap_or(DEFAULT_TIME_BUDGET)
    }
}
