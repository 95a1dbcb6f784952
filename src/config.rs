//! Coach configuration.
//!
//! Loaded from `~/.coach/config.toml`. Every key is optional; a missing file
//! means defaults. `GEMINI_API_KEY` in the environment overrides `api-key`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::planner::{DEFAULT_BASE_URL, DEFAULT_MODEL};

const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Coach configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Gemini API key. Required for onboarding and adjustments.
    pub api_key: Option<String>,

    pub model: String,

    pub api_base_url: String,

    /// Upper bound on a single plan request.
    pub request_timeout_secs: u64,

    /// How often `coach watch` checks connectivity.
    pub probe_interval_secs: u64,

    /// SQLite database path. Defaults to `~/.coach/coach.sqlite`.
    pub database: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 60,
            probe_interval_secs: 15,
            database: None,
        }
    }
}

impl Config {
    /// Load config from `~/.coach/config.toml`, then apply the environment.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;
        let mut config = Self::load_from(&path)?;
        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            config.api_key = Some(key);
        }
        Ok(config)
    }

    /// Load config from a specific file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.coach/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".coach").join("config.toml"))
    }

    /// The API key, or an error explaining how to set one.
    pub fn require_api_key(&self) -> Result<&str, String> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                format!(
                    "no Gemini API key configured\n\
                     Set {API_KEY_ENV} or add to {}:\n\n\
                     api-key = \"your-key\"",
                    Self::path().map_or_else(|| "config.toml".into(), |p| p.display().to_string())
                )
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs.max(1))
    }
}
