//! Application configuration
//!
//! Loaded from `config.json`. Every key has a default, so a partial file is
//! merged over the defaults and a missing file means "all defaults".

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::conversation::LogConfig;
use crate::search::DEFAULT_TOP_K;
use crate::utils::atomic::atomic_write;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Model providers this build can talk to
pub const SUPPORTED_PROVIDERS: &[&str] = &["ollama"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub settings: Settings,
    pub api: ApiConfig,
    pub knowledge_base: KnowledgeBaseConfig,
    pub server: ServerConfig,
}

/// Memory and session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub memory_enabled: bool,
    /// Directory holding `conversation_log.txt` and `backups/`
    pub data_dir: PathBuf,
    /// User id stamped on user turns
    pub user_id: String,
    /// Records replayed when a session starts (0 = all)
    pub history_limit: usize,
    /// Backups to keep after a rotation (unset = keep all)
    pub max_backups: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            memory_enabled: true,
            data_dir: PathBuf::from("memory"),
            user_id: "user".to_string(),
            history_limit: 20,
            max_backups: None,
        }
    }
}

/// Model backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llama3".to_string(),
            base_url: "http://localhost:11434".to_string(),
            timeout_secs: 120,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Document retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    /// Chunks handed to the model per question
    pub top_k: usize,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("knowledge_base"),
            top_k: DEFAULT_TOP_K,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

impl AppConfig {
    /// Load configuration, falling back to defaults
    ///
    /// A missing file is silent; an unreadable or invalid one is logged and
    /// ignored so the assistant still starts.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!("{:#}; using default configuration", e);
                Self::default()
            }
        }
    }

    /// Load configuration from `path`
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to read or parse
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;

        Ok(Some(config))
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        atomic_write(path, &json).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Check values the types cannot express
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_PROVIDERS.contains(&self.api.provider.as_str()) {
            bail!("Unsupported provider: {}", self.api.provider);
        }
        if self.api.model.trim().is_empty() {
            bail!("Missing config key: api.model");
        }
        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be greater than zero");
        }
        self.validate_settings()?;
        if self.knowledge_base.top_k == 0 {
            bail!("knowledge_base.top_k must be greater than zero");
        }
        Ok(())
    }

    /// Check the memory settings alone
    ///
    /// Commands that never reach the model only need this part.
    pub fn validate_settings(&self) -> Result<()> {
        if self.settings.max_backups == Some(0) {
            bail!("settings.max_backups must be at least 1 (omit it to keep every backup)");
        }
        Ok(())
    }

    /// Log store settings derived from `settings`
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            data_dir: self.settings.data_dir.clone(),
            max_backups: self.settings.max_backups,
            ..LogConfig::default()
        }
    }

    /// Session seed window; `None` replays the whole log
    pub fn history_limit(&self) -> Option<usize> {
        match self.settings.history_limit {
            0 => None,
            n => Some(n),
        }
    }
}
