//! Vox configuration.
//!
//! Lives in `~/.config/vox/config.toml` (overridable via `$VOX_CONFIG`).
//! Every field has a default so a missing or partial file is fine.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoxConfig {
    /// Cooperative pacing between multi-intent parts, in milliseconds.
    /// This is UX pacing, not a correctness requirement.
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    /// City used for weather queries that name no location.
    #[serde(default = "default_location")]
    pub default_location: String,

    /// Personal bookmark phrases for the quick matcher:
    /// phrase (matched as a substring) -> URL to open.
    #[serde(default)]
    pub bookmarks: BTreeMap<String, String>,

    #[serde(default)]
    pub knowledge: KnowledgeSettings,
}

/// Settings for the external knowledge-answer collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSettings {
    /// Base endpoint of the answer service. Unset means no collaborator:
    /// fallback escalation goes straight to web search.
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,
}

fn default_pacing_delay_ms() -> u64 {
    800
}

fn default_location() -> String {
    "London".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            model: default_model(),
        }
    }
}

impl Default for VoxConfig {
    fn default() -> Self {
        Self {
            pacing_delay_ms: default_pacing_delay_ms(),
            default_location: default_location(),
            bookmarks: BTreeMap::new(),
            knowledge: KnowledgeSettings::default(),
        }
    }
}

impl VoxConfig {
    /// Config file path: `$VOX_CONFIG` wins, then the XDG config dir.
    pub fn path() -> Option<PathBuf> {
        if let Ok(explicit) = std::env::var("VOX_CONFIG") {
            return Some(PathBuf::from(explicit));
        }
        dirs::config_dir().map(|d| d.join("vox").join(CONFIG_FILE))
    }

    /// Load the config, falling back to defaults on a missing or broken file.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        let Ok(raw) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config file invalid, using defaults");
                Self::default()
            }
        }
    }

    /// Default data-store location: `~/.local/share/vox/store.json`.
    pub fn store_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("vox").join("store.json"))
    }

    pub fn pacing_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.pacing_delay_ms)
    }
}
