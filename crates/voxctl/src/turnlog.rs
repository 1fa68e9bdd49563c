//! JSONL turn log with an XDG fallback chain.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;

/// One processed turn, appended as a JSON line.
#[derive(Debug, Serialize, Deserialize)]
pub struct TurnEntry {
    /// ISO 8601 timestamp
    pub ts: String,

    /// Turn ID (UUID)
    pub turn_id: String,

    /// Raw input text
    pub input: String,

    /// Whether any response was produced (slash misses stay silent)
    pub answered: bool,

    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl TurnEntry {
    pub fn start(input: &str) -> (Self, std::time::Instant) {
        (
            Self {
                ts: chrono::Utc::now().to_rfc3339(),
                turn_id: uuid::Uuid::new_v4().to_string(),
                input: input.to_string(),
                answered: false,
                duration_ms: 0,
            },
            std::time::Instant::now(),
        )
    }

    /// Discover log file path with fallback chain
    ///
    /// Priority:
    /// 1. $VOXCTL_LOG_FILE environment variable (explicit override)
    /// 2. $XDG_STATE_HOME/vox/ctl.jsonl (XDG standard)
    /// 3. ~/.local/state/vox/ctl.jsonl (XDG fallback)
    fn discover_log_path() -> Option<String> {
        if let Ok(path) = std::env::var("VOXCTL_LOG_FILE") {
            return Some(path);
        }

        if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
            return Some(format!("{}/vox/ctl.jsonl", xdg_state));
        }

        if let Ok(home) = std::env::var("HOME") {
            return Some(format!("{}/.local/state/vox/ctl.jsonl", home));
        }

        None
    }

    /// Append the entry; an unwritable log never fails a turn.
    pub fn write(&self) -> Result<(), std::io::Error> {
        let json = serde_json::to_string(self)?;

        if let Some(path) = Self::discover_log_path() {
            if Self::write_to_file(&json, &path).is_ok() {
                return Ok(());
            }
        }
        Ok(())
    }

    fn write_to_file(json: &str, path: &str) -> Result<(), std::io::Error> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}
