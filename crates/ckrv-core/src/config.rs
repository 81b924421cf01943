use crate::error::Result;
use crate::log::DEFAULT_LOG_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// DashConfig
// ---------------------------------------------------------------------------

/// Dashboard configuration, read from `.ckrv/dash.yaml` under the
/// project root. Every field has a default so the file is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashConfig {
    /// Base URL of the orchestration engine's API server.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Seconds between `GET /api/specs` polls.
    #[serde(default = "default_specs_poll_secs")]
    pub specs_poll_secs: u64,

    /// Seconds between `GET /api/tasks` polls.
    #[serde(default = "default_tasks_poll_secs")]
    pub tasks_poll_secs: u64,

    /// Event log ring capacity; oldest entries are evicted past this.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

fn default_server_url() -> String {
    "http://localhost:3141".to_string()
}

fn default_specs_poll_secs() -> u64 {
    5
}

fn default_tasks_poll_secs() -> u64 {
    10
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            specs_poll_secs: default_specs_poll_secs(),
            tasks_poll_secs: default_tasks_poll_secs(),
            log_capacity: default_log_capacity(),
        }
    }
}

impl DashConfig {
    pub fn config_path(root: &Path) -> std::path::PathBuf {
        root.join(".ckrv").join("dash.yaml")
    }

    /// Load from `.ckrv/dash.yaml`, falling back to defaults when the
    /// file does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: DashConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
