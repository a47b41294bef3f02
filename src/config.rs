// ⚙️ Settings - defaults → numerology.toml → NUMEROLOGY_* env
//
// Example numerology.toml:
//
//   history_file = "data/history.json"
//   bind_addr = "0.0.0.0:3000"
//   log_level = "debug"

use crate::history::DEFAULT_HISTORY_FILE;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Looked up in the working directory
pub const CONFIG_FILE: &str = "numerology.toml";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where calculations are appended
    pub history_file: PathBuf,

    /// Web server listen address
    pub bind_addr: String,

    /// tracing filter directive; each front end has its own default
    pub log_level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            log_level: None,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_from(CONFIG_FILE)
    }

    /// A missing config file is fine; a malformed one is an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref())
            .merge(Env::prefixed("NUMEROLOGY_"))
            .extract()
            .map_err(Box::new)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
    }

    /// Log filter to use when neither the config nor RUST_LOG picks one
    pub fn log_level_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.log_level.as_deref().unwrap_or(default)
    }
}

// ============================================================================
// TESTS
// ============================================================================
