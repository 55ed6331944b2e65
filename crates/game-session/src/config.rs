use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Front-end settings. Every field may be omitted from the TOML.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// SQLite database holding the saved game.
    #[serde(default = "defaults::store_path")]
    pub store_path: PathBuf,

    /// Key the session is stored under.
    #[serde(default = "defaults::state_key")]
    pub state_key: String,

    /// env_logger filter, e.g. "warn", "game_session=debug".
    #[serde(default = "defaults::log")]
    pub log: String,

    /// Seed for tile spawning. If None, seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: defaults::store_path(),
            state_key: defaults::state_key(),
            log: defaults::log(),
            seed: None,
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn store_path() -> PathBuf { PathBuf::from("2048.db") }
    pub fn state_key() -> String { crate::persist::DEFAULT_STATE_KEY.to_string() }
    pub fn log() -> String { "warn".to_string() }
}
