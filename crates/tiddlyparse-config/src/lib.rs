//! Settings for the `tiddlyparse` command, read from
//! `~/.config/tiddlyparse/config.toml`:
//!
//! ```toml
//! default_wiki = "~/notes/wiki.html"
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Wiki file used when none is given on the command line.
    #[serde(default)]
    pub default_wiki: Option<PathBuf>,
}

impl Config {
    /// `~/.config/tiddlyparse/config.toml`
    pub fn config_path() -> PathBuf {
        PathBuf::from(shellexpand::tilde("~/.config/tiddlyparse").as_ref()).join("config.toml")
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    /// Read a config file. A file that does not exist is `Ok(None)`.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        let content = match std::fs::read_to_string(config_path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::ConfigReadError {
                    config_path: config_path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        Ok(Some(config.expanded()))
    }

    /// The wiki to open: `explicit` if given, else `default_wiki` from the
    /// user's config file.
    pub fn resolve_wiki(explicit: Option<PathBuf>) -> Result<Option<PathBuf>, ConfigError> {
        match explicit {
            Some(path) => Ok(Some(path)),
            None => Ok(Self::load()?.and_then(|config| config.default_wiki)),
        }
    }

    fn expanded(mut self) -> Self {
        self.default_wiki = self.default_wiki.map(|path| expand_path(&path).unwrap_or(path));
        self
    }
}

/// Expand `~` and `$VAR`; `None` when a variable is undefined.
fn expand_path(path: &Path) -> Option<PathBuf> {
    shellexpand::full(&path.to_string_lossy())
        .ok()
        .map(|expanded| PathBuf::from(expanded.as_ref()))
}
