//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! lanegraph has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$LANEGRAPH_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/lanegraph/config.toml`
//! 3. `~/.lanegraph/config.toml`
//!
//! Writes go to `$LANEGRAPH_CONFIG` if set, otherwise the home location.
//!
//! # Repo Config Location
//!
//! `.git/lanegraph/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use lanegraph::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo"))).unwrap();
//! println!("batch size: {}", config.batch_size());
//! println!("parallel: {}", config.parallel());
//! ```

pub mod schema;

pub use schema::{DisplayConfig, FileConfig, LayoutConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::history::LayoutOptions;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence: repo over global over defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: FileConfig,
    /// Repository configuration (if in a repo)
    pub repo: Option<FileConfig>,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `repo_path` is provided, also loads repo-specific config from its
    /// `.git` directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated. Missing files are not an error.
    pub fn load(repo_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (global, global_path) = match Self::global_candidates()
            .into_iter()
            .find(|p| p.exists())
        {
            Some(path) => (Self::read_file(&path)?, Some(path)),
            None => (FileConfig::default(), None),
        };

        let (repo, repo_path) = match repo_path.map(Self::repo_config_path) {
            Some(path) if path.exists() => (Some(Self::read_file(&path)?), Some(path)),
            _ => (None, None),
        };

        global.validate()?;
        if let Some(r) = &repo {
            r.validate()?;
        }
        debug!(global = ?global_path, repo = ?repo_path, "configuration loaded");

        Ok(Config {
            global,
            repo,
            global_path,
            repo_path,
        })
    }

    /// Global config locations, most specific first.
    fn global_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var("LANEGRAPH_CONFIG") {
            candidates.push(PathBuf::from(path));
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("lanegraph/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".lanegraph/config.toml"));
        }
        candidates
    }

    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for global config.
    ///
    /// Returns `$LANEGRAPH_CONFIG` if set, otherwise `~/.lanegraph/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var("LANEGRAPH_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".lanegraph/config.toml"))
    }

    /// Get the path for repo config.
    pub fn repo_config_path(repo_path: &Path) -> PathBuf {
        repo_path.join(".git/lanegraph/config.toml")
    }

    /// Write global config atomically.
    pub fn write_global(config: &FileConfig) -> Result<PathBuf, ConfigError> {
        let path = Self::global_config_path()?;
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write repo config atomically.
    pub fn write_repo(repo_path: &Path, config: &FileConfig) -> Result<PathBuf, ConfigError> {
        let path = Self::repo_config_path(repo_path);
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write a config file via a temp file and rename.
    fn write_config_atomic(path: &Path, config: &FileConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let write_err = |e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        };
        let mut file = fs::File::create(&temp_path).map_err(write_err)?;
        file.write_all(contents.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn layout_value<T>(&self, get: impl Fn(&LayoutConfig) -> Option<T>) -> Option<T> {
        self.repo
            .as_ref()
            .and_then(|r| r.layout.as_ref())
            .and_then(&get)
            .or_else(|| self.global.layout.as_ref().and_then(&get))
    }

    fn display_value<T>(&self, get: impl Fn(&DisplayConfig) -> Option<T>) -> Option<T> {
        self.repo
            .as_ref()
            .and_then(|r| r.display.as_ref())
            .and_then(&get)
            .or_else(|| self.global.display.as_ref().and_then(&get))
    }

    /// Rows per layout batch. Defaults to 0 (whole history).
    pub fn batch_size(&self) -> usize {
        self.layout_value(|l| l.batch_size).unwrap_or(0)
    }

    /// Whether lines are generated in parallel. Defaults to `true`.
    pub fn parallel(&self) -> bool {
        self.layout_value(|l| l.parallel).unwrap_or(true)
    }

    /// Worker threads. Defaults to 0 (rayon's global pool).
    pub fn threads(&self) -> usize {
        self.layout_value(|l| l.threads).unwrap_or(0)
    }

    /// Maximum rows printed. Defaults to unlimited.
    pub fn max_rows(&self) -> Option<usize> {
        self.display_value(|d| d.max_rows)
    }

    /// Whether ref names are shown. Defaults to `true`.
    pub fn decorate(&self) -> bool {
        self.display_value(|d| d.decorate).unwrap_or(true)
    }

    /// Layout options for the history engine.
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            batch_size: self.batch_size(),
            parallel: self.parallel(),
            threads: self.threads(),
        }
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}
