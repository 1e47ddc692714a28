//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$LANEGRAPH_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/lanegraph/config.toml`
//! 3. `~/.lanegraph/config.toml`
//!
//! # Repo Config
//!
//! Located at `.git/lanegraph/config.toml`.
//!
//! Both files share one schema; repo values override global ones key by key.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Upper bound for `layout.threads`.
pub const MAX_THREADS: usize = 256;

/// A configuration file (global or repo scope).
///
/// # Example
///
/// ```toml
/// [layout]
/// batch_size = 500
/// parallel = true
/// threads = 4
///
/// [display]
/// max_rows = 200
/// decorate = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Layout engine tuning
    pub layout: Option<LayoutConfig>,

    /// Text output settings
    pub display: Option<DisplayConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(layout) = &self.layout {
            layout.validate()?;
        }
        Ok(())
    }
}

/// Layout engine settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Rows per layout batch (0 = whole history)
    pub batch_size: Option<usize>,

    /// Generate lines on worker threads
    pub parallel: Option<bool>,

    /// Worker thread count (0 = rayon default)
    pub threads: Option<usize>,
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(threads) = self.threads {
            if threads > MAX_THREADS {
                return Err(ConfigError::InvalidValue(format!(
                    "layout.threads must be at most {MAX_THREADS}, got {threads}"
                )));
            }
        }
        Ok(())
    }
}

/// Text output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Maximum rows printed
    pub max_rows: Option<usize>,

    /// Show ref names next to commits
    pub decorate: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let config: FileConfig = toml::from_str(
            r#"
            [layout]
            batch_size = 100
            parallel = false
            threads = 2

            [display]
            max_rows = 50
            decorate = false
            "#,
        )
        .unwrap();

        let layout = config.layout.as_ref().unwrap();
        assert_eq!(layout.batch_size, Some(100));
        assert_eq!(layout.parallel, Some(false));
        assert_eq!(config.display.as_ref().unwrap().max_rows, Some(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_config_is_valid() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn too_many_threads_rejected() {
        let config = FileConfig {
            layout: Some(LayoutConfig {
                threads: Some(MAX_THREADS + 1),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("[colors]\nlanes = 8\n");
        assert!(result.is_err());
    }

    #[test]
    fn roundtrip_through_toml() {
        let config = FileConfig {
            layout: Some(LayoutConfig {
                batch_size: Some(10),
                ..Default::default()
            }),
            display: None,
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: FileConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
