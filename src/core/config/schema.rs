//! core::config::schema
//!
//! The application's configuration record.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigRecord};

/// Environment variable overriding the configuration location.
pub const CONFIG_ENV: &str = "VRACHOS_CONFIG";

/// Application configuration.
///
/// # Example
///
/// ```json
/// {
///     "debug": false,
///     "timeout": 30,
///     "editor": "vim"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Enable debug logging
    pub debug: bool,

    /// Timeout in seconds for external operations
    pub timeout: i64,

    /// Preferred editor command, overriding `$EDITOR`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debug: false,
            timeout: 30,
            editor: None,
        }
    }
}

impl AppConfig {
    /// Where the application configuration lives.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("vrachos").join("config.json"))
    }
}

impl ConfigRecord for AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout <= 0 {
            return Err(ConfigError::InvalidValue(format!(
                "timeout must be positive, got {}",
                self.timeout
            )));
        }
        if matches!(&self.editor, Some(editor) if editor.trim().is_empty()) {
            return Err(ConfigError::InvalidValue("editor cannot be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert_eq!(config.timeout, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn non_positive_timeout_rejected() {
        let config = AppConfig {
            timeout: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn blank_editor_rejected() {
        let config = AppConfig {
            editor: Some("  ".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unset_editor_is_not_serialized() {
        let json = serde_json::to_string(&AppConfig::default()).unwrap();
        assert_eq!(json, r#"{"debug":false,"timeout":30}"#);
    }
}
