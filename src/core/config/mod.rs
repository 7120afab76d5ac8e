//! core::config
//!
//! Persistent configuration files.
//!
//! # Overview
//!
//! [`ConfigFile`] binds a configuration record to a file on disk. The
//! record type supplies the defaults; the file supplies overrides.
//!
//! # Formats
//!
//! Chosen by file extension:
//! - `.json`: pretty-printed with 4-space indentation and a trailing newline
//! - `.toml`
//!
//! # Loading
//!
//! 1. A missing file is created from the defaults
//! 2. An existing file must contain an object (a table, for TOML)
//! 3. Its keys are merged recursively over the serialized defaults, so
//!    nested keys the file leaves out keep their default values
//! 4. The merged document is deserialized and validated
//!
//! # Location
//!
//! The application file is found at:
//! 1. `$VRACHOS_CONFIG` if set
//! 2. `<config dir>/vrachos/config.json` (e.g. `~/.config/vrachos/config.json`)
//!
//! # Example
//!
//! ```no_run
//! use vrachos::core::config::{AppConfig, ConfigFile};
//!
//! let mut file = ConfigFile::<AppConfig>::load(AppConfig::default_path()?)?;
//! file.value_mut().timeout = 60;
//! file.save()?;
//! # Ok::<(), vrachos::core::config::ConfigError>(())
//! ```

pub mod schema;

pub use schema::AppConfig;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

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

    #[error("unsupported config format '{path}': expected a .json or .toml file")]
    UnsupportedFormat { path: PathBuf },

    #[error("configuration directory not found")]
    NoConfigDir,
}

/// A record that can live in a [`ConfigFile`].
pub trait ConfigRecord: Serialize + DeserializeOwned + Default {
    /// Check values after loading.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// On-disk format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ConfigFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(ConfigFormat::Toml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// A configuration record bound to its file.
#[derive(Debug, Clone)]
pub struct ConfigFile<T> {
    path: PathBuf,
    format: ConfigFormat,
    value: T,
}

impl<T: ConfigRecord> ConfigFile<T> {
    /// Load `path`, creating it from defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFormat` for unknown extensions
    /// - `ReadError`/`WriteError` for filesystem failures
    /// - `ParseError` if the file is malformed or not an object
    /// - `InvalidValue` if merged values fail to deserialize or validate
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let format = ConfigFormat::from_path(&path)?;

        if !path.exists() {
            tracing::debug!(path = %path.display(), "creating config file with defaults");
            let file = Self {
                path,
                format,
                value: T::default(),
            };
            file.save()?;
            return Ok(file);
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;
        let overrides = parse_document(&path, format, &contents)?;

        let mut merged = serde_json::to_value(T::default())
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        deep_merge(&mut merged, overrides);

        let value: T =
            serde_json::from_value(merged).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        value.validate()?;
        tracing::debug!(path = %path.display(), "loaded config file");

        Ok(Self {
            path,
            format,
            value,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Replace the record after validating it.
    pub fn replace(&mut self, value: T) -> Result<(), ConfigError> {
        value.validate()?;
        self.value = value;
        Ok(())
    }

    /// The record as pretty JSON, regardless of the file format.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        to_json_string(&self.value)
    }

    /// Write the record atomically.
    ///
    /// Parent directories are created. The contents go to `<file>.tmp`
    /// first, which is synced and renamed over the target.
    pub fn save(&self) -> Result<(), ConfigError> {
        let contents = match self.format {
            ConfigFormat::Json => to_json_string(&self.value)?,
            ConfigFormat::Toml => toml::to_string_pretty(&self.value)
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?,
        };
        write_atomic(&self.path, contents.as_bytes())
    }
}

fn parse_document(path: &Path, format: ConfigFormat, contents: &str) -> Result<Value, ConfigError> {
    let parse_error = |message: String| ConfigError::ParseError {
        path: path.to_path_buf(),
        message,
    };

    let document = match format {
        ConfigFormat::Json => {
            serde_json::from_str::<Value>(contents).map_err(|e| parse_error(e.to_string()))?
        }
        ConfigFormat::Toml => {
            let table: toml::Table =
                toml::from_str(contents).map_err(|e| parse_error(e.to_string()))?;
            serde_json::to_value(table).map_err(|e| parse_error(e.to_string()))?
        }
    };

    if !document.is_object() {
        return Err(parse_error("expected an object at the top level".to_string()));
    }
    Ok(document)
}

/// Merge `overrides` into `base`. Objects merge key by key; anything else
/// replaces.
pub fn deep_merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overrides) => *base = overrides,
    }
}

fn to_json_string<T: Serialize>(value: &T) -> Result<String, ConfigError> {
    let mut json =
        crate::ui::output::to_pretty_json(value).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
    json.push('\n');
    Ok(json)
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ConfigError> {
    let write_error = |path: &Path, source: std::io::Error| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| write_error(path, e))?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let mut file = fs::File::create(&temp_path).map_err(|e| write_error(temp_path.as_path(), e))?;
    file.write_all(contents)
        .map_err(|e| write_error(temp_path.as_path(), e))?;
    file.sync_all().map_err(|e| write_error(temp_path.as_path(), e))?;

    fs::rename(&temp_path, path).map_err(|e| write_error(path, e))?;
    Ok(())
}
