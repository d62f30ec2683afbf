//! Parameter lookup by key, from TOML files (development) or environment
//! variables (deployed).
//!
//! Sources only hand back raw strings; [`Parameters`] does the typing and
//! logs every value it reads, masking the sensitive ones.

use std::collections::BTreeMap;
use std::env;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use tracing::{info, warn};

use crate::error::ConfigError;

pub trait ParameterSource: Send + Sync {
    /// Name of the environment the parameters belong to (`dev`, `prod`, ...).
    fn environment(&self) -> &str;

    fn lookup(&self, key: &str) -> Option<String>;
}

// --- FileSource ---

/// Reads the table named after the environment from one or more TOML files.
/// Later files override earlier ones; missing files are skipped.
///
/// ```toml
/// [dev]
/// base-url = "https://example.org/search?q="
/// batch-size = 20
/// names-of-interest = ["Katie"]
/// ```
pub struct FileSource {
    environment: String,
    values: BTreeMap<String, String>,
}

impl FileSource {
    pub fn load(environment: &str, paths: &[&Path]) -> Result<Self, ConfigError> {
        let mut source = Self {
            environment: environment.to_string(),
            values: BTreeMap::new(),
        };

        for path in paths {
            if !path.exists() {
                info!(path = %path.display(), "Config file not present, skipping");
                continue;
            }
            info!(path = %path.display(), "Reading in config file");
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            source
                .merge_toml(&content)
                .map_err(|message| ConfigError::File {
                    path: path.display().to_string(),
                    message,
                })?;
        }

        Ok(source)
    }

    pub fn from_toml(environment: &str, content: &str) -> Result<Self, ConfigError> {
        let mut source = Self {
            environment: environment.to_string(),
            values: BTreeMap::new(),
        };
        source
            .merge_toml(content)
            .map_err(|message| ConfigError::File {
                path: "<inline>".to_string(),
                message,
            })?;
        Ok(source)
    }

    fn merge_toml(&mut self, content: &str) -> Result<(), String> {
        let root: toml::Table = content.parse().map_err(|e: toml::de::Error| e.to_string())?;

        let Some(section) = root.get(&self.environment) else {
            warn!(environment = %self.environment, "No section for environment in config file");
            return Ok(());
        };
        let toml::Value::Table(table) = section else {
            return Err(format!("[{}] must be a table", self.environment));
        };

        for (key, value) in table {
            self.values.insert(key.clone(), toml_to_param(value)?);
        }
        Ok(())
    }
}

/// Arrays are stored as JSON so file and env parameters read the same way.
fn toml_to_param(value: &toml::Value) -> Result<String, String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Array(_) => serde_json::to_string(value).map_err(|e| e.to_string()),
        other => Err(format!("unsupported parameter type: {}", other.type_str())),
    }
}

impl ParameterSource for FileSource {
    fn environment(&self) -> &str {
        &self.environment
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

// --- EnvSource ---

/// Reads `<PREFIX>_<KEY>` environment variables, with the key upper-cased and
/// dashes turned into underscores (`batch-size` → `HIGH_FIVE_TRACKER_BATCH_SIZE`).
pub struct EnvSource {
    environment: String,
    prefix: String,
}

impl EnvSource {
    pub fn new(environment: &str, prefix: &str) -> Self {
        Self {
            environment: environment.to_string(),
            prefix: prefix.to_string(),
        }
    }

    pub fn var_name(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key.to_uppercase().replace('-', "_"))
    }
}

impl ParameterSource for EnvSource {
    fn environment(&self) -> &str {
        &self.environment
    }

    fn lookup(&self, key: &str) -> Option<String> {
        env::var(self.var_name(key)).ok()
    }
}

// --- Parameters ---

/// Typed, logged access to a [`ParameterSource`].
pub struct Parameters<'a> {
    source: &'a dyn ParameterSource,
}

impl<'a> Parameters<'a> {
    pub fn new(source: &'a dyn ParameterSource) -> Self {
        Self { source }
    }

    pub fn environment(&self) -> &str {
        self.source.environment()
    }

    pub fn required<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(key)?.ok_or_else(|| not_found(key))
    }

    pub fn optional<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.read(key, false)?.map(|raw| parse(key, &raw)).transpose()
    }

    /// Like [`Parameters::optional`] but the value is never logged.
    pub fn optional_secret(&self, key: &str) -> Result<Option<String>, ConfigError> {
        self.read(key, true)
    }

    /// A JSON array of strings, e.g. `["Katie", "Sam"]`.
    pub fn array(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        let raw = self.read(key, false)?.ok_or_else(|| not_found(key))?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::Invalid {
            key: key.to_string(),
            message: format!("expected a JSON array of strings: {e}"),
        })
    }

    fn read(&self, key: &str, is_secret: bool) -> Result<Option<String>, ConfigError> {
        let value = self.source.lookup(key);
        if let Some(v) = &value {
            info!("Got parameter {key} with value {}", loggable_value(v, is_secret));
        }
        Ok(value)
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn not_found(key: &str) -> ConfigError {
    // The error alone doesn't show which source was consulted.
    warn!(key, "Could not get parameter");
    ConfigError::NotFound(key.to_string())
}

pub fn loggable_value(value: &str, is_secret: bool) -> &str {
    if is_secret {
        "<secret>"
    } else {
        value
    }
}
