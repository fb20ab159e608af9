//! Layered option loading.
//!
//! This module provides the [`OptionsLoader`] for loading gate options from
//! defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, GateOptions};

/// Gate options loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use tollgate_config::OptionsLoader;
///
/// # fn main() -> Result<(), tollgate_config::ConfigError> {
/// let options = OptionsLoader::new()
///     .with_optional_file("tollgate.toml")?
///     .with_env_prefix("TOLLGATE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct OptionsLoader {
    options: GateOptions,
    env_prefix: Option<String>,
}

impl OptionsLoader {
    /// Create a new loader starting from default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`. Fields absent
    /// from the file keep their default values.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.options = Self::parse_file(&content, path)?;
        tracing::debug!(path = %path.display(), "Loaded gate options from file");

        Ok(self)
    }

    /// Load options from a file if it exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load options from a string in `format` (`toml` or `json`).
    ///
    /// # Example
    ///
    /// ```
    /// use tollgate_config::OptionsLoader;
    ///
    /// let options = OptionsLoader::new()
    ///     .with_string(r#"secret = "k""#, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(options.secret.as_deref(), Some("k"));
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.options = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__KEY`, for example
    /// `TOLLGATE__SECRET` or `TOLLGATE__PATH=/api,/admin`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the current directory or its parents, if any.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded environment file"),
            Err(err) if err.not_found() => {}
            Err(err) => return Err(err.into()),
        }
        Ok(self)
    }

    /// Load a specific `.env` file.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        dotenvy::from_path(path.as_ref())?;
        Ok(self)
    }

    /// Apply environment overrides and validate.
    pub fn load(mut self) -> Result<GateOptions, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.options.validate()?;

        Ok(self.options)
    }

    /// Finalize without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> GateOptions {
        self.options
    }

    fn parse_file(content: &str, path: &Path) -> Result<GateOptions, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        for (key, value) in env::vars_os() {
            // Keys that are not UTF-8 cannot carry the prefix
            let Some(key) = key.to_str().filter(|k| k.starts_with(&marker)) else {
                continue;
            };
            let value = value
                .to_str()
                .ok_or_else(|| ConfigError::env_parse_error(key, "value is not valid UTF-8"))?;
            self.apply_env_var(key, value, prefix)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let name = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let options = &mut self.options;
        match name {
            "SECRET" => options.secret = Some(value.to_string()),
            "TTL" => {
                options.ttl = if value.is_empty() || value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(value.parse().map_err(|_| {
                        ConfigError::env_parse_error(key, "expected integer or 'none'")
                    })?)
                };
            }
            "SECURE" => {
                options.secure = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            "RELAXED" => options.relaxed = parse_list(value),
            "HEADER" => options.header = value.to_string(),
            "REGEXP" => options.regexp = value.to_string(),
            "COOKIE" => options.cookie = value.to_string(),
            "ATTRIBUTE" => options.attribute = value.to_string(),
            "PATH" => {
                options.path = if value.is_empty() {
                    None
                } else {
                    Some(parse_list(value))
                };
            }
            "IGNORE" => options.ignore = parse_list(value),
            _ => tracing::debug!(var = key, "Ignoring unknown environment variable"),
        }

        Ok(())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a comma-separated list, dropping empty items.
fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}
