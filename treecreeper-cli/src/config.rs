//! Configuration loading and validation for Treecreeper.
//!
//! Treecreeper reads an optional `treecreeper.yaml` from the current
//! directory, or the file named with `--config`. Every setting also has a
//! command-line flag, so a config file is never required.
//!
//! # Environment Variable Overrides
//!
//! - `TREECREEPER_OUTPUT`: Override the output path
//! - `TREECREEPER_BUILTINS`: Include built-in declarations (`1`/`true`/`yes`)
//!
//! Command-line flags take precedence over both the file and the environment.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::serializers::{DEFAULT_CREATOR, DEFAULT_FORMAT_VERSION, RenderOptions};

/// Name of the config file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "treecreeper.yaml";

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read the configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse the YAML configuration.
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// No output destination was given anywhere.
    #[error("No output file configured")]
    MissingOutput,

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root configuration structure for `treecreeper.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreecreeperConfig {
    /// Where the document is written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Write compiler built-in declarations found in scopes.
    #[serde(default)]
    pub builtins: bool,

    /// Metadata strings written to the document.
    #[serde(default)]
    pub format: FormatConfig,
}

/// The `format` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatConfig {
    #[serde(default = "default_creator")]
    pub creator: String,

    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            creator: default_creator(),
            version: default_version(),
        }
    }
}

fn default_creator() -> String {
    DEFAULT_CREATOR.to_string()
}

fn default_version() -> String {
    DEFAULT_FORMAT_VERSION.to_string()
}

impl TreecreeperConfig {
    /// Load `./treecreeper.yaml` if present, otherwise start from defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::load_from_path(path)
        } else {
            tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: TreecreeperConfig = serde_yaml::from_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `TREECREEPER_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply `TREECREEPER_*` overrides read through `lookup`.
    pub fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup("TREECREEPER_OUTPUT") {
            self.output = Some(PathBuf::from(path));
        }

        if let Some(value) = lookup("TREECREEPER_BUILTINS") {
            self.builtins = parse_switch(&value).ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "TREECREEPER_BUILTINS must be a boolean, got '{}'",
                    value
                ))
            })?;
        }

        Ok(())
    }

    /// Expand `~` in the output path and check that one is set.
    ///
    /// Returns the output path to write to.
    pub fn resolve_output(&mut self) -> Result<PathBuf, ConfigError> {
        let output = self.output.take().ok_or(ConfigError::MissingOutput)?;
        if output.as_os_str().is_empty() {
            return Err(ConfigError::MissingOutput);
        }

        let expanded = expand_home(output)?;
        self.output = Some(expanded.clone());
        Ok(expanded)
    }

    /// Options handed to the serializer.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            include_builtins: self.builtins,
            creator: self.format.creator.clone(),
            format_version: self.format.version.clone(),
        }
    }
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Expand a leading `~` to the home directory.
fn expand_home(path: PathBuf) -> Result<PathBuf, ConfigError> {
    let rest = match path.to_str() {
        Some("~") => "",
        Some(s) => match s.strip_prefix("~/") {
            Some(rest) => rest,
            None => return Ok(path),
        },
        None => return Ok(path),
    };

    let home = dirs::home_dir()
        .ok_or_else(|| ConfigError::ValidationError("Cannot determine home directory".into()))?;
    Ok(if rest.is_empty() {
        home
    } else {
        home.join(rest)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_full_config() {
        let yaml = r#"
output: out/unit.json
builtins: true
format:
  creator: "my-build"
  version: "custom-2"
"#;
        let dir = tempdir().unwrap();
        let path = dir.path().join("treecreeper.yaml");
        std::fs::write(&path, yaml).unwrap();

        let config = TreecreeperConfig::load_from_path(&path).unwrap();
        assert_eq!(config.output, Some(PathBuf::from("out/unit.json")));
        assert!(config.builtins);
        assert_eq!(config.format.creator, "my-build");
        assert_eq!(config.format.version, "custom-2");
    }

    #[test]
    fn test_load_empty_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("treecreeper.yaml");
        std::fs::write(&path, "{}\n").unwrap();

        let config = TreecreeperConfig::load_from_path(&path).unwrap();
        assert_eq!(config, TreecreeperConfig::default());
        assert_eq!(config.render_options(), RenderOptions::default());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.yaml");
        let err = TreecreeperConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("treecreeper.yaml");
        std::fs::write(&path, "builtins: [not, a, bool]\n").unwrap();

        let err = TreecreeperConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = TreecreeperConfig::default();
        config
            .apply_overrides_from(env_of(&[
                ("TREECREEPER_OUTPUT", "/tmp/unit.json"),
                ("TREECREEPER_BUILTINS", "yes"),
            ]))
            .unwrap();

        assert_eq!(config.output, Some(PathBuf::from("/tmp/unit.json")));
        assert!(config.render_options().include_builtins);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = TreecreeperConfig::default();
        let err = config
            .apply_overrides_from(env_of(&[("TREECREEPER_BUILTINS", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("TREECREEPER_BUILTINS"));
    }

    #[test]
    fn test_missing_output() {
        let mut config = TreecreeperConfig::default();
        assert!(matches!(
            config.resolve_output(),
            Err(ConfigError::MissingOutput)
        ));

        config.output = Some(PathBuf::new());
        assert!(matches!(
            config.resolve_output(),
            Err(ConfigError::MissingOutput)
        ));
    }

    #[test]
    fn test_home_expansion() {
        let Some(home) = dirs::home_dir() else {
            return;
        };

        let mut config = TreecreeperConfig {
            output: Some(PathBuf::from("~/dumps/unit.json")),
            ..TreecreeperConfig::default()
        };
        assert_eq!(
            config.resolve_output().unwrap(),
            home.join("dumps/unit.json")
        );

        config.output = Some(PathBuf::from("relative/unit.json"));
        assert_eq!(
            config.resolve_output().unwrap(),
            PathBuf::from("relative/unit.json")
        );
    }
}
