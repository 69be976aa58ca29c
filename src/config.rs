//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/querytree/querytree.toml`
//! 3. Local config: `./.querytree.toml`, or the file given with `--config`
//! 4. Environment variables: `QUERYTREE_*` prefix
//!
//! Later layers replace earlier values; lists are not merged.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::IdAllocator;

/// Id allocator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IdConfig {
    /// Mark for group ids (`<mark>-<n>`)
    pub group_mark: String,
    /// Mark for rule ids
    pub rule_mark: String,
    /// First counter value for both kinds
    pub start: u64,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            group_mark: "g".into(),
            rule_mark: "r".into(),
            start: 0,
        }
    }
}

impl IdConfig {
    pub fn allocator(&self) -> IdAllocator {
        IdAllocator::with_marks(self.group_mark.clone(), self.rule_mark.clone(), self.start)
    }

    /// Marks must be non-empty and distinct, otherwise group and rule ids
    /// could collide. `start` must be below `u64::MAX`.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.group_mark.is_empty() || self.rule_mark.is_empty() {
            return Err(ApplicationError::Config {
                message: "id marks must not be empty".into(),
            });
        }
        if self.group_mark == self.rule_mark {
            return Err(ApplicationError::Config {
                message: format!("group and rule marks are both `{}`", self.group_mark),
            });
        }
        if self.start == u64::MAX {
            return Err(ApplicationError::Config {
                message: format!("ids.start {} leaves no room for a second id", self.start),
            });
        }
        Ok(())
    }
}

/// Choice lists offered to the user when editing rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OptionsConfig {
    pub fields: Vec<String>,
    pub operators: Vec<String>,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            fields: vec![
                "twitter".into(),
                "facebook".into(),
                "name".into(),
                "address".into(),
                "phone".into(),
            ],
            operators: vec!["=".into(), "<".into(), ">".into(), "!=".into()],
        }
    }
}

/// How trees are printed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Tree,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Raw settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub ids: RawIdConfig,
    pub options: RawOptionsConfig,
    pub output: RawOutputConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawIdConfig {
    pub group_mark: Option<String>,
    pub rule_mark: Option<String>,
    pub start: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOptionsConfig {
    pub fields: Option<Vec<String>>,
    pub operators: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputConfig {
    pub format: Option<OutputFormat>,
}

/// Unified configuration for querytree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub ids: IdConfig,
    pub options: OptionsConfig,
    pub output: OutputConfig,
}

/// Get the XDG config directory for querytree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "querytree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("querytree.toml"))
}

/// Local config file looked up in the working directory.
pub fn local_config_path() -> PathBuf {
    PathBuf::from(".querytree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay values that `raw` specifies; keep the rest.
    pub fn merge_with(&self, raw: &RawSettings) -> Self {
        Self {
            ids: IdConfig {
                group_mark: raw
                    .ids
                    .group_mark
                    .clone()
                    .unwrap_or_else(|| self.ids.group_mark.clone()),
                rule_mark: raw
                    .ids
                    .rule_mark
                    .clone()
                    .unwrap_or_else(|| self.ids.rule_mark.clone()),
                start: raw.ids.start.unwrap_or(self.ids.start),
            },
            options: OptionsConfig {
                fields: raw
                    .options
                    .fields
                    .clone()
                    .unwrap_or_else(|| self.options.fields.clone()),
                operators: raw
                    .options
                    .operators
                    .clone()
                    .unwrap_or_else(|| self.options.operators.clone()),
            },
            output: OutputConfig {
                format: raw.output.format.unwrap_or(self.output.format),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Explicit config file; must exist when given. Without it,
    ///   `./.querytree.toml` is used if present.
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        match local {
            Some(path) => {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
            None => {
                let path = local_config_path();
                if path.exists() {
                    let raw = load_raw_settings(&path)?;
                    current = current.merge_with(&raw);
                }
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.ids.validate()?;
        Ok(current)
    }

    /// Apply QUERYTREE_* environment variables as explicit overrides.
    ///
    /// Nested keys use `__`, e.g. `QUERYTREE_IDS__GROUP_MARK`; lists are
    /// comma separated.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("QUERYTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("options.fields")
                .with_list_parse_key("options.operators"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("ids.group_mark") {
            settings.ids.group_mark = val;
        }
        if let Ok(val) = config.get_string("ids.rule_mark") {
            settings.ids.rule_mark = val;
        }
        if let Ok(val) = config.get::<u64>("ids.start") {
            settings.ids.start = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("options.fields") {
            settings.options.fields = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("options.operators") {
            settings.options.operators = val;
        }
        if let Ok(val) = config.get::<OutputFormat>("output.format") {
            settings.output.format = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# querytree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/querytree/querytree.toml
#   Local:  ./.querytree.toml (or --config <file>)
#   Env:    QUERYTREE_* environment variables, e.g. QUERYTREE_IDS__START=100
#
# A value set in a later layer replaces the earlier one, lists included.

[ids]
# Id marks, ids look like "<mark>-<n>"; marks must differ
# group_mark = "g"
# rule_mark = "r"
# start = 0

[options]
# Choices offered for rule fields and operators
# fields = ["twitter", "facebook", "name", "address", "phone"]
# operators = ["=", "<", ">", "!="]

[output]
# json | tree
# format = "json"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_when_created_then_matches_classic_choices() {
        let settings = Settings::default();
        assert_eq!(settings.ids.group_mark, "g");
        assert_eq!(settings.ids.rule_mark, "r");
        assert_eq!(settings.options.operators, vec!["=", "<", ">", "!="]);
        assert_eq!(settings.output.format, OutputFormat::Json);
    }

    #[test]
    fn given_partial_raw_when_merging_then_unspecified_values_kept() {
        let raw: RawSettings = toml::from_str(
            r#"
[ids]
start = 7

[options]
fields = ["name"]
"#,
        )
        .unwrap();
        let merged = Settings::default().merge_with(&raw);
        assert_eq!(merged.ids.start, 7);
        assert_eq!(merged.ids.group_mark, "g");
        assert_eq!(merged.options.fields, vec!["name"]);
        assert_eq!(merged.options.operators, OptionsConfig::default().operators);
    }

    #[test]
    fn given_equal_marks_when_validating_then_rejected() {
        let ids = IdConfig {
            group_mark: "x".into(),
            rule_mark: "x".into(),
            start: 0,
        };
        assert!(ids.validate().is_err());
    }

    #[test]
    fn given_settings_when_rendered_to_toml_then_parses_back() {
        let text = Settings::default().to_toml().unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, Settings::default());
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.ids.start.is_none());
    }
}
