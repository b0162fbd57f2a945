//! TOML-based engine configuration.
//!
//! Stores:
//! - Who the user is (display name and chat handles)
//! - Brief defaults (intent mode, FYI score ceiling)
//! - Fetch budget per provider
//! - The tool catalog used for coverage
//! - Keyword matcher selection
//!
//! The core never decides where the file lives; callers pass a path (the CLI
//! uses `~/.config/signalroom/config.toml`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::brief::DEFAULT_FYI_SCORE_CEILING;
use crate::classify::MatcherKind;
use crate::coverage::ToolCatalog;
use crate::error::ConfigError;
use crate::gather::{FetchConfig, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_ITEMS_PER_PROVIDER};
use crate::mode::IntentMode;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The person the brief is for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub display_name: String,
    /// Strings that count as mentioning the user, e.g. `@dana`.
    #[serde(default)]
    pub handles: Vec<String>,
}

/// Brief compilation defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefConfig {
    #[serde(default)]
    pub default_mode: IntentMode,
    #[serde(default = "default_fyi_score_ceiling")]
    pub fyi_score_ceiling: u8,
}

/// Per-provider fetch budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_items")]
    pub max_items_per_provider: usize,
}

/// Supported tools for coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageConfig {
    #[serde(default = "default_communication_tools")]
    pub communication_tools: Vec<String>,
    #[serde(default = "default_task_tools")]
    pub task_tools: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub matcher: MatcherKind,
}

/// Engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub brief: BriefConfig,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub coverage: CoverageConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

// Default functions
fn default_fyi_score_ceiling() -> u8 {
    DEFAULT_FYI_SCORE_CEILING
}
fn default_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT.as_secs()
}
fn default_max_items() -> usize {
    DEFAULT_MAX_ITEMS_PER_PROVIDER
}
fn default_communication_tools() -> Vec<String> {
    vec!["slack".into(), "discord".into()]
}
fn default_task_tools() -> Vec<String> {
    vec!["linear".into(), "github".into(), "notion".into()]
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self {
            default_mode: IntentMode::default(),
            fyi_score_ceiling: default_fyi_score_ceiling(),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_items_per_provider: default_max_items(),
        }
    }
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            communication_tools: default_communication_tools(),
            task_tools: default_task_tools(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn parse_leaf(
        key: &str,
        existing: &serde_json::Value,
        value: &str,
    ) -> Result<serde_json::Value, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let parsed = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => {
                if let Ok(n) = value.parse::<u64>() {
                    serde_json::Value::Number(n.into())
                } else if let Ok(n) = value.parse::<f64>() {
                    serde_json::Number::from_f64(n)
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                } else {
                    return Err(invalid(format!("cannot parse '{value}' as number")));
                }
            }
            // Lists accept JSON or a comma-separated shorthand.
            serde_json::Value::Array(_) if !value.trim_start().starts_with('[') => serde_json::Value::Array(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| serde_json::Value::String(s.to_string()))
                    .collect(),
            ),
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };
        Ok(parsed)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;
                let new_value = Self::parse_leaf(key, existing, value)?;
                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// `<dir>/config.toml`
    pub fn default_path_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE_NAME)
    }

    /// Load from `path`, or return defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The whole config is
    /// re-validated, so e.g. an unknown intent mode is rejected.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Every leaf as `(dot.path, value)`, sorted by path.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let path = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&path, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_secs(self.fetch.timeout_secs),
            max_items: self.fetch.max_items_per_provider,
        }
    }

    pub fn tool_catalog(&self) -> ToolCatalog {
        ToolCatalog::new(&self.coverage.communication_tools, &self.coverage.task_tools)
    }
}
