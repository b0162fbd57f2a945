//! Helpers shared by the subcommands.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use signalroom_core::config::CONFIG_FILE_NAME;
use signalroom_core::{Config, IntentMode};

/// `~/.config/signalroom`, or `~/.config/signalroom-dev` when
/// `SIGNALROOM_ENV=dev`.
pub fn config_dir() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SIGNALROOM_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("signalroom-dev")
    } else {
        base_dir.join("signalroom")
    }
}

pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    Ok(Config::load_from(&config_path())?)
}

/// Explicit `--mode` wins over the configured default.
pub fn resolve_mode(arg: Option<&str>, config: &Config) -> Result<IntentMode, Box<dyn std::error::Error>> {
    match arg {
        Some(raw) => Ok(raw.parse::<IntentMode>()?),
        None => Ok(config.brief.default_mode),
    }
}

/// Parse `--now`, defaulting to the current time.
pub fn resolve_now(arg: Option<&str>) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    match arg {
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
            .map_err(|e| format!("invalid --now '{raw}': {e}"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}
