//! Console settings.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use custodian_core::LockoutPolicy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Settings read at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Failed-login lockout policy for the registry.
    pub lockout: LockoutPolicy,
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid settings JSON.
    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        serde_json::from_str(contents).context("invalid settings JSON")
    }
}

/// Location of the settings file in the platform config directory.
#[must_use]
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("custodian")
        .join("settings.json")
}

/// Load settings from a file that must exist.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load(path: &Path) -> anyhow::Result<Settings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    let settings = Settings::from_json(&contents)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    info!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Load settings from `path`, or use defaults if there is no such file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_or_default(path: &Path) -> anyhow::Result<Settings> {
    if !path.exists() {
        debug!("No settings at {}, using defaults", path.display());
        return Ok(Settings::default());
    }
    load(path)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("custodian-{}-{name}", std::process::id()))
    }

    #[test]
    fn empty_object_is_default() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.lockout.failed_attempt_limit, 5);
    }

    #[test]
    fn lockout_limit_is_read() {
        let settings =
            Settings::from_json(r#"{"lockout": {"failed_attempt_limit": 3}}"#).unwrap();
        assert_eq!(settings.lockout.failed_attempt_limit, 3);
    }

    #[test]
    fn malformed_json_is_error() {
        assert!(Settings::from_json("{lockout").is_err());
        assert!(Settings::from_json(r#"{"lockout": {"failed_attempt_limit": -1}}"#).is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let path = temp_path("missing.json");
        assert_eq!(load_or_default(&path).unwrap(), Settings::default());
        assert!(load(&path).is_err());
    }

    #[test]
    fn load_from_file() {
        let path = temp_path("settings.json");
        fs::write(&path, r#"{"lockout": {"failed_attempt_limit": 2}}"#).unwrap();

        let settings = load_or_default(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(settings.lockout.failed_attempt_limit, 2);
    }

    #[test]
    fn default_path_ends_with_settings_file() {
        let path = default_path();
        assert!(path.ends_with("custodian/settings.json"));
    }
}
