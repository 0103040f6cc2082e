//! XML configuration support for the `openz` binary.
//! - Loads settings from config.xml (quick_xml + serde).
//! - A missing file is not an error: defaults apply.
//!
//! Example:
//! ```xml
//! <config>
//!   <log_level>info</log_level>
//!   <log_file>/var/log/openz.log</log_file>
//!   <lockfile>true</lockfile>
//!   <atomic>true</atomic>
//!   <backup>true</backup>
//!   <backup_on_fault>false</backup_on_fault>
//! </config>
//! ```

use anyhow::{Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::default_config_path;
use super::types::{AppConfig, LogLevel};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    log_level: Option<String>,
    log_file: Option<String>,
    #[serde(default, deserialize_with = "de_bool_trimmed_opt")]
    lockfile: Option<bool>,
    #[serde(default, deserialize_with = "de_bool_trimmed_opt")]
    atomic: Option<bool>,
    #[serde(default, deserialize_with = "de_bool_trimmed_opt")]
    backup: Option<bool>,
    #[serde(default, deserialize_with = "de_bool_trimmed_opt")]
    backup_on_fault: Option<bool>,
}

// Tolerate surrounding whitespace ("<atomic> true </atomic>").
fn de_bool_trimmed_opt<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<bool>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected true/false, got '{s}'"))),
    }
}

fn xml_to_config(parsed: XmlConfig) -> Result<AppConfig> {
    let mut cfg = AppConfig::default();

    if let Some(s) = parsed.log_level.as_deref() {
        cfg.log_level = s
            .trim()
            .parse::<LogLevel>()
            .map_err(anyhow::Error::msg)?;
    }
    if let Some(s) = parsed.log_file.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            cfg.log_file = Some(PathBuf::from(trimmed));
        }
    }

    let d = &mut cfg.defaults;
    d.lockfile = parsed.lockfile.unwrap_or(false);
    d.atomic = parsed.atomic.unwrap_or(false);
    d.backup = parsed.backup.unwrap_or(false);
    d.backup_on_fault = parsed.backup_on_fault.unwrap_or(false);

    Ok(cfg)
}

/// Load an AppConfig from a specific XML file path.
pub fn load_app_config_from_path(path: &Path) -> Result<AppConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("invalid value in '{}'", path.display()))
}

/// Load the AppConfig from `$OPENZ_CONFIG` or the platform default path.
/// Returns defaults when no config file exists.
pub fn load_app_config() -> Result<AppConfig> {
    let Some(path) = default_config_path() else {
        debug!("no config directory available; using defaults");
        return Ok(AppConfig::default());
    };
    if !path.exists() {
        debug!(path = %path.display(), "config file not found; using defaults");
        return Ok(AppConfig::default());
    }
    debug!(path = %path.display(), "loading config");
    load_app_config_from_path(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::ContentMode;

    #[test]
    fn parses_flags_with_whitespace() {
        let xml = "<config><atomic> true </atomic><backup>true</backup></config>";
        let parsed: XmlConfig = from_xml_str(xml).unwrap();
        let cfg = xml_to_config(parsed).unwrap();
        assert!(cfg.defaults.atomic);
        assert!(cfg.defaults.backup);
        assert!(!cfg.defaults.lockfile);
        assert_eq!(cfg.defaults.mode, ContentMode::Binary);
    }

    #[test]
    fn empty_log_file_is_none() {
        let xml = "<config><log_file>  </log_file></config>";
        let parsed: XmlConfig = from_xml_str(xml).unwrap();
        let cfg = xml_to_config(parsed).unwrap();
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let xml = "<config><overwrite_everything>true</overwrite_everything></config>";
        assert!(from_xml_str::<XmlConfig>(xml).is_err());
    }

    #[test]
    fn bad_log_level_is_an_error() {
        let xml = "<config><log_level>loud</log_level></config>";
        let parsed: XmlConfig = from_xml_str(xml).unwrap();
        let err = xml_to_config(parsed).unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }
}
