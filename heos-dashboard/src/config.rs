//! Dashboard configuration.
//!
//! Loaded from a YAML file with environment variable overrides. The file is
//! rewritten whenever a setting changes from the web UI.

use std::net::IpAddr;
use std::path::Path;

use anyhow::{bail, Context, Result};
use heos_discovery::DeviceInfo;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub device: DeviceSection,
    pub app: AppSection,
    pub ui: UiSection,
}

/// Where the receiver lives and what it calls itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSection {
    /// Override: `HEOS_DEVICE_IP`
    pub ip: String,
    /// Override: `HEOS_DEVICE_PORT`
    pub port: u16,
    pub friendly_name: String,
    pub model: String,
    pub manufacturer: String,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            ip: "10.20.30.40".to_string(),
            port: 60006,
            friendly_name: "HEOS Device".to_string(),
            model: "Unknown".to_string(),
            manufacturer: "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSection {
    /// Override: `HEOS_APP_PORT`
    pub port: u16,
    /// Override: `HEOS_APP_HOST`
    pub host: String,
    /// Selects verbose logging when no `--log-mode` is given
    pub debug: bool,
    pub stations_file: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            port: 5050,
            host: "0.0.0.0".to_string(),
            debug: true,
            stations_file: "stations.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSection {
    pub theme: String,
    pub default_volume: u8,
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            default_volume: 30,
        }
    }
}

/// How [`DashboardConfig::load`] arrived at its result
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    Loaded,
    CreatedDefault,
    /// No file existed and the defaults could not be written
    DefaultUnsaved(String),
    /// The file existed but could not be used; defaults are in effect
    Invalid(String),
}

impl DashboardConfig {
    /// Loads configuration from `path`, then applies environment overrides.
    ///
    /// A missing file is created with defaults; if that write fails the
    /// defaults are still used. An unreadable or malformed file is left
    /// alone and defaults are used.
    pub fn load(path: &Path) -> Result<(Self, ConfigSource)> {
        let (mut config, source) = if path.exists() {
            match Self::read(path) {
                Ok(config) => (config, ConfigSource::Loaded),
                Err(e) => (Self::default(), ConfigSource::Invalid(format!("{:#}", e))),
            }
        } else {
            let config = Self::default();
            let source = match config.save(path) {
                Ok(()) => ConfigSource::CreatedDefault,
                Err(e) => ConfigSource::DefaultUnsaved(format!("{:#}", e)),
            };
            (config, source)
        };

        config.apply_env_overrides();
        Ok((config, source))
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`. Values that do not parse are ignored.
    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(ip) = lookup("HEOS_DEVICE_IP") {
            self.device.ip = ip;
        }

        if let Some(port) = lookup("HEOS_DEVICE_PORT").and_then(|v| v.parse().ok()) {
            self.device.port = port;
        }

        if let Some(host) = lookup("HEOS_APP_HOST") {
            self.app.host = host;
        }

        if let Some(port) = lookup("HEOS_APP_PORT").and_then(|v| v.parse().ok()) {
            self.app.port = port;
        }
    }

    /// Merges `{section: {key: value}}` into the configuration.
    ///
    /// Unknown sections and keys are skipped. A value whose type does not
    /// fit its key fails the whole update and leaves `self` unchanged.
    pub fn update_section_values(&mut self, updates: &Value) -> Result<()> {
        let Value::Object(sections) = updates else {
            bail!("Expected a JSON object of configuration sections");
        };

        let mut current = serde_json::to_value(&*self).context("Failed to serialize config")?;

        for (section, values) in sections {
            let Some(Value::Object(existing)) = current.get_mut(section) else {
                continue;
            };
            let Value::Object(values) = values else {
                bail!("Section `{}` must be an object", section);
            };

            for (key, value) in values {
                if let Some(slot) = existing.get_mut(key) {
                    *slot = value.clone();
                }
            }
        }

        let next: Self = serde_json::from_value(current).context("Invalid configuration value")?;
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Checks values that would otherwise only fail at the next startup
    pub fn validate(&self) -> Result<()> {
        self.app
            .host
            .parse::<IpAddr>()
            .with_context(|| format!("app.host must be an IP address, got `{}`", self.app.host))?;
        Ok(())
    }

    /// Copies discovered fields into the device section. Returns true when anything changed.
    pub fn apply_device_info(&mut self, info: &DeviceInfo) -> bool {
        let before = self.device.clone();

        if let Some(name) = &info.friendly_name {
            self.device.friendly_name = name.clone();
        }
        if let Some(model) = &info.model {
            self.device.model = model.clone();
        }
        if let Some(manufacturer) = &info.manufacturer {
            self.device.manufacturer = manufacturer.clone();
        }

        self.device != before
    }
}
