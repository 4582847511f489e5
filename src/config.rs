//! Widget configuration loaded from a TOML file
//!
//! Every field has a default so an empty file (or no file) is valid.

use crate::controls::composer::ControlOverrides;
use crate::{CompanionError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LOG_FILTER: &str = "companion=debug,info";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeChoice {
    #[default]
    Dark,
    Light,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Window title and welcome heading
    pub app_name: String,
    pub start_button_text: String,
    pub theme: ThemeChoice,
    /// Remember the chosen device per kind across sessions
    pub save_user_choices: bool,
    /// Where device choices are stored; `None` uses the platform config dir
    pub device_store_path: Option<PathBuf>,
    pub controls: ControlOverrides,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub log_filter: String,
    /// Latency of the in-process session used by the desktop binary
    pub simulated_latency_ms: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            app_name: "Wellness Companion".to_string(),
            start_button_text: "Start check-in".to_string(),
            theme: ThemeChoice::Dark,
            save_user_choices: true,
            device_store_path: None,
            controls: ControlOverrides::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            simulated_latency_ms: 250,
        }
    }
}

impl WidgetConfig {
    /// Load and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CompanionError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| CompanionError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: WidgetConfig =
            toml::from_str(content).map_err(|e| CompanionError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_theme(mut self, theme: ThemeChoice) -> Self {
        self.theme = theme;
        self
    }

    pub fn without_saved_choices(mut self) -> Self {
        self.save_user_choices = false;
        self
    }

    pub fn with_controls(mut self, controls: ControlOverrides) -> Self {
        self.controls = controls;
        self
    }

    pub fn with_device_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.device_store_path = Some(path.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_button_text.trim().is_empty() {
            return Err(CompanionError::ConfigError(
                "start_button_text must not be empty".to_string(),
            ));
        }
        if let Some(path) = &self.device_store_path {
            if path.is_dir() {
                return Err(CompanionError::ConfigError(format!(
                    "device_store_path {} is a directory",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// Resolved location of the device choice file
    pub fn device_store_path(&self) -> Option<PathBuf> {
        self.device_store_path
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join("companion").join("devices.json")))
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}
