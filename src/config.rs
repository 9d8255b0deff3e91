//! The TOML config file: pipeline defaults plus the applications to theme.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::apply::AppTarget;
use crate::error::PaletteError;
use crate::pipeline::extract::{Method, MAX_K, MIN_K};
use crate::pipeline::PipelineConfig;
use crate::template::builtin::TemplateSource;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub method: Option<Method>,
    pub colors: Option<usize>,
    pub quality_threshold: Option<f32>,
    pub timeout_ms: Option<u64>,
    #[serde(default, rename = "app")]
    pub apps: Vec<AppConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub name: String,
    /// A template path, or `builtin:<name>`.
    pub template: String,
    pub output: PathBuf,
    pub reload: Option<String>,
    #[serde(default)]
    pub reload_delay_ms: u64,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Config {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, PaletteError> {
        let config: Config = toml::from_str(text).map_err(|err| PaletteError::Config {
            path: path.to_path_buf(),
            message: err.message().to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, PaletteError> {
        debug!("loading config from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|err| {
            PaletteError::io(format!("failed to read config {}", path.display()), err)
        })?;
        Self::from_toml(&text, path)
    }

    /// Load the file at `path`, or the default location if none is given.
    /// A missing default file yields an empty config.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, PaletteError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let path = default_path();
                if path.exists() {
                    Self::load(&path)
                } else {
                    debug!("no config at {}", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self, path: &Path) -> Result<(), PaletteError> {
        let invalid = |message: String| PaletteError::Config {
            path: path.to_path_buf(),
            message,
        };
        if let Some(k) = self.colors {
            if !(MIN_K..=MAX_K).contains(&k) {
                return Err(invalid(format!("colors must be in {MIN_K}..={MAX_K}, got {k}")));
            }
        }
        if let Some(threshold) = self.quality_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(invalid(format!(
                    "quality_threshold must be in 0..=1, got {threshold}"
                )));
            }
        }
        for app in &self.apps {
            if TemplateSource::parse(&app.template).is_none() {
                return Err(invalid(format!(
                    "app {}: unknown template {}",
                    app.name, app.template
                )));
            }
        }
        Ok(())
    }

    /// Pipeline settings from the file, falling back to defaults.
    pub fn pipeline(&self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        PipelineConfig {
            method: self.method.unwrap_or(defaults.method),
            k: self.colors.unwrap_or(defaults.k),
            quality_threshold: self.quality_threshold.unwrap_or(defaults.quality_threshold),
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn targets(&self) -> Vec<AppTarget> {
        self.apps
            .iter()
            .filter_map(|app| {
                Some(AppTarget {
                    name: app.name.clone(),
                    template: TemplateSource::parse(&app.template)?,
                    output: app.output.clone(),
                    reload: app.reload.clone(),
                    reload_delay: Duration::from_millis(app.reload_delay_ms),
                    enabled: app.enabled,
                })
            })
            .collect()
    }
}

/// `$XDG_CONFIG_HOME/wallhue/config.toml`, or `~/.config/wallhue/config.toml`.
pub fn default_path() -> PathBuf {
    let config_home = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            PathBuf::from(home).join(".config")
        });
    config_home.join("wallhue").join("config.toml")
}
