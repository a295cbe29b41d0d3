use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    city::{City, CityRegistry},
    model::PanelVariant,
    provider::openmeteo::DEFAULT_BASE_URL,
    runtime::{CLOCK_TICK, REFRESH_INTERVAL},
};

/// Dashboard settings stored on disk. Every field is optional; absent ones fall back
/// to the built-in defaults.
///
/// Example TOML:
/// ```toml
/// panel = "detailed"
/// default_city = "Mumbai"
/// refresh_interval_secs = 600
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub refresh_interval_secs: Option<u64>,
    pub clock_tick_ms: Option<u64>,
    pub panel: Option<PanelVariant>,
    /// Must name a registered city.
    pub default_city: Option<String>,
}

impl Config {
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval_secs
            .map(Duration::from_secs)
            .unwrap_or(REFRESH_INTERVAL)
    }

    pub fn clock_tick(&self) -> Duration {
        self.clock_tick_ms
            .map(Duration::from_millis)
            .unwrap_or(CLOCK_TICK)
    }

    pub fn panel(&self) -> PanelVariant {
        self.panel.unwrap_or_default()
    }

    /// The configured default city, checked against `registry`.
    pub fn default_city<'a>(&self, registry: &'a CityRegistry) -> Result<&'a City> {
        match &self.default_city {
            None => Ok(registry.first()),
            Some(name) => registry.find(name).ok_or_else(|| {
                anyhow!(
                    "Configured default city '{name}' is not one of: {}.\n\
                     Hint: run `weather configure` to pick another one.",
                    registry.names().collect::<Vec<_>>().join(", ")
                )
            }),
        }
    }

    pub fn validate(&self, registry: &CityRegistry) -> Result<()> {
        self.default_city(registry)?;
        if self.refresh_interval_secs == Some(0) {
            return Err(anyhow!("refresh_interval_secs must be greater than zero"));
        }
        if self.clock_tick_ms == Some(0) {
            return Err(anyhow!("clock_tick_ms must be greater than zero"));
        }
        Ok(())
    }

    /// Load config from the platform location, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory for the dashboard's log file.
    pub fn data_dir() -> Result<PathBuf> {
        Ok(project_dirs()?.data_local_dir().to_path_buf())
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-dashboard", "weather")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.api_base_url(), "https://api.open-meteo.com");
        assert_eq!(cfg.refresh_interval(), Duration::from_millis(600_000));
        assert_eq!(cfg.clock_tick(), Duration::from_millis(1_000));
        assert_eq!(cfg.panel(), PanelVariant::Detailed);
        assert_eq!(cfg.default_city(&CityRegistry::default()).unwrap().name, "Delhi");
    }

    #[test]
    fn unknown_default_city_is_rejected() {
        let cfg = Config {
            default_city: Some("Chennai".into()),
            ..Config::default()
        };
        let err = cfg.validate(&CityRegistry::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'Chennai'"));
        assert!(msg.contains("Delhi, Bangalore, Mumbai, Gulbarga"));
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let cfg = Config {
            refresh_interval_secs: Some(0),
            ..Config::default()
        };
        assert!(cfg.validate(&CityRegistry::default()).is_err());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            panel: Some(PanelVariant::Basic),
            default_city: Some("Gulbarga".into()),
            refresh_interval_secs: Some(120),
            ..Config::default()
        };

        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded, cfg);
        assert_eq!(loaded.refresh_interval(), Duration::from_secs(120));
    }

    #[test]
    fn panel_is_written_in_lowercase() {
        let toml = toml::to_string_pretty(&Config {
            panel: Some(PanelVariant::Basic),
            ..Config::default()
        })
        .unwrap();
        assert!(toml.contains("panel = \"basic\""));
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "panel = 42").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
