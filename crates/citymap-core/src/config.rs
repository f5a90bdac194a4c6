use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variables consulted, in order, when `map.access_token` is empty.
pub const TOKEN_ENV_VARS: [&str; 2] = ["CITYMAP_MAP_TOKEN", "MAPBOX_TOKEN"];

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    #[serde(skip)]
    pub config_dir: PathBuf,

    /// Map widget settings
    #[serde(default)]
    pub map: MapConfig,

    /// Weather settings
    #[serde(default)]
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Access credential for the map provider. Empty means "not configured".
    #[serde(default)]
    pub access_token: String,

    /// Basemap style URL
    #[serde(default = "default_style_url")]
    pub style_url: String,

    /// Id of the element the map mounts into
    #[serde(default = "default_container_id")]
    pub container_id: String,

    /// World view center as `[lon, lat]` when no city is selected
    #[serde(default = "default_world_center")]
    pub world_center: [f64; 2],

    /// Zoom level for the world view
    #[serde(default = "default_world_zoom")]
    pub world_zoom: f64,

    /// Zoom level when a city is selected
    #[serde(default = "default_city_zoom")]
    pub city_zoom: f64,

    /// Fly-to animation duration in milliseconds
    #[serde(default = "default_fly_duration_ms")]
    pub fly_duration_ms: u64,
}

fn default_style_url() -> String {
    "mapbox://styles/mapbox/streets-v11".to_string()
}

fn default_container_id() -> String {
    "map".to_string()
}

fn default_world_center() -> [f64; 2] {
    [10.0, 35.0]
}

fn default_world_zoom() -> f64 {
    1.5
}

fn default_city_zoom() -> f64 {
    10.0
}

fn default_fly_duration_ms() -> u64 {
    2000
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            style_url: default_style_url(),
            container_id: default_container_id(),
            world_center: default_world_center(),
            world_zoom: default_world_zoom(),
            city_zoom: default_city_zoom(),
            fly_duration_ms: default_fly_duration_ms(),
        }
    }
}

impl MapConfig {
    /// The configured access token, or a `MissingSetting` error when blank.
    pub fn access_token(&self) -> Result<&str, ConfigError> {
        let token = self.access_token.trim();
        if token.is_empty() {
            return Err(ConfigError::MissingSetting("map.access_token".to_string()));
        }
        Ok(token)
    }

    /// Fill an empty token from the environment.
    fn apply_env_token(&mut self) {
        if !self.access_token.trim().is_empty() {
            return;
        }
        for var in TOKEN_ENV_VARS {
            if let Ok(token) = std::env::var(var) {
                if !token.trim().is_empty() {
                    tracing::info!("Using map access token from {} environment variable", var);
                    self.access_token = token;
                    return;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the Open-Meteo compatible forecast API
    #[serde(default = "default_weather_api_base_url")]
    pub api_base_url: String,
}

fn default_weather_api_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_weather_api_base_url(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            map: MapConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("citymap")
}

impl Config {
    /// Load configuration from `config.toml` inside `config_dir`.
    ///
    /// A missing file is created with defaults. The access token is then
    /// filled from the environment if the file leaves it empty.
    pub fn load_from(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join("config.toml");

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            toml::from_str::<Config>(&contents)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?
        } else {
            let config = Self {
                config_dir: config_dir.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            config
        };

        config.config_dir = config_dir.to_path_buf();
        config.map.apply_env_token();
        Ok(config)
    }

    /// Load configuration from the user config directory, creating the
    /// file with defaults if it doesn't exist, and validate it.
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("citymap");
        Self::load_validated_from(&config_dir)
    }

    /// [`Config::load_validated`] for an explicit config directory
    pub fn load_validated_from(config_dir: &Path) -> Result<(Self, ValidationResult)> {
        let config = Self::load_from(config_dir)?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.api_base_url, "weather.api_base_url", &mut result);

        // A missing token degrades the map but the app still runs
        if self.map.access_token().is_err() {
            result.add_warning(
                "map.access_token",
                "Map access token not configured - the map will show an error banner",
            );
        }

        if self.map.container_id.trim().is_empty() {
            result.add_error("map.container_id", "Container id must not be empty");
        }

        let [lon, lat] = self.map.world_center;
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            result.add_error(
                "map.world_center",
                format!("Center out of range: [{}, {}]", lon, lat),
            );
        }

        for (field, zoom) in [
            ("map.world_zoom", self.map.world_zoom),
            ("map.city_zoom", self.map.city_zoom),
        ] {
            if !(0.0..=22.0).contains(&zoom) {
                result.add_error(field, format!("Zoom must be between 0 and 22, got {}", zoom));
            }
        }

        if self.map.fly_duration_ms > 10_000 {
            result.add_warning("map.fly_duration_ms", "Fly-to animation is longer than 10s");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = self.config_dir.join("config.toml");

        std::fs::create_dir_all(&self.config_dir)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        // Default config should be valid (only warnings, no errors)
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_missing_token_is_warning() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "map.access_token"));
    }

    #[test]
    fn test_access_token_blank_is_missing_setting() {
        let mut map = MapConfig::default();
        map.access_token = "   ".to_string();
        assert!(matches!(map.access_token(), Err(ConfigError::MissingSetting(_))));

        map.access_token = " pk.test ".to_string();
        assert_eq!(map.access_token().unwrap(), "pk.test");
    }

    #[test]
    fn test_invalid_weather_url() {
        let mut config = Config::default();
        config.weather.api_base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.api_base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.weather.api_base_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zoom_out_of_range() {
        let mut config = Config::default();
        config.map.city_zoom = 40.0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "map.city_zoom"));
    }

    #[test]
    fn test_world_center_out_of_range() {
        let mut config = Config::default();
        config.map.world_center = [200.0, 35.0];
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path()).unwrap();

        assert!(dir.path().join("config.toml").exists());
        assert_eq!(config.config_dir, dir.path());
        assert_eq!(config.map.city_zoom, 10.0);
        assert_eq!(config.weather.api_base_url, "https://api.open-meteo.com/v1");
    }

    #[test]
    fn test_load_reads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[map]\naccess_token = \"pk.from-file\"\ncity_zoom = 12.0\n",
        )
        .unwrap();

        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.map.access_token().unwrap(), "pk.from-file");
        assert_eq!(config.map.city_zoom, 12.0);
        assert_eq!(config.map.world_zoom, 1.5);
        assert_eq!(config.weather.api_base_url, "https://api.open-meteo.com/v1");
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[map\n").unwrap();

        let err = Config::load_from(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_validated_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[map]
city_zoom = 40.0
").unwrap();

        let err = Config::load_validated_from(dir.path()).unwrap_err();
        match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::Invalid(summary)) => assert!(summary.contains("map.city_zoom")),
            other => panic!("expected invalid config, got {:?}", other),
        }
    }

    #[test]
    fn test_load_validated_accepts_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, validation) = Config::load_validated_from(dir.path()).unwrap();
        assert!(validation.is_valid());
        assert_eq!(config.map.container_id, "map");
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
