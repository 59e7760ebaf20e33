use crate::error::{FarmcastError, Result};
use crate::logic::aggregation::MAX_FORECAST_DAYS;
use crate::models::BucketKey;
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_OWM_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub openweathermap: OpenWeatherMapConfig,
    #[serde(default)]
    pub insights: InsightsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    15
}

#[derive(Clone, Deserialize, Serialize)]
pub struct OpenWeatherMapConfig {
    pub api_key: String,
    #[serde(default = "default_country_code")]
    pub country_code: String,
    #[serde(default = "default_owm_base_url")]
    pub base_url: String,
}

fn default_country_code() -> String {
    "KE".into()
}

fn default_owm_base_url() -> String {
    DEFAULT_OWM_BASE_URL.into()
}

impl std::fmt::Debug for OpenWeatherMapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapConfig")
            .field("api_key", &"[REDACTED]")
            .field("country_code", &self.country_code)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct InsightsConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_simulated_latency_ms")]
    pub simulated_latency_ms: u64,
}

fn default_simulated_latency_ms() -> u64 {
    800
}

impl InsightsConfig {
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080/api/insights".into(),
            api_key: None,
            simulated_latency_ms: default_simulated_latency_ms(),
        }
    }
}

impl std::fmt::Debug for InsightsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightsConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("simulated_latency_ms", &self.simulated_latency_ms)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForecastConfig {
    pub regions: Vec<String>,
    pub default_region: String,
    #[serde(default)]
    pub bucket_key: BucketKey,
    #[serde(default = "default_max_days")]
    pub max_days: usize,
}

fn default_max_days() -> usize {
    7
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            regions: ["Nairobi", "Mombasa", "Kisumu", "Eldoret", "Nakuru"]
                .iter()
                .map(|r| r.to_string())
                .collect(),
            default_region: "Nairobi".into(),
            bucket_key: BucketKey::Weekday,
            max_days: default_max_days(),
        }
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(FarmcastError::Config(format!(
                "Config file not found at {:?}. Run `farmcast init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| FarmcastError::Config(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&config_str)
    }

    /// Parse a YAML document after `${VAR}` substitution and validate it
    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content)?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| FarmcastError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.forecast.max_days == 0 || self.forecast.max_days > MAX_FORECAST_DAYS {
            return Err(FarmcastError::Config(format!(
                "forecast.max_days must be between 1 and {}",
                MAX_FORECAST_DAYS
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(FarmcastError::Config(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        if self.openweathermap.country_code.trim().is_empty() {
            return Err(FarmcastError::Config(
                "openweathermap.country_code must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        Self::default_config_path()
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/farmcast/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FarmcastError::Config("Cannot determine config directory".into()))?
            .join("farmcast");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up Farmcast!");
        println!();

        println!("OpenWeatherMap");
        let api_key: String = Password::new()
            .with_prompt("  API key")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| FarmcastError::Config(format!("Input error: {}", e)))?;

        let country_code: String = Input::new()
            .with_prompt("  Country code")
            .default(default_country_code())
            .interact_text()
            .map_err(|e| FarmcastError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Forecast");
        let defaults = ForecastConfig::default();
        let regions: String = Input::new()
            .with_prompt("  Regions (comma separated)")
            .default(defaults.regions.join(", "))
            .interact_text()
            .map_err(|e| FarmcastError::Config(format!("Input error: {}", e)))?;
        let regions: Vec<String> = regions
            .split(',')
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();

        let default_region: String = Input::new()
            .with_prompt("  Default region")
            .default(
                regions
                    .first()
                    .cloned()
                    .unwrap_or_else(|| defaults.default_region.clone()),
            )
            .interact_text()
            .map_err(|e| FarmcastError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Server");
        let bind: String = Input::new()
            .with_prompt("  Bind address")
            .default(ServerConfig::default().bind)
            .interact_text()
            .map_err(|e| FarmcastError::Config(format!("Input error: {}", e)))?;

        let insights_url: String = Input::new()
            .with_prompt("  Insight service URL")
            .default(InsightsConfig::default().url)
            .interact_text()
            .map_err(|e| FarmcastError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            openweathermap: OpenWeatherMapConfig {
                api_key,
                country_code,
                base_url: default_owm_base_url(),
            },
            insights: InsightsConfig {
                url: insights_url,
                ..InsightsConfig::default()
            },
            server: ServerConfig { bind },
            forecast: ForecastConfig {
                regions,
                default_region,
                ..defaults
            },
            request_timeout_secs: default_request_timeout_secs(),
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| FarmcastError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# Farmcast Configuration\n# Generated by `farmcast init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| FarmcastError::Config(format!("Invalid substitution pattern: {}", e)))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        Ok(result)
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var("FARMCAST_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| FarmcastError::Config("Cannot determine data directory".into()))?
            .join("farmcast");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("farmcast.db"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openweathermap: OpenWeatherMapConfig {
                api_key: String::new(),
                country_code: default_country_code(),
                base_url: default_owm_base_url(),
            },
            insights: InsightsConfig::default(),
            server: ServerConfig::default(),
            forecast: ForecastConfig::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}
