use crate::error::{Result, TourError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR_NAME: &str = ".pyhub/tourdata";
const CONFIG_FILE_NAME: &str = "config.yaml";

pub const API_KEY_ENV: &str = "DATA_GO_KR_API_KEY";
pub const STORE_URI_ENV: &str = "TOURDATA_STORE_URI";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub store: StoreSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// data.go.kr service key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub base_url: String,
    pub rows_per_page: u32,
    /// Courtesy delay between upstream calls (milliseconds)
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    pub mobile_os: String,
    pub mobile_app: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            key: None,
            base_url: crate::api::DEFAULT_BASE_URL.to_string(),
            rows_per_page: 200,
            request_delay_ms: 300,
            timeout_secs: 30,
            mobile_os: "ETC".to_string(),
            mobile_app: "AppTest".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub raw_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("raw"),
            output_dir: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Connection string, `sqlite://<path>` or a bare path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    pub database: String,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub max_retries: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            uri: None,
            database: "korea_tourism".to_string(),
            batch_size: 300,
            batch_delay_ms: 1000,
            max_retries: 3,
        }
    }
}

impl ApiSettings {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl StoreSettings {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl Config {
    /// Get the configuration directory path
    pub fn config_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| TourError::Config("Could not determine home directory".to_string()))?;

        Ok(home_dir.join(CONFIG_DIR_NAME))
    }

    /// Get the configuration file full path
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_path()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location; a missing file yields defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| TourError::Config(format!("Failed to read config file: {}", e)))?;

        serde_yaml::from_str(&contents)
            .map_err(|e| TourError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply out-of-band values (environment, command line); non-empty values win
    pub fn with_overrides(mut self, api_key: Option<String>, store_uri: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api.key = Some(key);
        }
        if let Some(uri) = store_uri.filter(|u| !u.trim().is_empty()) {
            self.store.uri = Some(uri);
        }
        self
    }

    /// API key, required by every fetch stage
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api.key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(TourError::NoApiKey),
        }
    }
}
