use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("AUTH_JWT_SECRET is not set")]
    MissingSecret,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090/".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub port: u16,
    /// Results below this confidence are parked for human review.
    pub review_threshold: f64,
    pub top_vendor_limit: usize,
    /// Exclusive upper bound of a plausible invoice total.
    pub amount_ceiling: f64,
    pub max_upload_bytes: usize,
    pub queue_path: PathBuf,
    pub ledger_path: PathBuf,
    pub frontend_dir: Option<PathBuf>,
    pub allowed_origin: Option<String>,
    pub jwt_secret: String,
    pub engine: EngineConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 8081,
            review_threshold: 0.80,
            top_vendor_limit: 5,
            amount_ceiling: 1_000_000.0,
            max_upload_bytes: 20 * 1024 * 1024,
            queue_path: PathBuf::from("data/review_queue.json"),
            ledger_path: PathBuf::from("data/processed_ledger.json"),
            frontend_dir: None,
            allowed_origin: None,
            jwt_secret: String::new(),
            engine: EngineConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Loads `SERVICE_CONFIG` or `config/service.yaml`, then applies
    /// environment overrides. A missing file means built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SERVICE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path());

        let config = if path.exists() {
            log::info!("Loading service config from {}", path.display());
            Self::from_file(&path)?
        } else {
            log::warn!("No config file at {}; using defaults", path.display());
            Self::default()
        };

        config.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(url) = lookup("ENGINE_URL") {
            self.engine.base_url = url;
        }
        if let Some(secret) = lookup("AUTH_JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(dir) = lookup("FRONTEND_DIR") {
            self.frontend_dir = Some(PathBuf::from(dir));
        }
        if let Some(origin) = lookup("ALLOWED_ORIGIN") {
            self.allowed_origin = Some(origin);
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.review_threshold) {
            return Err(ConfigError::InvalidValue {
                name: "review_threshold",
                value: self.review_threshold.to_string(),
            });
        }
        if self.amount_ceiling <= 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "amount_ceiling",
                value: self.amount_ceiling.to_string(),
            });
        }
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(())
    }
}

fn default_config_path() -> PathBuf {
    match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(manifest_dir) => PathBuf::from(manifest_dir).join("../config/service.yaml"),
        Err(_) => PathBuf::from("config/service.yaml"),
    }
}
