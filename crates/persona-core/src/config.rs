//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{RecommendError, Result};
use crate::i18n::Locale;
use crate::types::ModelType;

/// Default recommendation endpoint
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/recommend-persona/";

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "persona.toml";

/// Main client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Full URL of the recommendation endpoint
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Send `ngrok-skip-browser-warning: true` with every request
    pub skip_browser_warning: bool,

    /// Initial UI locale
    pub locale: Locale,

    /// Initial number of recommendations requested
    pub top_k: u32,

    pub min_top_k: u32,

    pub max_top_k: u32,

    /// Initial scoring model
    pub model_type: ModelType,

    /// Include `model_type` in request bodies (older servers reject it)
    pub send_model_type: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 60,
            skip_browser_warning: true,
            locale: Locale::Ko,
            top_k: 5,
            min_top_k: 1,
            max_top_k: 20,
            model_type: ModelType::Review,
            send_model_type: true,
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_model_type(mut self, model_type: ModelType) -> Self {
        self.model_type = model_type;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RecommendError::InvalidConfig(e.to_string()))
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit `path` must exist. Without one, `persona.toml` in the
    /// working directory is used if present. Environment variables (and a
    /// `.env` file) override file values. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PERSONA_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("PERSONA_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(locale) = lookup("PERSONA_LOCALE") {
            self.locale = locale.parse().map_err(RecommendError::InvalidConfig)?;
        }
        if let Some(top_k) = lookup("PERSONA_TOP_K") {
            self.top_k = parse_number("PERSONA_TOP_K", &top_k)?;
        }
        if let Some(model) = lookup("PERSONA_MODEL") {
            self.model_type = model.parse().map_err(RecommendError::InvalidConfig)?;
        }
        if let Some(timeout) = lookup("PERSONA_TIMEOUT_SECS") {
            self.timeout_secs = parse_number("PERSONA_TIMEOUT_SECS", &timeout)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let endpoint = self.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(RecommendError::InvalidConfig(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }
        if self.timeout_secs == 0 {
            return Err(RecommendError::InvalidConfig(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.min_top_k == 0 || self.min_top_k > self.max_top_k {
            return Err(RecommendError::InvalidConfig(format!(
                "top_k bounds [{}, {}] are invalid",
                self.min_top_k, self.max_top_k
            )));
        }
        if !(self.min_top_k..=self.max_top_k).contains(&self.top_k) {
            return Err(RecommendError::InvalidConfig(format!(
                "top_k {} is outside [{}, {}]",
                self.top_k, self.min_top_k, self.max_top_k
            )));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| RecommendError::InvalidConfig(format!("{key} must be a number, got '{raw}'")))
}
