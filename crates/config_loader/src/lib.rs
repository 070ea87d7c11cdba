//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Apply environment overrides for credentials and region
//! - Validate configuration legality
//! - Generate `BannerConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("config.toml")).unwrap();
//! println!("Region: {}", config.vertex.location);
//! ```

mod parser;
mod validator;

pub use contracts::BannerConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;
use tracing::debug;

/// Gemini API key override
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
/// Google Cloud project override
pub const ENV_GCP_PROJECT_ID: &str = "GCP_PROJECT_ID";
/// Vertex region override
pub const ENV_GCP_LOCATION: &str = "GCP_LOCATION";
/// Vertex bearer token override
pub const ENV_VERTEX_ACCESS_TOKEN: &str = "VERTEX_ACCESS_TOKEN";

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    /// Environment variables override credentials before validation.
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<BannerConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str_with_env(&content, format, |key| std::env::var(key).ok())
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<BannerConfig, ContractError> {
        Self::load_from_str_with_env(content, format, |_| None)
    }

    /// Load configuration from string, resolving overrides through `lookup`
    pub fn load_from_str_with_env<F>(
        content: &str,
        format: ConfigFormat,
        lookup: F,
    ) -> Result<BannerConfig, ContractError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = parser::parse(content, format)?;
        Self::apply_overrides(&mut config, lookup);
        validator::validate(&config)?;
        Ok(config)
    }

    /// Validate an in-memory configuration (e.g. after CLI overrides)
    pub fn validate(config: &BannerConfig) -> Result<(), ContractError> {
        validator::validate(config)
    }

    /// Serialize BannerConfig to TOML string
    pub fn to_toml(config: &BannerConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize BannerConfig to JSON string
    pub fn to_json(config: &BannerConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn apply_overrides<F>(config: &mut BannerConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_GEMINI_API_KEY) {
            debug!(var = ENV_GEMINI_API_KEY, "overriding credential from environment");
            config.credentials.gemini_api_key = key;
        }
        if let Some(project) = non_empty(ENV_GCP_PROJECT_ID) {
            debug!(var = ENV_GCP_PROJECT_ID, "overriding credential from environment");
            config.credentials.gcp_project_id = project;
        }
        if let Some(location) = non_empty(ENV_GCP_LOCATION) {
            debug!(var = ENV_GCP_LOCATION, location = %location, "overriding region from environment");
            config.vertex.location = location;
        }
        if let Some(token) = non_empty(ENV_VERTEX_ACCESS_TOKEN) {
            debug!(var = ENV_VERTEX_ACCESS_TOKEN, "overriding credential from environment");
            config.credentials.access_token = Some(token);
        }
    }
}
