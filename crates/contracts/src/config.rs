//! BannerConfig - Config Loader output
//!
//! Credentials, model names, working paths and quality settings for a run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete banner generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// API credentials
    pub credentials: Credentials,

    /// Vertex AI placement
    #[serde(default)]
    pub vertex: VertexConfig,

    /// Hosted model names
    #[serde(default)]
    pub models: ModelConfig,

    /// Working and output locations
    #[serde(default)]
    pub paths: PathConfig,

    /// Critique and naming settings
    #[serde(default)]
    pub quality: QualityConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// API credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Gemini API key (text model)
    pub gemini_api_key: String,

    /// Google Cloud project hosting the Vertex image models
    pub gcp_project_id: String,

    /// Pre-issued Vertex bearer token; fetched from gcloud when absent
    #[serde(default)]
    pub access_token: Option<String>,
}

// Keep secrets out of logs and `{:?}` output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("gemini_api_key", &"<redacted>")
            .field("gcp_project_id", &self.gcp_project_id)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Vertex AI placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexConfig {
    /// Region, e.g. "us-central1"
    #[serde(default = "default_location")]
    pub location: String,

    /// Override for the regional endpoint (tests, proxies)
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for VertexConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            endpoint: None,
        }
    }
}

impl VertexConfig {
    /// Base URL of the regional Vertex endpoint
    pub fn base_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}-aiplatform.googleapis.com", self.location))
    }
}

fn default_location() -> String {
    "us-central1".to_string()
}

/// Hosted model names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Text model
    #[serde(default = "default_text_model")]
    pub text: String,

    /// Image generation model
    #[serde(default = "default_image_model")]
    pub image: String,

    /// Image edit model
    #[serde(default = "default_edit_model")]
    pub edit: String,

    /// Override for the Gemini API base URL
    #[serde(default)]
    pub gemini_endpoint: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            text: default_text_model(),
            image: default_image_model(),
            edit: default_edit_model(),
            gemini_endpoint: None,
        }
    }
}

fn default_text_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_image_model() -> String {
    "imagen-3.0-generate-001".to_string()
}

fn default_edit_model() -> String {
    "imagegeneration@006".to_string()
}

/// Working and output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Directory holding the working image
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Working image file name inside `temp_dir`
    #[serde(default = "default_temp_file")]
    pub temp_file: String,

    /// Directory receiving finished banners
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            temp_file: default_temp_file(),
            output_dir: default_output_dir(),
        }
    }
}

impl PathConfig {
    /// Full path of the working image
    pub fn temp_path(&self) -> PathBuf {
        self.temp_dir.join(&self.temp_file)
    }
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("images/temp")
}

fn default_temp_file() -> String {
    "temp.jpg".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("images/output")
}

/// Critique and naming settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Categories scoring below this (out of 10) get fixes
    #[serde(default = "default_score_threshold")]
    pub score_threshold: u8,

    /// Maximum characters of the topic kept in the output file name
    #[serde(default = "default_max_filename_len")]
    pub max_filename_len: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            score_threshold: default_score_threshold(),
            max_filename_len: default_max_filename_len(),
        }
    }
}

fn default_score_threshold() -> u8 {
    8
}

fn default_max_filename_len() -> usize {
    50
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

impl BannerConfig {
    /// Configuration with default settings around the given credentials
    pub fn with_credentials(
        gemini_api_key: impl Into<String>,
        gcp_project_id: impl Into<String>,
    ) -> Self {
        Self {
            version: ConfigVersion::V1,
            credentials: Credentials {
                gemini_api_key: gemini_api_key.into(),
                gcp_project_id: gcp_project_id.into(),
                access_token: None,
            },
            vertex: VertexConfig::default(),
            models: ModelConfig::default(),
            paths: PathConfig::default(),
            quality: QualityConfig::default(),
            http: HttpConfig::default(),
        }
    }
}
