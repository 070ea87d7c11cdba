//! Vertex AI bearer tokens
//!
//! Either a token supplied up front, or one fetched once from the gcloud CLI
//! and cached for the rest of the process.

use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use contracts::Credentials;

use crate::error::{ClientError, Result};

/// Where Vertex access tokens come from
pub enum AccessTokenSource {
    /// Pre-issued token
    Static(String),
    /// `gcloud auth print-access-token`, cached after the first call
    Gcloud { cached: Mutex<Option<String>> },
}

impl AccessTokenSource {
    /// Static token when configured, gcloud otherwise
    pub fn from_credentials(credentials: &Credentials) -> Self {
        match &credentials.access_token {
            Some(token) => Self::Static(token.clone()),
            None => Self::Gcloud {
                cached: Mutex::new(None),
            },
        }
    }

    /// Current bearer token
    #[instrument(name = "vertex_access_token", skip(self))]
    pub async fn token(&self) -> Result<String> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::Gcloud { cached } => {
                let mut guard = cached.lock().await;
                if let Some(token) = guard.as_ref() {
                    return Ok(token.clone());
                }
                let token = fetch_gcloud_token().await?;
                *guard = Some(token.clone());
                Ok(token)
            }
        }
    }
}

async fn fetch_gcloud_token() -> Result<String> {
    debug!("requesting access token from gcloud");
    let output = Command::new("gcloud")
        .args(["auth", "print-access-token"])
        .output()
        .await
        .map_err(|e| ClientError::Auth {
            message: format!("failed to run gcloud: {e}"),
        })?;

    if !output.status.success() {
        return Err(ClientError::Auth {
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(ClientError::Auth {
            message: "gcloud printed an empty token".into(),
        });
    }
    Ok(token)
}
