//! Layered error definitions
//!
//! Categorized by source: config / service / response / image / io

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Service Errors =====
    /// Hosted model call failed (transport or non-success status)
    #[error("{service} request failed{}: {message}", status_suffix(.status))]
    ServiceRequest {
        service: String,
        status: Option<u16>,
        message: String,
    },

    /// Hosted model answered without usable content
    #[error("{service} returned an empty response")]
    EmptyResponse { service: String },

    // ===== Response Errors =====
    /// Model output did not have the shape the stage asked for
    #[error("malformed response in stage '{stage}': {message}")]
    MalformedResponse { stage: String, message: String },

    // ===== Image Errors =====
    /// Image decode/encode failure
    #[error("image codec error: {message}")]
    ImageCodec { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create service request error
    pub fn service_request(
        service: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::ServiceRequest {
            service: service.into(),
            status,
            message: message.into(),
        }
    }

    /// Create empty response error
    pub fn empty_response(service: impl Into<String>) -> Self {
        Self::EmptyResponse {
            service: service.into(),
        }
    }

    /// Create malformed response error
    pub fn malformed(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create image codec error
    pub fn image_codec(message: impl Into<String>) -> Self {
        Self::ImageCodec {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_request_display_with_status() {
        let err = ContractError::service_request("gemini", Some(429), "RESOURCE_EXHAUSTED");
        assert_eq!(
            err.to_string(),
            "gemini request failed (status 429): RESOURCE_EXHAUSTED"
        );
    }

    #[test]
    fn test_service_request_display_without_status() {
        let err = ContractError::service_request("vertex", None, "connection refused");
        assert_eq!(err.to_string(), "vertex request failed: connection refused");
    }

    #[test]
    fn test_malformed_names_stage() {
        let err = ContractError::malformed("synthesize", "expected a JSON object");
        assert!(err.to_string().contains("'synthesize'"));
    }
}
