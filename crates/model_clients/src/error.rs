//! Model client error types

use contracts::ContractError;
use thiserror::Error;

/// Model client specific error
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP client could not be constructed
    #[error("failed to set up {service} client: {message}")]
    Setup { service: String, message: String },

    /// Request never produced a response (connect, timeout, TLS)
    #[error("{service} transport error: {message}")]
    Transport { service: String, message: String },

    /// Non-success HTTP status
    #[error("{service} returned status {status}: {message}")]
    Status {
        service: String,
        status: u16,
        message: String,
    },

    /// Response body did not match the expected wire format
    #[error("failed to decode {service} response: {message}")]
    Decode { service: String, message: String },

    /// Response decoded but carried no text / images
    #[error("{service} returned no content")]
    Empty { service: String },

    /// Vertex bearer token could not be obtained
    #[error("access token unavailable: {message}")]
    Auth { message: String },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl ClientError {
    /// Create transport error
    pub fn transport(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create decode error
    pub fn decode(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create empty response error
    pub fn empty(service: impl Into<String>) -> Self {
        Self::Empty {
            service: service.into(),
        }
    }
}

impl From<ClientError> for ContractError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status {
                service,
                status,
                message,
            } => ContractError::service_request(service, Some(status), message),
            ClientError::Empty { service } => ContractError::empty_response(service),
            ClientError::Contract(inner) => inner,
            ClientError::Setup { ref service, .. }
            | ClientError::Transport { ref service, .. }
            | ClientError::Decode { ref service, .. } => {
                ContractError::service_request(service.clone(), None, err.to_string())
            }
            ClientError::Auth { .. } => {
                ContractError::service_request("vertex", None, err.to_string())
            }
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, ClientError>;
