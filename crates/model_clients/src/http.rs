//! Shared JSON-over-HTTP plumbing for the hosted model clients

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Build a reqwest client with the configured per-request timeout
pub(crate) fn build_client(service: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ClientError::Setup {
            service: service.to_string(),
            message: e.to_string(),
        })
}

/// Header used to authenticate a request
#[derive(Clone, Copy)]
pub(crate) enum RequestAuth<'a> {
    /// `x-goog-api-key`
    ApiKey(&'a str),
    /// `Authorization: Bearer`
    Bearer(&'a str),
}

const API_KEY_HEADER: &str = "x-goog-api-key";

/// POST `body` as JSON and decode a JSON reply
///
/// Credentials travel in headers only; reqwest errors are stripped of
/// their URL before they are wrapped.
pub(crate) async fn post_json<B, R>(
    client: &Client,
    service: &str,
    url: &str,
    auth: RequestAuth<'_>,
    body: &B,
) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let request = client.post(url).json(body);
    let request = match auth {
        RequestAuth::ApiKey(key) => request.header(API_KEY_HEADER, key),
        RequestAuth::Bearer(token) => request.bearer_auth(token),
    };

    let response = request
        .send()
        .await
        .map_err(|e| ClientError::transport(service, e.without_url().to_string()))?;

    let status = response.status();
    debug!(service, status = status.as_u16(), "response received");

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error body".to_string());
        return Err(map_http_error(service, status, &body));
    }

    response
        .json::<R>()
        .await
        .map_err(|e| ClientError::decode(service, e.without_url().to_string()))
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Turn a Google API error envelope into a readable status error
pub(crate) fn map_http_error(service: &str, status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string());

    ClientError::Status {
        service: service.to_string(),
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_http_error_google_envelope() {
        let body = r#"{"error": {"code": 403, "message": "Permission denied", "status": "PERMISSION_DENIED"}}"#;
        let err = map_http_error("vertex", StatusCode::FORBIDDEN, body);
        match err {
            ClientError::Status {
                status, message, ..
            } => {
                assert_eq!(status, 403);
                assert_eq!(message, "PERMISSION_DENIED: Permission denied");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_map_http_error_plain_body() {
        let err = map_http_error("gemini", StatusCode::BAD_GATEWAY, "upstream down");
        assert!(err.to_string().contains("upstream down"));
        assert!(err.to_string().contains("502"));
    }
}
