//! Encoded image payloads exchanged with the hosted models.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// MIME type used for JPEG payloads
pub const MIME_JPEG: &str = "image/jpeg";
/// MIME type used for PNG payloads
pub const MIME_PNG: &str = "image/png";

/// Encoded image bytes plus their MIME type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Encoded bytes (JPEG, PNG, ...)
    pub bytes: Bytes,
    /// MIME type, e.g. `image/jpeg`
    pub mime_type: String,
}

impl ImageData {
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// JPEG payload
    pub fn jpeg(bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes, MIME_JPEG)
    }

    /// PNG payload
    pub fn png(bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes, MIME_PNG)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_jpeg(&self) -> bool {
        self.mime_type.eq_ignore_ascii_case(MIME_JPEG)
            || self.mime_type.eq_ignore_ascii_case("image/jpg")
    }
}
