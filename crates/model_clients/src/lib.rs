//! # Model Clients
//!
//! Implementations of the `contracts` service traits.
//!
//! Responsibilities:
//! - Gemini text generation (`generateContent` REST)
//! - Vertex AI Imagen generation and inpainting edits (`:predict` REST)
//! - Recording mocks for tests and offline runs
//!
//! ## Feature Flags
//!
//! - `remote` (default): Enable the hosted HTTP clients (requires reqwest)

pub mod error;
pub mod mock;

#[cfg(feature = "remote")]
mod auth;
#[cfg(feature = "remote")]
pub mod gemini;
#[cfg(feature = "remote")]
mod http;
#[cfg(feature = "remote")]
pub mod vertex;

pub use error::{ClientError, Result};
pub use mock::{MockImageClient, MockImageConfig, MockTextClient, MockTextConfig};

#[cfg(feature = "remote")]
pub use auth::AccessTokenSource;
#[cfg(feature = "remote")]
pub use gemini::GeminiTextClient;
#[cfg(feature = "remote")]
pub use vertex::VertexImageClient;
