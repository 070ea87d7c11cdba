//! # Contracts
//!
//! Frozen interface contracts shared by every banner crate: request and
//! artifact types, the service traits the workflow drives, the configuration
//! schema and the unified error type.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Stage Model
//! - A run moves through `Extracting → Synthesizing → Generating → Critiquing → Repairing → Done`
//! - Each stage owns exactly one artifact slot; later runs overwrite, never append

mod artifacts;
mod aspect_ratio;
mod config;
mod error;
mod media;
mod request;
mod services;

pub use artifacts::*;
pub use aspect_ratio::AspectRatio;
pub use config::*;
pub use error::*;
pub use media::*;
pub use request::BannerRequest;
pub use services::*;
