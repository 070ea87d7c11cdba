//! # Workflow
//!
//! Banner generation pipeline.
//!
//! Responsibilities:
//! - Extract and structure campaign information from a topic (and images)
//! - Synthesize the image descriptor
//! - Generate, critique and inpaint-repair the banner
//! - Persist the working image and the finished banner
//!
//! ## Usage
//!
//! ```ignore
//! use workflow::{ArtifactStore, BannerPipeline, WorkflowSettings};
//!
//! let store = ArtifactStore::from_config(&config.paths)?;
//! let pipeline = BannerPipeline::new(
//!     text_client,
//!     image_client.clone(),
//!     image_client,
//!     store,
//!     WorkflowSettings::from_config(&config),
//! );
//!
//! let outcome = pipeline.execute(&BannerRequest::new("Diwali Sale")).await?;
//! println!("{}", outcome.output_path.display());
//! ```

pub mod critique;
mod error;
pub mod imaging;
pub mod naming;
mod pipeline;
pub mod prompts;
mod store;
pub mod structured;

pub use error::{Result, WorkflowError};
pub use naming::output_file_name;
pub use pipeline::{BannerPipeline, RepairResult, WorkflowSettings};
pub use store::ArtifactStore;
pub use structured::{parse_object, strip_code_fence};
