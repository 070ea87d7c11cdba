//! Service traits - the hosted models the workflow drives
//!
//! Defines the abstract interface for text generation, image generation and
//! image editing. Real HTTP clients and mocks implement the same traits.

use serde::{Deserialize, Serialize};

use crate::{AspectRatio, ContractError, ImageData};

/// Shape the caller expects the text reply in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free text
    #[default]
    Text,
    /// A single JSON object
    Json,
}

/// Text generation request: a prompt, optionally with images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRequest {
    pub prompt: String,
    pub images: Vec<ImageData>,
    pub format: ResponseFormat,
}

impl TextRequest {
    /// Plain text prompt
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            images: Vec::new(),
            format: ResponseFormat::Text,
        }
    }

    /// Prompt whose reply must be a JSON object
    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            format: ResponseFormat::Json,
            ..Self::text(prompt)
        }
    }

    pub fn with_images(mut self, images: Vec<ImageData>) -> Self {
        self.images = images;
        self
    }
}

/// Image generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    /// Sent to the service only when present
    pub aspect_ratio: Option<AspectRatio>,
    pub sample_count: u32,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>, aspect_ratio: Option<AspectRatio>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio,
            sample_count: 1,
        }
    }
}

/// Edit operation applied to the base image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditMode {
    /// Add content into the masked region
    #[default]
    #[serde(rename = "inpainting-insert")]
    InpaintingInsert,
}

impl EditMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditMode::InpaintingInsert => "inpainting-insert",
        }
    }
}

/// Region of the base image the edit may touch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskMode {
    /// Everything except the detected foreground subject
    #[default]
    Background,
}

impl MaskMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaskMode::Background => "background",
        }
    }
}

/// Image edit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEditRequest {
    pub base_image: ImageData,
    pub prompt: String,
    pub edit_mode: EditMode,
    pub mask_mode: MaskMode,
    pub sample_count: u32,
}

impl ImageEditRequest {
    /// Inpainting-insert edit restricted to the background
    pub fn inpaint_background(base_image: ImageData, prompt: impl Into<String>) -> Self {
        Self {
            base_image,
            prompt: prompt.into(),
            edit_mode: EditMode::InpaintingInsert,
            mask_mode: MaskMode::Background,
            sample_count: 1,
        }
    }
}

/// Text generation service
#[trait_variant::make(TextGenerator: Send)]
pub trait LocalTextGenerator {
    /// Service name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Generate text for the prompt (and attached images)
    ///
    /// # Errors
    /// Transport failure, non-success status, or a reply without text
    async fn generate(&self, request: TextRequest) -> Result<String, ContractError>;
}

/// Image generation service
#[trait_variant::make(ImageGenerator: Send)]
pub trait LocalImageGenerator {
    /// Service name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Generate images for the prompt; at least one on success
    async fn generate_images(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<Vec<ImageData>, ContractError>;
}

/// Image edit service
#[trait_variant::make(ImageEditor: Send)]
pub trait LocalImageEditor {
    /// Service name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Edit the base image; at least one image on success
    async fn edit_image(&self, request: ImageEditRequest) -> Result<Vec<ImageData>, ContractError>;
}
