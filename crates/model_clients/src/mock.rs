//! Mock model clients
//!
//! In-process stand-ins for the hosted services. Both record every request
//! they receive and support failure injection, so workflow tests can assert
//! on call order and payloads without network access.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use contracts::{
    AspectRatio, ContractError, ImageData, ImageEditRequest, ImageEditor, ImageGenerationRequest,
    ImageGenerator, ResponseFormat, TextGenerator, TextRequest,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tracing::instrument;

/// Reply used for prompts that match no rule
pub const DEFAULT_TEXT_REPLY: &str = "ok";

const RAW_EXTRACTION: &str = "0. Product: Premium Ghee 1kg Jar\n\
1. Objective: Conversion\n\
2. Festival: Diwali\n\
3. Headline: Celebrate Diwali with Pure Ghee\n\
4. Subheadline: Festive prices for a limited time\n\
5. CTA: Buy now\n\
6. Color Scheme: Red & Gold\n\
7. Promotional offer: FLAT 20% OFF\n\
8. Background color gradient: Deep red to gold\n\
9. Background theme: Diwali diyas";

const CONSOLIDATED: &str = r#"{"Product": "Premium Ghee 1kg Jar", "Objective": "Conversion", "Festival": "Diwali", "Headline": "Celebrate Diwali with Pure Ghee", "Subheadline": "N/A", "CTA": "Buy now", "Color Scheme": "Red & Gold", "Promotional offer": "FLAT 20% OFF", "Background theme": "Diwali diyas"}"#;

const CLEANED: &str = r#"{"Product": "Premium Ghee 1kg Jar", "Objective": "Conversion", "Festival": "Diwali", "Headline": "Celebrate Diwali with Pure Ghee", "CTA": "Buy now", "Color Scheme": "Red & Gold", "Promotional offer": "FLAT 20% OFF", "Background theme": "Diwali diyas"}"#;

const DESCRIPTOR: &str = r#"{"Product": "Premium Ghee 1kg Jar", "Objective": "Conversion", "Festival": "Diwali", "Headline": "Celebrate Diwali with Pure Ghee", "CTA": "Buy now", "Color Scheme": ["Red", "Gold"], "Promotional offer": "FLAT 20% OFF", "Background theme": "Diwali diyas, warm glow", "Target shopper": "Urban family, 25-45"}"#;

const CRITIQUE: &str = "1. Promotional offer: 6/10 - offer text is too small; enlarge \"FLAT 20% OFF\" near the headline.\n\
2. Grammar: 9/10\n\
3. Color palette: 7/10 - background leans orange; shift it to red and gold.\n\
4. Festival theme: 8/10";

const INSIGHTS: &str = "Product: Premium Ghee, 1kg glass jar with a golden lid and a cow logo.";

/// Prompt prefix → canned reply, checked in order; the first match wins
fn default_rules() -> Vec<(String, String)> {
    [
        ("Deep analyze", RAW_EXTRACTION),
        ("Respond concisely and summarize", CONSOLIDATED),
        ("Respond concisely by scrapping", CLEANED),
        ("Task: Fill in", DESCRIPTOR),
        ("Be direct. Quality check", CRITIQUE),
        ("Examine the set of images", INSIGHTS),
    ]
    .into_iter()
    .map(|(prefix, reply)| (prefix.to_string(), reply.to_string()))
    .collect()
}

/// Mock text client configuration
#[derive(Debug, Clone, Default)]
pub struct MockTextConfig {
    /// Prompt prefix → reply; consulted before the built-in replies
    pub replies: Vec<(String, String)>,
    /// Prompt prefixes that should fail
    pub fail_prompts: Vec<String>,
    /// Wrap JSON-format replies in a ```json fence
    pub fenced_json: bool,
}

/// Mock text generator
///
/// Clones share the recorded request log.
#[derive(Clone)]
pub struct MockTextClient {
    config: Arc<MockTextConfig>,
    rules: Arc<Vec<(String, String)>>,
    requests: Arc<Mutex<Vec<TextRequest>>>,
}

impl MockTextClient {
    pub fn new() -> Self {
        Self::with_config(MockTextConfig::default())
    }

    pub fn with_config(config: MockTextConfig) -> Self {
        let mut rules = config.replies.clone();
        rules.extend(default_rules());
        Self {
            config: Arc::new(config),
            rules: Arc::new(rules),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every request received so far, in call order
    pub fn requests(&self) -> Vec<TextRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of calls whose prompt starts with `prefix`
    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.prompt.trim_start().starts_with(prefix))
            .count()
    }

    fn reply_for(&self, prompt: &str) -> String {
        let prompt = prompt.trim_start();
        self.rules
            .iter()
            .find(|(prefix, _)| prompt.starts_with(prefix.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| DEFAULT_TEXT_REPLY.to_string())
    }

    fn should_fail(&self, prompt: &str) -> bool {
        let prompt = prompt.trim_start();
        self.config
            .fail_prompts
            .iter()
            .any(|prefix| prompt.starts_with(prefix.as_str()))
    }
}

impl Default for MockTextClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TextGenerator for MockTextClient {
    fn name(&self) -> &str {
        "mock-text"
    }

    #[instrument(
        name = "mock_text_generate",
        skip(self, request),
        fields(images = request.images.len(), format = ?request.format)
    )]
    async fn generate(&self, request: TextRequest) -> Result<String, ContractError> {
        let fail = self.should_fail(&request.prompt);
        let mut reply = self.reply_for(&request.prompt);
        let format = request.format;
        self.requests.lock().unwrap().push(request);

        if fail {
            return Err(ContractError::service_request(
                "mock-text",
                Some(500),
                "injected failure",
            ));
        }
        if self.config.fenced_json && format == ResponseFormat::Json {
            reply = format!("```json\n{reply}\n```");
        }
        Ok(reply)
    }
}

/// Mock image client configuration
#[derive(Debug, Clone)]
pub struct MockImageConfig {
    /// Fail every generation call
    pub fail_generate: bool,
    /// Fail every edit call
    pub fail_edit: bool,
    /// Succeed with zero images
    pub return_empty: bool,
    /// Long side of generated images in pixels
    pub size: u32,
}

impl Default for MockImageConfig {
    fn default() -> Self {
        Self {
            fail_generate: false,
            fail_edit: false,
            return_empty: false,
            size: 64,
        }
    }
}

#[derive(Default)]
struct ImageCalls {
    generations: Vec<ImageGenerationRequest>,
    edits: Vec<ImageEditRequest>,
}

/// Mock image generator and editor
///
/// Every call yields a solid-color JPEG whose color changes per call, so
/// successive artifacts are distinguishable on disk.
#[derive(Clone)]
pub struct MockImageClient {
    config: Arc<MockImageConfig>,
    calls: Arc<Mutex<ImageCalls>>,
}

impl MockImageClient {
    pub fn new() -> Self {
        Self::with_config(MockImageConfig::default())
    }

    pub fn with_config(config: MockImageConfig) -> Self {
        Self {
            config: Arc::new(config),
            calls: Arc::new(Mutex::new(ImageCalls::default())),
        }
    }

    pub fn generation_requests(&self) -> Vec<ImageGenerationRequest> {
        self.calls.lock().unwrap().generations.clone()
    }

    pub fn edit_requests(&self) -> Vec<ImageEditRequest> {
        self.calls.lock().unwrap().edits.clone()
    }

    pub fn generate_count(&self) -> usize {
        self.calls.lock().unwrap().generations.len()
    }

    pub fn edit_count(&self) -> usize {
        self.calls.lock().unwrap().edits.len()
    }

    fn render(
        &self,
        seq: usize,
        aspect_ratio: Option<AspectRatio>,
    ) -> Result<ImageData, ContractError> {
        let (width, height) = dimensions(self.config.size, aspect_ratio);
        let shade = (seq as u8).wrapping_mul(40);
        let pixels = RgbImage::from_pixel(width, height, Rgb([200, shade, 255 - shade]));

        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(pixels)
            .write_to(&mut buf, ImageFormat::Jpeg)
            .map_err(|e| ContractError::image_codec(e.to_string()))?;
        Ok(ImageData::jpeg(buf.into_inner()))
    }
}

impl Default for MockImageClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageGenerator for MockImageClient {
    fn name(&self) -> &str {
        "mock-image"
    }

    #[instrument(
        name = "mock_generate_images",
        skip(self, request),
        fields(aspect_ratio = ?request.aspect_ratio)
    )]
    async fn generate_images(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<Vec<ImageData>, ContractError> {
        let aspect_ratio = request.aspect_ratio;
        let seq = {
            let mut calls = self.calls.lock().unwrap();
            calls.generations.push(request);
            calls.generations.len() + calls.edits.len()
        };

        if self.config.fail_generate {
            return Err(ContractError::service_request(
                "mock-image",
                Some(500),
                "injected failure",
            ));
        }
        if self.config.return_empty {
            return Ok(Vec::new());
        }
        Ok(vec![self.render(seq, aspect_ratio)?])
    }
}

impl ImageEditor for MockImageClient {
    fn name(&self) -> &str {
        "mock-image"
    }

    #[instrument(
        name = "mock_edit_image",
        skip(self, request),
        fields(base_bytes = request.base_image.len())
    )]
    async fn edit_image(&self, request: ImageEditRequest) -> Result<Vec<ImageData>, ContractError> {
        let base = image::load_from_memory(&request.base_image.bytes)
            .map_err(|e| ContractError::image_codec(format!("base image: {e}")));
        let seq = {
            let mut calls = self.calls.lock().unwrap();
            calls.edits.push(request);
            calls.generations.len() + calls.edits.len()
        };

        if self.config.fail_edit {
            return Err(ContractError::service_request(
                "mock-image",
                Some(500),
                "injected failure",
            ));
        }
        if self.config.return_empty {
            return Ok(Vec::new());
        }

        // Keep the base image's shape, like a real inpainting edit
        let base = base?;
        let ratio = closest_ratio(base.width(), base.height());
        Ok(vec![self.render(seq, ratio)?])
    }
}

fn dimensions(size: u32, aspect_ratio: Option<AspectRatio>) -> (u32, u32) {
    let (w, h) = match aspect_ratio.unwrap_or(AspectRatio::Square) {
        AspectRatio::Square => (1, 1),
        AspectRatio::Portrait9x16 => (9, 16),
        AspectRatio::Landscape16x9 => (16, 9),
        AspectRatio::Landscape4x3 => (4, 3),
        AspectRatio::Portrait3x4 => (3, 4),
    };
    let size = size.max(16);
    if w >= h {
        (size, (size * h / w).max(1))
    } else {
        ((size * w / h).max(1), size)
    }
}

fn closest_ratio(width: u32, height: u32) -> Option<AspectRatio> {
    AspectRatio::ALL.iter().copied().find(|ratio| {
        let (w, h) = dimensions(width.max(height), Some(*ratio));
        w == width && h == height
    })
}
