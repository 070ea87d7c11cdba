//! BannerRequest - the caller's input for one banner run

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{AspectRatio, ContractError};

/// One banner request: created once, consumed by a single pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerRequest {
    /// Free-text topic, e.g. "Diwali Sale on Premium Ghee 1kg Jar"
    pub topic: String,

    /// Reference images (product shots, logos)
    #[serde(default)]
    pub images: Vec<PathBuf>,

    /// Frame shape for the generated image; service default when absent
    #[serde(default)]
    pub aspect_ratio: Option<AspectRatio>,

    /// Run a second critique + repair pass
    #[serde(default)]
    pub quality_check: bool,
}

impl BannerRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Default::default()
        }
    }

    pub fn with_images<I, P>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }

    pub fn with_quality_check(mut self, enabled: bool) -> Self {
        self.quality_check = enabled;
        self
    }

    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    /// Reject requests no stage could work with
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.topic.trim().is_empty() {
            return Err(ContractError::Other("banner topic cannot be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let req = BannerRequest::new("Summer Sale");
        assert!(!req.has_images());
        assert!(req.aspect_ratio.is_none());
        assert!(!req.quality_check);
    }

    #[test]
    fn test_builder_chain() {
        let req = BannerRequest::new("Summer Sale")
            .with_images(["a.png", "b.jpg"])
            .with_aspect_ratio(AspectRatio::Landscape16x9)
            .with_quality_check(true);
        assert_eq!(req.images.len(), 2);
        assert_eq!(req.aspect_ratio, Some(AspectRatio::Landscape16x9));
        assert!(req.quality_check);
    }

    #[test]
    fn test_blank_topic_rejected() {
        assert!(BannerRequest::new("   ").validate().is_err());
        assert!(BannerRequest::new("Ghee").validate().is_ok());
    }
}
