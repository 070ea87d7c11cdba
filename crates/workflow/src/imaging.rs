//! Image decoding and JPEG normalization

use std::io::{self, Cursor};
use std::path::Path;

use contracts::{ContractError, ImageData};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

use crate::error::{Result, WorkflowError};

const JPEG_QUALITY: u8 = 95;

pub fn decode(bytes: &[u8]) -> std::result::Result<DynamicImage, ContractError> {
    image::load_from_memory(bytes).map_err(|e| ContractError::image_codec(e.to_string()))
}

/// Encode as RGB JPEG, dropping any alpha channel
pub fn to_jpeg(image: &DynamicImage) -> std::result::Result<ImageData, ContractError> {
    let rgb = image.to_rgb8();
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| ContractError::image_codec(e.to_string()))?;
    Ok(ImageData::jpeg(buf.into_inner()))
}

/// Pass JPEG payloads through, re-encode anything else
pub fn ensure_jpeg(image: ImageData) -> std::result::Result<ImageData, ContractError> {
    if image.is_jpeg() {
        return Ok(image);
    }
    debug!(mime_type = %image.mime_type, "re-encoding image as JPEG");
    to_jpeg(&decode(&image.bytes)?)
}

/// Load a reference image for the text model
///
/// RGBA and other modes are flattened to RGB and sent as JPEG.
pub async fn load_reference_image(path: &Path) -> Result<ImageData> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| WorkflowError::io(path, e))?;
    decode(&bytes)
        .and_then(|image| to_jpeg(&image))
        .map_err(|e| codec_error(path, e))
}

/// Codec failures on a file surface as invalid-data I/O errors on that path
pub(crate) fn codec_error(path: &Path, err: ContractError) -> WorkflowError {
    WorkflowError::io(path, io::Error::new(io::ErrorKind::InvalidData, err.to_string()))
}
