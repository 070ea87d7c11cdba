//! Artifact store: the working image and the finished banners
//!
//! Every intermediate image (generated, first edit, second edit) overwrites
//! the same working file. Finalizing re-encodes it into the output directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use contracts::{ImageData, PathConfig};
use tracing::{debug, instrument};

use crate::error::{Result, WorkflowError};
use crate::imaging;

/// Filesystem locations of one pipeline
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    temp_path: PathBuf,
    output_dir: PathBuf,
}

impl ArtifactStore {
    /// Create the store, creating both directories if needed
    pub fn new(temp_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let temp_path = temp_path.into();
        let output_dir = output_dir.into();

        if let Some(parent) = temp_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| WorkflowError::io(parent, e))?;
        }
        fs::create_dir_all(&output_dir).map_err(|e| WorkflowError::io(&output_dir, e))?;

        Ok(Self {
            temp_path,
            output_dir,
        })
    }

    /// Store laid out per configuration, relative to the working directory
    pub fn from_config(paths: &PathConfig) -> Result<Self> {
        Self::new(paths.temp_path(), &paths.output_dir)
    }

    /// Store laid out per configuration, relative paths resolved under `base`
    pub fn from_config_under(base: &Path, paths: &PathConfig) -> Result<Self> {
        Self::new(base.join(paths.temp_path()), base.join(&paths.output_dir))
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Replace the working image (remove, then write as JPEG)
    #[instrument(name = "store_write_temp", skip(self, image), fields(bytes = image.len()))]
    pub async fn write_temp(&self, image: ImageData) -> Result<&Path> {
        let path = self.temp_path.as_path();
        let jpeg = imaging::ensure_jpeg(image).map_err(|e| imaging::codec_error(path, e))?;

        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "removed previous working image"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(WorkflowError::io(path, e)),
        }
        tokio::fs::write(path, &jpeg.bytes)
            .await
            .map_err(|e| WorkflowError::io(path, e))?;
        Ok(path)
    }

    /// Current working image
    pub async fn read_temp(&self) -> Result<ImageData> {
        let bytes = tokio::fs::read(&self.temp_path)
            .await
            .map_err(|e| WorkflowError::io(&self.temp_path, e))?;
        Ok(ImageData::jpeg(bytes))
    }

    /// Save the working image as `{output_dir}/{file_name}`, overwriting
    #[instrument(name = "store_save_output", skip(self))]
    pub async fn save_output(&self, file_name: &str) -> Result<PathBuf> {
        let current = self.read_temp().await?;
        let jpeg = imaging::decode(&current.bytes)
            .and_then(|image| imaging::to_jpeg(&image))
            .map_err(|e| imaging::codec_error(&self.temp_path, e))?;

        let output_path = self.output_dir.join(file_name);
        tokio::fs::write(&output_path, &jpeg.bytes)
            .await
            .map_err(|e| WorkflowError::io(&output_path, e))?;
        Ok(output_path)
    }
}
