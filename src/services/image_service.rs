use std::path::{Path, PathBuf};

use image::ImageFormat;
use uuid::Uuid;

use crate::config;
use crate::error::ApiError;

/// Stores validated recipe images under the configured media root
pub struct ImageService {
    media_root: PathBuf,
}

impl ImageService {
    pub fn from_config() -> Self {
        Self {
            media_root: PathBuf::from(&config::config().media.root),
        }
    }

    pub fn with_root(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }

    /// Check that the payload decodes as a raster image and return the file
    /// extension to store it under. Anything that does not decode (plain
    /// strings included) is a validation failure.
    pub fn validate(bytes: &[u8]) -> Result<&'static str, ApiError> {
        let format = image::guess_format(bytes)
            .map_err(|_| ApiError::field_error("image", "Upload a valid image"))?;

        // Header sniffing is not enough; the payload must actually decode
        image::load_from_memory(bytes)
            .map_err(|_| ApiError::field_error("image", "Upload a valid image"))?;

        Ok(extension_for(format))
    }

    /// Write image bytes to a fresh uuid-named file, returning the path
    /// relative to the media root.
    pub async fn store(&self, bytes: &[u8], extension: &str) -> Result<String, ApiError> {
        let relative = format!("recipe/{}.{}", Uuid::new_v4(), extension);
        let path = self.media_root.join(&relative);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                tracing::error!("Failed to create media directory {:?}: {}", parent, e);
                ApiError::internal_server_error("Failed to store image")
            })?;
        }

        tokio::fs::write(&path, bytes).await.map_err(|e| {
            tracing::error!("Failed to write image {:?}: {}", path, e);
            ApiError::internal_server_error("Failed to store image")
        })?;

        Ok(relative)
    }

    /// Best-effort removal of a superseded image file
    pub async fn remove(&self, relative: &str) {
        let path = self.media_root.join(relative);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!("Failed to remove superseded image {:?}: {}", path, e);
        }
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }
}

fn extension_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpg",
        ImageFormat::Png => "png",
        other => other.extensions_str().first().copied().unwrap_or("img"),
    }
}
