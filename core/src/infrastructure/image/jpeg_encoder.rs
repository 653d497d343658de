use bytes::Bytes;
use image::{ExtendedColorType, codecs::jpeg::JpegEncoder, imageops::FilterType};
use tokio::task;

use crate::domain::{
    common::ImageConfig,
    food_analysis::{entities::EncodedImage, errors::AnalysisError, ports::ImageEncoder},
};

/// Decodes any supported image format and re-encodes it as a baseline JPEG.
#[derive(Debug, Clone, Copy)]
pub struct JpegImageEncoder {
    quality: u8,
    max_dimension: u32,
}

impl JpegImageEncoder {
    pub fn new(config: &ImageConfig) -> Self {
        Self {
            quality: config.jpeg_quality.clamp(1, 100),
            max_dimension: match config.max_dimension {
                0 => u32::MAX,
                dimension => dimension,
            },
        }
    }
}

impl ImageEncoder for JpegImageEncoder {
    async fn encode(&self, image: Bytes) -> Result<EncodedImage, AnalysisError> {
        let (quality, max_dimension) = (self.quality, self.max_dimension);

        let data = task::spawn_blocking(move || recompress_jpeg(&image, quality, max_dimension))
            .await
            .map_err(|e| AnalysisError::Encoding(format!("encoder task failed: {}", e)))??;

        Ok(EncodedImage::jpeg(data))
    }
}

/// Recompresses `bytes` to JPEG at `quality`, shrinking the longest side to
/// `max_dimension` when needed. Aspect ratio is preserved.
pub fn recompress_jpeg(
    bytes: &[u8],
    quality: u8,
    max_dimension: u32,
) -> Result<Vec<u8>, AnalysisError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AnalysisError::Encoding(format!("unreadable image: {}", e)))?;

    let img = if img.width() > max_dimension || img.height() > max_dimension {
        tracing::debug!(
            "Downscaling {}x{} image to fit {}px",
            img.width(),
            img.height(),
            max_dimension
        );
        img.resize(max_dimension, max_dimension, FilterType::Triangle)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode(&rgb, rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| AnalysisError::Encoding(format!("JPEG encoding failed: {}", e)))?;

    Ok(buf)
}
