use base64::{Engine as _, engine::general_purpose};

pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// Binary image ready for transport, as produced by an image encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl EncodedImage {
    pub fn jpeg(data: Vec<u8>) -> Self {
        Self {
            mime_type: JPEG_MIME_TYPE.to_string(),
            data,
        }
    }
}

/// Base64 image embedded directly in the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

/// A single analysis request: the fixed prompt followed by exactly one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    prompt: String,
    image: InlineImage,
}

impl AnalysisRequest {
    pub fn new(prompt: impl Into<String>, image: &EncodedImage) -> Self {
        Self {
            prompt: prompt.into(),
            image: InlineImage {
                mime_type: image.mime_type.clone(),
                data: general_purpose::STANDARD.encode(&image.data),
            },
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn image(&self) -> &InlineImage {
        &self.image
    }
}
