use std::future::Future;

use bytes::Bytes;

use crate::domain::food_analysis::{
    entities::{AnalysisRequest, AnalysisResult, EncodedImage},
    errors::AnalysisError,
};

/// LLM Client trait for calling multimodal models
#[cfg_attr(test, mockall::automock)]
pub trait LLMClient: Send + Sync {
    /// Sends one request and returns the text payload of the first candidate,
    /// after the transport and response envelope have been validated.
    fn generate_with_image(
        &self,
        request: AnalysisRequest,
    ) -> impl Future<Output = Result<String, AnalysisError>> + Send;
}

/// Recompresses raw image bytes into a transport-ready format
#[cfg_attr(test, mockall::automock)]
pub trait ImageEncoder: Send + Sync {
    fn encode(&self, image: Bytes)
    -> impl Future<Output = Result<EncodedImage, AnalysisError>> + Send;
}

/// Service trait for food analysis business logic
#[cfg_attr(test, mockall::automock)]
pub trait FoodAnalysisService: Send + Sync {
    /// Runs exactly one analysis of `image`: recompress, send, validate, decode.
    fn analyze(
        &self,
        image: Bytes,
    ) -> impl Future<Output = Result<AnalysisResult, AnalysisError>> + Send;
}
