use bytes::Bytes;
use tracing::instrument;

use crate::domain::food_analysis::{
    decoder::decode_analysis,
    entities::{AnalysisRequest, AnalysisResult},
    errors::AnalysisError,
    ports::{FoodAnalysisService, ImageEncoder, LLMClient},
    schema::get_food_analysis_prompt,
};

/// Turns a food photo into a validated [`AnalysisResult`] with one model call.
///
/// Stateless apart from its collaborators, so concurrent calls never share data.
#[derive(Debug, Clone)]
pub struct FoodAnalysisClient<LLM, E> {
    llm_client: LLM,
    image_encoder: E,
    prompt: String,
}

impl<LLM, E> FoodAnalysisClient<LLM, E>
where
    LLM: LLMClient,
    E: ImageEncoder,
{
    pub fn new(llm_client: LLM, image_encoder: E) -> Self {
        Self {
            llm_client,
            image_encoder,
            prompt: get_food_analysis_prompt(),
        }
    }
}

impl<LLM, E> FoodAnalysisService for FoodAnalysisClient<LLM, E>
where
    LLM: LLMClient,
    E: ImageEncoder,
{
    #[instrument(skip_all, fields(image_bytes = image.len()))]
    async fn analyze(&self, image: Bytes) -> Result<AnalysisResult, AnalysisError> {
        // 1. Validate input
        if image.is_empty() {
            return Err(AnalysisError::Input);
        }

        // 2. Recompress before anything touches the network
        let encoded = self.image_encoder.encode(image).await.map_err(|e| {
            tracing::error!("Failed to encode image: {}", e);
            e
        })?;
        tracing::debug!("Encoded image to {} bytes of {}", encoded.data.len(), encoded.mime_type);

        // 3. Call LLM
        let request = AnalysisRequest::new(self.prompt.clone(), &encoded);
        let text = self.llm_client.generate_with_image(request).await?;

        // 4. Parse and validate payload
        let result = decode_analysis(&text).map_err(|e| {
            tracing::error!("Invalid analysis payload: {}", e);
            AnalysisError::from(e)
        })?;

        tracing::info!(
            "Analyzed \"{}\": {} kcal, {} macros, {} vitamins",
            result.name(),
            result.calories(),
            result.macros().len(),
            result.vitamins().len()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::food_analysis::{
        entities::{EncodedImage, JPEG_MIME_TYPE},
        errors::{AnalysisErrorKind, DecodingErrorKind},
        ports::{MockImageEncoder, MockLLMClient},
        schema::get_food_analysis_prompt,
        test_support::sample_payload_json,
    };

    fn jpeg_encoder() -> MockImageEncoder {
        let mut encoder = MockImageEncoder::new();
        encoder
            .expect_encode()
            .times(1)
            .returning(|_| Box::pin(async { Ok(EncodedImage::jpeg(vec![0xff, 0xd8, 0xff])) }));
        encoder
    }

    #[tokio::test]
    async fn test_analyze_sends_one_request_with_prompt_and_jpeg() {
        let mut llm = MockLLMClient::new();
        llm.expect_generate_with_image()
            .times(1)
            .withf(|request| {
                request.prompt() == get_food_analysis_prompt()
                    && request.image().mime_type == JPEG_MIME_TYPE
                    && request.image().data == "/9j/"
            })
            .returning(|_| Box::pin(async { Ok(sample_payload_json()) }));

        let client = FoodAnalysisClient::new(llm, jpeg_encoder());
        let result = client.analyze(Bytes::from_static(b"raw-image")).await.unwrap();

        assert_eq!(result.name(), "Avocado Toast");
        assert_eq!(result.calories(), 420);
    }

    #[tokio::test]
    async fn test_empty_image_is_input_error() {
        let mut encoder = MockImageEncoder::new();
        encoder.expect_encode().never();
        let mut llm = MockLLMClient::new();
        llm.expect_generate_with_image().never();

        let client = FoodAnalysisClient::new(llm, encoder);
        let error = client.analyze(Bytes::new()).await.unwrap_err();

        assert_eq!(error, AnalysisError::Input);
    }

    #[tokio::test]
    async fn test_encoding_failure_skips_network_call() {
        let mut encoder = MockImageEncoder::new();
        encoder.expect_encode().times(1).returning(|_| {
            Box::pin(async { Err(AnalysisError::Encoding("unsupported format".to_string())) })
        });
        let mut llm = MockLLMClient::new();
        llm.expect_generate_with_image().never();

        let client = FoodAnalysisClient::new(llm, encoder);
        let error = client.analyze(Bytes::from_static(b"not-an-image")).await.unwrap_err();

        assert_eq!(error.kind(), AnalysisErrorKind::Encoding);
    }

    #[tokio::test]
    async fn test_missing_calories_yields_decoding_error() {
        let mut payload: serde_json::Value = serde_json::from_str(&sample_payload_json()).unwrap();
        payload.as_object_mut().unwrap().remove("calories");
        let text = payload.to_string();

        let mut llm = MockLLMClient::new();
        llm.expect_generate_with_image()
            .times(1)
            .returning(move |_| {
                let text = text.clone();
                Box::pin(async move { Ok(text) })
            });

        let client = FoodAnalysisClient::new(llm, jpeg_encoder());
        let error = client.analyze(Bytes::from_static(b"raw-image")).await.unwrap_err();

        match error {
            AnalysisError::Decoding(decoding) => {
                assert_eq!(decoding.kind, DecodingErrorKind::KeyNotFound);
                assert_eq!(decoding.path, "calories");
            }
            other => panic!("expected decoding error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_llm_errors_propagate_unchanged() {
        let mut llm = MockLLMClient::new();
        llm.expect_generate_with_image().times(1).returning(|_| {
            Box::pin(async {
                Err(AnalysisError::MalformedResponse("no candidates".to_string()))
            })
        });

        let client = FoodAnalysisClient::new(llm, jpeg_encoder());
        let error = client.analyze(Bytes::from_static(b"raw-image")).await.unwrap_err();

        assert_eq!(error, AnalysisError::MalformedResponse("no candidates".to_string()));
    }
}
