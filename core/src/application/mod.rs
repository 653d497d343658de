use crate::{
    domain::{
        common::NutrilensConfig,
        food_analysis::{errors::AnalysisError, services::FoodAnalysisClient, session::AnalysisSession},
    },
    infrastructure::{image::jpeg_encoder::JpegImageEncoder, llm::gemini_client::GeminiLLMClient},
};

pub type NutrilensService = FoodAnalysisClient<GeminiLLMClient, JpegImageEncoder>;

pub type NutrilensSession = AnalysisSession<NutrilensService>;

pub fn create_service(config: NutrilensConfig) -> Result<NutrilensService, AnalysisError> {
    let llm_client = GeminiLLMClient::new(&config.llm)?;
    let image_encoder = JpegImageEncoder::new(&config.image);

    tracing::info!(
        "Food analysis ready: model {}, JPEG quality {}, max dimension {}px",
        config.llm.gemini_model,
        config.image.jpeg_quality,
        config.image.max_dimension
    );

    Ok(FoodAnalysisClient::new(llm_client, image_encoder))
}

pub fn create_session(config: NutrilensConfig) -> Result<NutrilensSession, AnalysisError> {
    Ok(AnalysisSession::new(create_service(config)?))
}
