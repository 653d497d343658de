use axum::extract::{Multipart, State};
use nutrilens_core::domain::food_analysis::{entities::AnalysisResult, ports::FoodAnalysisService};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::http::{
    image_upload::{ImageUpload, read_image_field},
    server::{
        api_entities::{
            api_error::{ApiError, ApiErrorResponse},
            response::Response,
        },
        app_state::AppState,
    },
};

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeFoodResponse {
    pub data: AnalysisResult,
}

#[utoipa::path(
    post,
    path = "/image",
    tag = "food-analysis",
    summary = "Analyze food from image",
    description = "Runs one stateless nutrition analysis of the uploaded photo.",
    request_body(content = ImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = AnalyzeFoodResponse),
        (status = 400, body = ApiErrorResponse),
        (status = 422, body = ApiErrorResponse),
        (status = 502, body = ApiErrorResponse),
        (status = 504, body = ApiErrorResponse)
    ),
)]
pub async fn analyze_food_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response<AnalyzeFoodResponse>, ApiError> {
    let image = read_image_field(multipart, state.args.image.max_upload_bytes).await?;

    let result = state
        .service
        .analyze(image)
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(AnalyzeFoodResponse { data: result }))
}
