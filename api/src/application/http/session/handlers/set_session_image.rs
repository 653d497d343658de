use axum::extract::{Multipart, State};

use super::SessionResponse;
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

#[utoipa::path(
    put,
    path = "/image",
    tag = "session",
    summary = "Set session image",
    description = "Replaces the session image. Any previous result or running analysis is discarded.",
    request_body(content = ImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = SessionResponse),
        (status = 400, body = ApiErrorResponse)
    ),
)]
pub async fn set_session_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response<SessionResponse>, ApiError> {
    let image = read_image_field(multipart, state.args.image.max_upload_bytes).await?;
    tracing::debug!("Session image set ({} bytes)", image.len());

    let snapshot = state.session.set_image(Some(image)).await;

    Ok(Response::OK(SessionResponse { data: snapshot }))
}
