use axum::extract::State;

use super::SessionResponse;
use crate::application::http::server::{api_entities::response::Response, app_state::AppState};

#[utoipa::path(
    delete,
    path = "/image",
    tag = "session",
    summary = "Clear session image",
    responses(
        (status = 200, body = SessionResponse)
    ),
)]
pub async fn clear_session_image(State(state): State<AppState>) -> Response<SessionResponse> {
    Response::OK(SessionResponse {
        data: state.session.set_image(None).await,
    })
}
