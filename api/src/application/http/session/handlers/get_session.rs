use axum::extract::State;

use super::SessionResponse;
use crate::application::http::server::{api_entities::response::Response, app_state::AppState};

#[utoipa::path(
    get,
    path = "",
    tag = "session",
    summary = "Get session",
    description = "Returns the current image, analysis progress, result and error of the session.",
    responses(
        (status = 200, body = SessionResponse)
    ),
)]
pub async fn get_session(State(state): State<AppState>) -> Response<SessionResponse> {
    Response::OK(SessionResponse {
        data: state.session.snapshot(),
    })
}
