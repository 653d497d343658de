use axum::extract::State;

use super::SessionResponse;
use crate::application::http::server::{api_entities::response::Response, app_state::AppState};

/// Failures land in the snapshot's `error`, not in the HTTP status.
#[utoipa::path(
    post,
    path = "/analyze",
    tag = "session",
    summary = "Analyze session image",
    description = "Analyzes the current session image and returns the snapshot once the analysis settles. \
        If an analysis is already running, returns the current snapshot immediately.",
    responses(
        (status = 200, body = SessionResponse)
    ),
)]
pub async fn analyze_session(State(state): State<AppState>) -> Response<SessionResponse> {
    Response::OK(SessionResponse {
        data: state.session.analyze().await,
    })
}
