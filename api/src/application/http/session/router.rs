use super::handlers::{
    analyze_session::{__path_analyze_session, analyze_session},
    clear_session_image::{__path_clear_session_image, clear_session_image},
    get_session::{__path_get_session, get_session},
    set_session_image::{__path_set_session_image, set_session_image},
};
use crate::application::http::server::app_state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(get_session, set_session_image, clear_session_image, analyze_session))]
pub struct SessionApiDoc;

pub fn session_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{}/session", state.args.server.root_path),
            get(get_session),
        )
        .route(
            &format!("{}/session/image", state.args.server.root_path),
            put(set_session_image).delete(clear_session_image),
        )
        .route(
            &format!("{}/session/analyze", state.args.server.root_path),
            post(analyze_session),
        )
}
