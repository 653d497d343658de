pub mod analyze_session;
pub mod clear_session_image;
pub mod get_session;
pub mod set_session_image;

use nutrilens_core::domain::food_analysis::session::SessionSnapshot;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub data: SessionSnapshot,
}
