use utoipa::OpenApi;

use crate::application::http::{
    food_analysis::router::FoodAnalysisApiDoc, health::HealthApiDoc, session::router::SessionApiDoc,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "NutriLens API"
    ),
    nest(
        (path = "/health", api = HealthApiDoc),
        (path = "/session", api = SessionApiDoc),
        (path = "/food-analysis", api = FoodAnalysisApiDoc),
    )
)]
pub struct ApiDoc;
