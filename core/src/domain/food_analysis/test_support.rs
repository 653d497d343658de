use serde_json::json;

use crate::domain::food_analysis::{
    decoder::{AnalysisPayload, MacroPayload, VitaminPayload, decode_analysis},
    entities::AnalysisResult,
};

pub fn sample_payload_json() -> String {
    json!({
        "name": "Avocado Toast",
        "description": "Sourdough toast topped with smashed avocado and egg",
        "calories": 420,
        "macros": [
            { "name": "Protein", "amount": 14, "unit": "g", "percentage": 28, "icon": "bolt.fill", "color": "#4CAF50" },
            { "name": "Carbs", "amount": 38, "unit": "g", "percentage": 14, "icon": "leaf.fill", "color": "#2196F3" },
            { "name": "Fat", "amount": 24, "unit": "g", "percentage": 31, "icon": "drop.fill", "color": "#FF9800" }
        ],
        "vitamins": [
            { "name": "Vitamin K", "percentage": 25, "benefit": "Helps blood clotting", "color": "#8BC34A" },
            { "name": "Folate", "percentage": 30, "benefit": "Supports cell growth", "color": "#009688" }
        ],
        "ingredients": ["sourdough bread", "avocado", "egg", "chili flakes"],
        "allergies": ["gluten", "egg"]
    })
    .to_string()
}

pub fn sample_payload() -> AnalysisPayload {
    let macro_payload = |name: &str, amount, percentage, icon: &str, color: &str| MacroPayload {
        name: name.to_string(),
        amount,
        unit: "g".to_string(),
        percentage,
        icon: icon.to_string(),
        color: color.to_string(),
    };
    let vitamin_payload = |name: &str, percentage, benefit: &str, color: &str| VitaminPayload {
        name: name.to_string(),
        percentage,
        benefit: benefit.to_string(),
        color: color.to_string(),
    };

    AnalysisPayload {
        name: "Avocado Toast".to_string(),
        description: "Sourdough toast topped with smashed avocado and egg".to_string(),
        calories: 420,
        macros: vec![
            macro_payload("Protein", 14, 28, "bolt.fill", "#4CAF50"),
            macro_payload("Carbs", 38, 14, "leaf.fill", "#2196F3"),
            macro_payload("Fat", 24, 31, "drop.fill", "#FF9800"),
        ],
        vitamins: vec![
            vitamin_payload("Vitamin K", 25, "Helps blood clotting", "#8BC34A"),
            vitamin_payload("Folate", 30, "Supports cell growth", "#009688"),
        ],
        ingredients: vec![
            "sourdough bread".to_string(),
            "avocado".to_string(),
            "egg".to_string(),
            "chili flakes".to_string(),
        ],
        allergies: vec!["gluten".to_string(), "egg".to_string()],
    }
}

pub fn sample_result() -> AnalysisResult {
    decode_analysis(&sample_payload_json()).expect("sample payload decodes")
}
