use serde_json::json;

const PROMPT_INSTRUCTIONS: &str = "\
You are a nutrition expert. Analyze the food in this photo and estimate its nutritional content \
for the portion shown.

Respond with ONLY a JSON object (no markdown, no code fences, no commentary) that follows this \
JSON schema exactly:";

const PROMPT_FIELD_RULES: &str = "\
Field rules:
- name: short label for the dish or food item.
- description: one or two sentences describing the food and portion.
- calories: total estimated calories as a whole number (kcal).
- macros: protein, carbohydrates and fat, in that order. amount is a whole number, unit is \
usually \"g\", percentage is the whole-number percent of a 2000 kcal daily value, icon is a \
short symbol name and color is a hex color such as \"#4CAF50\".
- vitamins: the most significant vitamins and minerals. percentage is the whole-number percent \
of daily value, benefit is a short health benefit and color is a hex color.
- ingredients: visible or likely ingredients, most prominent first.
- allergies: common allergens present (for example gluten, dairy, egg, nuts, soy, shellfish). \
Use an empty array when none apply.";

/// Returns the JSON schema the model must follow for food analysis responses
pub fn get_food_analysis_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "description": { "type": "string" },
            "calories": { "type": "integer", "minimum": 0 },
            "macros": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "amount": { "type": "integer" },
                        "unit": { "type": "string" },
                        "percentage": { "type": "integer" },
                        "icon": { "type": "string" },
                        "color": { "type": "string" }
                    },
                    "required": ["name", "amount", "unit", "percentage", "icon", "color"]
                }
            },
            "vitamins": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "percentage": { "type": "integer" },
                        "benefit": { "type": "string" },
                        "color": { "type": "string" }
                    },
                    "required": ["name", "percentage", "benefit", "color"]
                }
            },
            "ingredients": {
                "type": "array",
                "items": { "type": "string" }
            },
            "allergies": {
                "type": "array",
                "items": { "type": "string" }
            }
        },
        "required": [
            "name", "description", "calories", "macros", "vitamins", "ingredients", "allergies"
        ]
    })
}

/// Builds the fixed analysis prompt. The output is identical on every call.
pub fn get_food_analysis_prompt() -> String {
    format!(
        "{}\n\n{:#}\n\n{}",
        PROMPT_INSTRUCTIONS,
        get_food_analysis_schema(),
        PROMPT_FIELD_RULES
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(get_food_analysis_prompt(), get_food_analysis_prompt());
    }

    #[test]
    fn test_prompt_embeds_every_required_field() {
        let prompt = get_food_analysis_prompt();
        let schema = get_food_analysis_schema();

        for field in schema["required"].as_array().unwrap() {
            let field = field.as_str().unwrap();
            assert!(prompt.contains(&format!("\"{}\"", field)), "missing {}", field);
        }
    }
}
