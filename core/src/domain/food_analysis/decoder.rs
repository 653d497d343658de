use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::food_analysis::{
    entities::AnalysisResult,
    errors::{DecodingError, DecodingErrorKind},
};

/// Analysis exactly as the model emits it. Carries no identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPayload {
    pub name: String,
    pub description: String,
    pub calories: u32,
    pub macros: Vec<MacroPayload>,
    pub vitamins: Vec<VitaminPayload>,
    pub ingredients: Vec<String>,
    pub allergies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacroPayload {
    pub name: String,
    pub amount: i32,
    pub unit: String,
    pub percentage: i32,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VitaminPayload {
    pub name: String,
    pub percentage: i32,
    pub benefit: String,
    pub color: String,
}

/// Parses the model's text payload and stamps fresh identifiers on the result.
pub fn decode_analysis(text: &str) -> Result<AnalysisResult, DecodingError> {
    parse_payload(text).map(AnalysisResult::from)
}

/// Strictly parses the model's text payload into its wire shape.
pub fn parse_payload(text: &str) -> Result<AnalysisPayload, DecodingError> {
    let body = strip_code_fence(text);
    let value: Value = serde_json::from_str(body).map_err(|e| {
        tracing::error!("Model payload is not valid JSON: {}", e);
        DecodingError::new(DecodingErrorKind::DataCorrupted, "", e.to_string())
    })?;

    let root = Node::root(&value);

    Ok(AnalysisPayload {
        name: root.required("name")?,
        description: root.required("description")?,
        calories: root.required("calories")?,
        macros: root
            .items("macros")?
            .iter()
            .map(|node| {
                Ok(MacroPayload {
                    name: node.required("name")?,
                    amount: node.required("amount")?,
                    unit: node.required("unit")?,
                    percentage: node.required("percentage")?,
                    icon: node.required("icon")?,
                    color: node.required("color")?,
                })
            })
            .collect::<Result<_, DecodingError>>()?,
        vitamins: root
            .items("vitamins")?
            .iter()
            .map(|node| {
                Ok(VitaminPayload {
                    name: node.required("name")?,
                    percentage: node.required("percentage")?,
                    benefit: node.required("benefit")?,
                    color: node.required("color")?,
                })
            })
            .collect::<Result<_, DecodingError>>()?,
        ingredients: root.strings("ingredients")?,
        allergies: root.strings("allergies")?,
    })
}

// The response MIME hint normally prevents fences, but some models add them anyway.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop a language tag such as `json` or `JSON` on the opening line.
    let rest = match rest.split_once('\n') {
        Some((tag, body)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body,
        _ => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// A JSON value together with its path from the payload root.
struct Node<'a> {
    path: String,
    value: &'a Value,
}

impl<'a> Node<'a> {
    fn root(value: &'a Value) -> Self {
        Self {
            path: String::new(),
            value,
        }
    }

    fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    fn object(&self) -> Result<&'a Map<String, Value>, DecodingError> {
        match self.value {
            Value::Object(map) => Ok(map),
            other => Err(self.unexpected(other, "object")),
        }
    }

    fn get(&self, key: &str) -> Result<Node<'a>, DecodingError> {
        let map = self.object()?;
        let path = self.child_path(key);
        let value = map.get(key).ok_or_else(|| {
            DecodingError::new(
                DecodingErrorKind::KeyNotFound,
                path.clone(),
                format!("key `{}` not found", key),
            )
        })?;

        Ok(Node { path, value })
    }

    fn required<T: DeserializeOwned>(&self, key: &str) -> Result<T, DecodingError> {
        self.get(key)?.value()
    }

    fn value<T: DeserializeOwned>(&self) -> Result<T, DecodingError> {
        if self.value.is_null() {
            return Err(DecodingError::new(
                DecodingErrorKind::ValueNotFound,
                self.path.clone(),
                "expected a value but found null",
            ));
        }

        serde_json::from_value(self.value.clone()).map_err(|e| {
            DecodingError::new(DecodingErrorKind::TypeMismatch, self.path.clone(), e.to_string())
        })
    }

    fn items(&self, key: &str) -> Result<Vec<Node<'a>>, DecodingError> {
        let node = self.get(key)?;
        match node.value {
            Value::Array(items) => Ok(items
                .iter()
                .enumerate()
                .map(|(index, value)| Node {
                    path: format!("{}[{}]", node.path, index),
                    value,
                })
                .collect()),
            other => Err(node.unexpected(other, "array")),
        }
    }

    fn strings(&self, key: &str) -> Result<Vec<String>, DecodingError> {
        self.items(key)?
            .iter()
            .map(|node| node.value::<String>())
            .collect()
    }

    fn unexpected(&self, found: &Value, expected: &str) -> DecodingError {
        if found.is_null() {
            return DecodingError::new(
                DecodingErrorKind::ValueNotFound,
                self.path.clone(),
                format!("expected {} but found null", expected),
            );
        }

        DecodingError::new(
            DecodingErrorKind::TypeMismatch,
            self.path.clone(),
            format!("expected {} but found {}", expected, json_type_name(found)),
        )
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::food_analysis::test_support::{sample_payload, sample_payload_json};

    #[test]
    fn test_decode_preserves_values_and_order() {
        let result = decode_analysis(&sample_payload_json()).unwrap();

        assert_eq!(result.name(), "Avocado Toast");
        assert_eq!(result.description(), "Sourdough toast topped with smashed avocado and egg");
        assert_eq!(result.calories(), 420);

        let macros: Vec<(&str, i32, &str)> = result
            .macros()
            .iter()
            .map(|m| (m.name(), m.amount(), m.unit()))
            .collect();
        assert_eq!(macros, vec![("Protein", 14, "g"), ("Carbs", 38, "g"), ("Fat", 24, "g")]);
        assert_eq!(result.macros()[2].percentage(), 31);
        assert_eq!(result.macros()[0].icon(), "bolt.fill");
        assert_eq!(result.macros()[0].color(), "#4CAF50");

        let vitamins: Vec<&str> = result.vitamins().iter().map(|v| v.name()).collect();
        assert_eq!(vitamins, vec!["Vitamin K", "Folate"]);
        assert_eq!(result.vitamins()[1].benefit(), "Supports cell growth");

        assert_eq!(result.ingredients(), &["sourdough bread", "avocado", "egg", "chili flakes"]);
        assert_eq!(result.allergies(), &["gluten", "egg"]);
    }

    #[test]
    fn test_decode_assigns_fresh_ids_each_time() {
        let payload = sample_payload_json();
        let first = decode_analysis(&payload).unwrap();
        let second = decode_analysis(&payload).unwrap();

        assert_ne!(first.id(), second.id());
        assert_ne!(first.macros()[0].id(), second.macros()[0].id());
        assert_ne!(first.vitamins()[0].id(), second.vitamins()[0].id());
        assert_eq!(first.name(), second.name());
    }

    #[test]
    fn test_parse_payload_matches_wire_shape() {
        let payload = parse_payload(&sample_payload_json()).unwrap();

        assert_eq!(payload, sample_payload());
    }

    #[test]
    fn test_missing_calories_is_key_not_found() {
        let mut value = serde_json::from_str::<Value>(&sample_payload_json()).unwrap();
        value.as_object_mut().unwrap().remove("calories");

        let error = decode_analysis(&value.to_string()).unwrap_err();

        assert_eq!(error.kind, DecodingErrorKind::KeyNotFound);
        assert_eq!(error.path, "calories");
    }

    #[test]
    fn test_null_field_is_value_not_found() {
        let mut value = serde_json::from_str::<Value>(&sample_payload_json()).unwrap();
        value["description"] = Value::Null;

        let error = decode_analysis(&value.to_string()).unwrap_err();

        assert_eq!(error.kind, DecodingErrorKind::ValueNotFound);
        assert_eq!(error.path, "description");
    }

    #[test]
    fn test_nested_type_mismatch_reports_indexed_path() {
        let mut value = serde_json::from_str::<Value>(&sample_payload_json()).unwrap();
        value["macros"][1]["amount"] = json!("lots");

        let error = decode_analysis(&value.to_string()).unwrap_err();

        assert_eq!(error.kind, DecodingErrorKind::TypeMismatch);
        assert_eq!(error.path, "macros[1].amount");
    }

    #[test]
    fn test_missing_nested_key_reports_indexed_path() {
        let mut value = serde_json::from_str::<Value>(&sample_payload_json()).unwrap();
        value["vitamins"][0].as_object_mut().unwrap().remove("benefit");

        let error = decode_analysis(&value.to_string()).unwrap_err();

        assert_eq!(error.kind, DecodingErrorKind::KeyNotFound);
        assert_eq!(error.path, "vitamins[0].benefit");
    }

    #[test]
    fn test_non_string_ingredient_is_type_mismatch() {
        let mut value = serde_json::from_str::<Value>(&sample_payload_json()).unwrap();
        value["ingredients"][2] = json!(3);

        let error = decode_analysis(&value.to_string()).unwrap_err();

        assert_eq!(error.kind, DecodingErrorKind::TypeMismatch);
        assert_eq!(error.path, "ingredients[2]");
    }

    #[test]
    fn test_negative_calories_is_type_mismatch() {
        let mut value = serde_json::from_str::<Value>(&sample_payload_json()).unwrap();
        value["calories"] = json!(-10);

        let error = decode_analysis(&value.to_string()).unwrap_err();

        assert_eq!(error.kind, DecodingErrorKind::TypeMismatch);
        assert_eq!(error.path, "calories");
    }

    #[test]
    fn test_malformed_json_is_data_corrupted() {
        let error = decode_analysis("{\"name\": \"Soup\", ").unwrap_err();

        assert_eq!(error.kind, DecodingErrorKind::DataCorrupted);
    }

    #[test]
    fn test_root_array_is_type_mismatch() {
        let error = decode_analysis("[1, 2, 3]").unwrap_err();

        assert_eq!(error.kind, DecodingErrorKind::TypeMismatch);
        assert_eq!(error.path, "");
    }

    #[test]
    fn test_code_fence_is_stripped() {
        let fenced = format!("```json\n{}\n```", sample_payload_json());

        let result = decode_analysis(&fenced).unwrap();

        assert_eq!(result.calories(), 420);
    }

    #[test]
    fn test_fence_language_tag_is_case_insensitive() {
        for fenced in [
            format!("```JSON\n{}\n```", sample_payload_json()),
            format!("```Json\r\n{}\r\n```\n", sample_payload_json()),
            format!("```\n{}\n```", sample_payload_json()),
        ] {
            let result = decode_analysis(&fenced).unwrap();
            assert_eq!(result.name(), "Avocado Toast");
        }
    }

    #[test]
    fn test_empty_allergies_are_allowed() {
        let mut value = serde_json::from_str::<Value>(&sample_payload_json()).unwrap();
        value["allergies"] = json!([]);

        let result = decode_analysis(&value.to_string()).unwrap();

        assert!(result.allergies().is_empty());
    }
}
