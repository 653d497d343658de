use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    common::{generate_timestamp, generate_uuid_v7},
    food_analysis::decoder::{AnalysisPayload, MacroPayload, VitaminPayload},
};

/// Nutrition breakdown of a photographed meal.
///
/// Instances only come out of [`From<AnalysisPayload>`], which stamps fresh
/// local identifiers on the result and on every nested entry. Identifiers key
/// UI lists; they are never sent to the model and never read back from it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalysisResult {
    id: Uuid,
    name: String,
    description: String,
    calories: u32,
    macros: Vec<MacroNutrient>,
    vitamins: Vec<Vitamin>,
    ingredients: Vec<String>,
    allergies: Vec<String>,
    analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MacroNutrient {
    id: Uuid,
    name: String,
    amount: i32,
    unit: String,
    percentage: i32,
    icon: String,
    color: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Vitamin {
    id: Uuid,
    name: String,
    percentage: i32,
    benefit: String,
    color: String,
}

impl AnalysisResult {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn calories(&self) -> u32 {
        self.calories
    }

    pub fn macros(&self) -> &[MacroNutrient] {
        &self.macros
    }

    pub fn vitamins(&self) -> &[Vitamin] {
        &self.vitamins
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn allergies(&self) -> &[String] {
        &self.allergies
    }

    pub fn analyzed_at(&self) -> DateTime<Utc> {
        self.analyzed_at
    }
}

impl MacroNutrient {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> i32 {
        self.amount
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn percentage(&self) -> i32 {
        self.percentage
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn color(&self) -> &str {
        &self.color
    }
}

impl Vitamin {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn percentage(&self) -> i32 {
        self.percentage
    }

    pub fn benefit(&self) -> &str {
        &self.benefit
    }

    pub fn color(&self) -> &str {
        &self.color
    }
}

impl From<AnalysisPayload> for AnalysisResult {
    fn from(payload: AnalysisPayload) -> Self {
        let (now, timestamp) = generate_timestamp();

        Self {
            id: Uuid::new_v7(timestamp),
            name: payload.name,
            description: payload.description,
            calories: payload.calories,
            macros: payload.macros.into_iter().map(MacroNutrient::from).collect(),
            vitamins: payload.vitamins.into_iter().map(Vitamin::from).collect(),
            ingredients: payload.ingredients,
            allergies: payload.allergies,
            analyzed_at: now,
        }
    }
}

impl From<MacroPayload> for MacroNutrient {
    fn from(payload: MacroPayload) -> Self {
        Self {
            id: generate_uuid_v7(),
            name: payload.name,
            amount: payload.amount,
            unit: payload.unit,
            percentage: payload.percentage,
            icon: payload.icon,
            color: payload.color,
        }
    }
}

impl From<VitaminPayload> for Vitamin {
    fn from(payload: VitaminPayload) -> Self {
        Self {
            id: generate_uuid_v7(),
            name: payload.name,
            percentage: payload.percentage,
            benefit: payload.benefit,
            color: payload.color,
        }
    }
}
