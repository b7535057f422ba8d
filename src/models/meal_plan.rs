use serde::{Deserialize, Serialize};

use super::Record;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MealType::Breakfast => write!(f, "breakfast"),
            MealType::Lunch => write!(f, "lunch"),
            MealType::Dinner => write!(f, "dinner"),
            MealType::Snack => write!(f, "snack"),
        }
    }
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            other => Err(format!("unknown meal '{}'", other)),
        }
    }
}

/// One meal of a client's plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanEntry {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub client_id: String,
    /// Day label as entered, e.g. "Monday"
    pub day: String,
    pub meal: MealType,
    pub description: String,
    #[serde(default)]
    pub calories: Option<u32>,
}

impl Record for MealPlanEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewMealPlanEntry {
    pub client_id: String,
    pub day: String,
    pub meal: MealType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
}
