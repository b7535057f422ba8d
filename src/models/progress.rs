use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Record;

/// One progress measurement for a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    /// Empty when the server answered without one
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub client_id: String,
    pub date: NaiveDate,
    /// Body weight in kilograms
    pub weight: f64,
    #[serde(default)]
    pub body_fat: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for ProgressEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewProgress {
    pub client_id: String,
    pub date: NaiveDate,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
