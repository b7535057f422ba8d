use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountStatus, Record};

/// A client of the marketplace
///
/// `nutritionist_id` is a bare reference; names are resolved locally from a
/// separately fetched nutritionist list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, alias = "nutritionist")]
    pub nutritionist_id: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub next_session: Option<DateTime<Utc>>,
}

impl Record for Client {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Create/update body for a client
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutritionist_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    pub status: AccountStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}
