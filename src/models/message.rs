use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;

/// A chat message between a nutritionist and a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Record for Message {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Body of the send-message endpoints
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
}
