use serde::{Deserialize, Serialize};

use super::{AccountStatus, Record};

/// A nutritionist offering services on the marketplace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Nutritionist {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub status: AccountStatus,
    /// Number of clients assigned, as counted by the server
    #[serde(default)]
    pub client_count: u32,
}

impl Record for Nutritionist {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Create/update body for a nutritionist
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewNutritionist {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub specialization: String,
    pub status: AccountStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_server_shape() {
        let body = r#"{"_id":"n1","name":"Ana","email":"ana@x.io","clientCount":4,"status":"inactive","__v":0}"#;
        let n: Nutritionist = serde_json::from_str(body).unwrap();
        assert_eq!(n.id(), "n1");
        assert_eq!(n.client_count, 4);
        assert_eq!(n.status, AccountStatus::Inactive);
        assert!(n.phone.is_empty());
    }
}
