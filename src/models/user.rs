//! Users, roles and login payloads

use serde::{Deserialize, Serialize};

/// Role of an authenticated user; selects the dashboard and API scope
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Nutritionist,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Nutritionist => "nutritionist",
            Role::Client => "client",
        }
    }

    /// Route of this role's dashboard
    pub fn dashboard_path(&self) -> String {
        format!("/dashboard/{}", self.as_str())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "nutritionist" => Ok(Role::Nutritionist),
            "client" => Ok(Role::Client),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// The user descriptor persisted next to the token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDescriptor {
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDescriptor,
}

/// Body of `/users/sendmail`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MailRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}
