//! Marketplace records
//!
//! Plain records mirrored from the server. The client holds cached copies
//! for display and edit forms; all consistency lives in the backend, so
//! unknown fields are ignored and optional fields default.

mod appointment;
mod client;
mod goal;
mod meal_plan;
mod message;
mod nutritionist;
mod progress;
mod user;

pub use appointment::{Appointment, AppointmentStatus, AppointmentUpdate, NewAppointment};
pub use client::{Client, NewClient};
pub use goal::{Goal, GoalStatus, GoalUpdate, NewGoal};
pub use meal_plan::{MealPlanEntry, MealType, NewMealPlanEntry};
pub use message::{Message, NewMessage};
pub use nutritionist::{Nutritionist, NewNutritionist};
pub use progress::{NewProgress, ProgressEntry};
pub use user::{LoginRequest, LoginResponse, MailRequest, Role, UserDescriptor};

use serde::{Deserialize, Serialize};

/// A server record addressable by its id
pub trait Record {
    fn id(&self) -> &str;
}

/// Whether an account is currently active
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "active"),
            AccountStatus::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(AccountStatus::Active),
            "inactive" => Ok(AccountStatus::Inactive),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}
