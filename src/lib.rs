//! # NutriHub
//!
//! Client for the NutriHub nutrition-services marketplace: authentication and
//! three role-scoped dashboards (admin, nutritionist, client) over the
//! marketplace REST API.
//!
//! ## Features
//!
//! - **One HTTP wrapper**: base URL, timeout, bearer token and request ids
//!   applied centrally; 401/403 clear the stored session
//! - **Persistent session**: token and user descriptor kept in a key/value store
//! - **Route guard**: dashboards open only for a live session of the right role
//! - **Dashboards**: stateful view-models patched in place after every write
//! - **Validated forms**: nothing invalid reaches the network
//!
//! ## Modules
//!
//! - [`http`]: `ApiClient` and `ApiError`
//! - [`session`]: session model and stores
//! - [`api`]: typed endpoint bindings
//! - [`guard`]: route protection
//! - [`dashboard`]: admin, nutritionist and client view-models
//! - [`forms`]: input validation
//! - [`calculator`]: BMI and BMR
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nutrihub::{api, ApiClient, Config, Dashboard, FileSessionStore, LoginRequest};
//! use nutrihub::dashboard::AdminDashboard;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let store = Arc::new(FileSessionStore::new(config.session.file_path()));
//!     let client = Arc::new(ApiClient::new(&config.api, store)?);
//!
//!     api::auth::login(
//!         &client,
//!         &LoginRequest {
//!             email: "admin@nutrihub.io".into(),
//!             password: "secret".into(),
//!         },
//!     )
//!     .await?;
//!
//!     let mut admin = AdminDashboard::new(client.clone());
//!     admin.load().await?;
//!     for row in admin.client_rows() {
//!         println!("{} -> {}", row.name, row.nutritionist);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod calculator;
pub mod config;
pub mod dashboard;
pub mod forms;
pub mod guard;
pub mod http;
pub mod models;
pub mod session;

#[cfg(test)]
mod testing;

// Re-export top-level types for convenience
pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, SessionConfig};

pub use http::{ApiClient, ApiError, ApiResult};

pub use session::{
    FileSessionStore, MemorySessionStore, Session, SessionError, SessionResult, SessionStore,
};

pub use guard::{GuardDecision, RedirectReason, Route, RouteGuard};

pub use dashboard::{
    AdminDashboard, ClientDashboard, Dashboard, DashboardError, DashboardResult, LoadState,
    NutritionistDashboard,
};

pub use forms::{FormInput, ValidationErrors};

pub use models::{
    AccountStatus, Appointment, AppointmentStatus, Client, Goal, GoalStatus, LoginRequest,
    MealPlanEntry, MealType, Message, Nutritionist, ProgressEntry, Role, UserDescriptor,
};
