//! Feature Forms
//!
//! Raw text fields as a user typed them, validated into request bodies.
//! A form that fails validation never reaches the network: dashboards call
//! [`FormInput::validate`] before dispatching anything.

mod appointment;
mod auth;
mod message;
mod tracking;
mod user;

pub use appointment::AppointmentForm;
pub use auth::{LoginForm, MailForm};
pub use message::MessageForm;
pub use tracking::{GoalForm, MealPlanForm, ProgressForm};
pub use user::{ClientForm, NutritionistForm};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// A form that can be turned into a request body
pub trait FormInput {
    type Output;

    fn validate(&self) -> Result<Self::Output, ValidationErrors>;
}

/// One rejected field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every problem found in one submission
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", join_fields(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether `field` was rejected
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub(crate) fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Trimmed value, or an error if blank
    pub(crate) fn required(&mut self, field: &'static str, value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, "is required");
        }
        trimmed.to_string()
    }

    /// Required and shaped like an email address
    pub(crate) fn email(&mut self, field: &'static str, value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, "is required");
        } else if !email_regex().map_or(false, |re| re.is_match(trimmed)) {
            self.push(field, "must be a valid email address");
        }
        trimmed.to_string()
    }

    /// Parse a value if one was given
    pub(crate) fn parse_optional<T: FromStr>(
        &mut self,
        field: &'static str,
        value: &str,
        what: &str,
    ) -> Option<T> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                self.push(field, format!("must be {}", what));
                None
            }
        }
    }

    /// Parse a value that must be present
    pub(crate) fn parse_required<T: FromStr>(
        &mut self,
        field: &'static str,
        value: &str,
        what: &str,
    ) -> Option<T> {
        if value.trim().is_empty() {
            self.push(field, "is required");
            return None;
        }
        self.parse_optional(field, value, what)
    }

    pub(crate) fn date(&mut self, field: &'static str, value: &str, required: bool) -> Option<NaiveDate> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            if required {
                self.push(field, "is required");
            }
            return None;
        }
        match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                self.push(field, "must be a date like 2026-03-01");
                None
            }
        }
    }

    pub(crate) fn date_time(&mut self, field: &'static str, value: &str) -> Option<DateTime<Utc>> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, "is required");
            return None;
        }
        match parse_date_time(trimmed) {
            Some(dt) => Some(dt),
            None => {
                self.push(field, "must be a date and time like 2026-03-01 14:30");
                None
            }
        }
    }

    /// `Ok(value)` when nothing was rejected
    pub(crate) fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
}

/// RFC 3339, or a naive `YYYY-MM-DD HH:MM` taken as UTC
pub fn parse_date_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// `Some(trimmed)` for non-blank input
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
