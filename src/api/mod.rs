//! Marketplace API bindings
//!
//! Typed functions over [`ApiClient`](crate::http::ApiClient), one module
//! per resource.
//!
//! # Endpoints
//!
//! ## Users
//! - `POST /users/login` - Exchange credentials for a token
//! - `POST /users/sendmail` - Contact / notification mail
//! - `GET /users/verify` - Check the current token
//!
//! ## Nutritionists
//! - `GET|POST /nutritionists`, `PUT|DELETE /nutritionists/:id`
//! - `GET /nuts/email?email=` - Profile by login email
//!
//! ## Clients
//! - `GET|POST /clients`, `PUT|DELETE /clients/:id`
//! - `GET /client/byNutId/:nutId` - Clients of one nutritionist
//! - `GET /client/email?email=` - Profile by login email
//! - `GET /client/progress/:clientId`, `POST /client/progress`
//! - `GET /client/goal/:clientId`, `POST /client/goal`, `PUT|DELETE /client/goal/:id`
//!
//! ## Appointments
//! - `GET /appointments/nutritionist/:id`, `GET /appointments/client/:id`
//! - `POST /appointments/add`, `PUT|DELETE /appointments/:id`
//!
//! ## Messages
//! - `GET /nuts/messages/:nutId/:clientId` - Sent by the nutritionist
//! - `GET /client/messages/:clientId/:nutId` - Sent by the client
//! - `POST /nuts/sendMessage`, `POST /client/sendMessage`
//!
//! ## Meal plans
//! - `GET /mealplans/:clientId`, `POST /mealplans`, `DELETE /mealplans/:id`

pub mod appointments;
pub mod auth;
pub mod clients;
pub mod goals;
pub mod meal_plans;
pub mod messages;
pub mod nutritionists;
pub mod progress;

use std::borrow::Cow;

/// Percent-encode one path segment
pub(crate) fn seg(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_encoding() {
        assert_eq!(seg("abc123"), "abc123");
        assert_eq!(seg("a/b c"), "a%2Fb%20c");
    }
}
