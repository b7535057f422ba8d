//! HTTP Client Wrapper
//!
//! One configured request dispatcher for the marketplace REST API. Every
//! request gets the base URL, a request id and the bearer token read from
//! the session store at dispatch time; call sites never attach credentials
//! themselves.

mod client;
mod error;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
