//! Login, logout and mail

use crate::http::{ApiClient, ApiError, ApiResult};
use crate::models::{LoginRequest, LoginResponse, MailRequest};
use crate::session::Session;

/// Exchange credentials for a token and persist the session
pub async fn login(client: &ApiClient, request: &LoginRequest) -> ApiResult<Session> {
    let response: LoginResponse = client
        .post_anonymous("/users/login", request)
        .await
        .map_err(|e| match e {
            // A rejected login is bad credentials, not an expired session
            ApiError::Unauthorized => ApiError::Status {
                status: 401,
                message: "Invalid email or password".to_string(),
            },
            other => other,
        })?;

    let session = Session::new(response.token, response.user);
    session.save(client.session_store())?;
    tracing::info!(email = %session.user.email, role = %session.role(), "Logged in");
    Ok(session)
}

/// Drop the stored session. Purely local; the server keeps no session.
pub fn logout(client: &ApiClient) -> ApiResult<()> {
    Session::clear(client.session_store())?;
    tracing::info!("Logged out");
    Ok(())
}

/// Send a mail through the backend
pub async fn send_mail(client: &ApiClient, request: &MailRequest) -> ApiResult<()> {
    client.post_empty("/users/sendmail", request).await
}

/// Ask the server whether the stored token is still accepted
pub async fn verify(client: &ApiClient) -> ApiResult<()> {
    client.get_empty("/users/verify").await
}
