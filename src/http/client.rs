//! Marketplace REST API client

use super::error::{error_message, ApiError, ApiResult};
use crate::config::ApiConfig;
use crate::session::{Session, SessionStore, TOKEN_KEY};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// How a request relates to the stored session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    /// Bearer token attached; a 401/403 clears the session
    Session,
    /// No token and no session side effects (login)
    Anonymous,
}

/// Configured dispatcher for the marketplace API
///
/// No retry and no backoff: a failed call is reported once and each caller
/// decides what to show.
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    /// Create a client for the configured origin
    pub fn new(config: &ApiConfig, session: Arc<dyn SessionStore>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The store this client reads its token from
    pub fn session_store(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }

    /// Current session, if one is stored
    pub fn current_session(&self) -> ApiResult<Option<Session>> {
        Ok(Session::load(self.session.as_ref())?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET and decode the body
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.dispatch(Method::GET, path, |req| req).await?;
        decode(response).await
    }

    /// GET, caring only that the server answered 2xx
    pub async fn get_empty(&self, path: &str) -> ApiResult<()> {
        self.dispatch(Method::GET, path, |req| req).await?;
        Ok(())
    }

    /// GET with query parameters and decode the body
    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.dispatch(Method::GET, path, |req| req.query(query)).await?;
        decode(response).await
    }

    /// POST a JSON body and decode the response
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.dispatch(Method::POST, path, |req| req.json(body)).await?;
        decode(response).await
    }

    /// POST a JSON body, ignoring whatever the server answers on success
    pub async fn post_empty<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<()> {
        self.dispatch(Method::POST, path, |req| req.json(body)).await?;
        Ok(())
    }

    /// POST a JSON body outside the session and decode the response.
    ///
    /// Used for credential exchange: a rejection here leaves any stored
    /// session untouched.
    pub async fn post_anonymous<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .dispatch_as(Auth::Anonymous, Method::POST, path, |req| req.json(body))
            .await?;
        decode(response).await
    }

    /// PUT a JSON body and decode the response
    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.dispatch(Method::PUT, path, |req| req.json(body)).await?;
        decode(response).await
    }

    /// DELETE a resource
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.dispatch(Method::DELETE, path, |req| req).await?;
        Ok(())
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> ApiResult<Response> {
        self.dispatch_as(Auth::Session, method, path, build).await
    }

    /// Build, authorize and send one request, mapping non-2xx statuses to errors
    async fn dispatch_as(
        &self,
        auth: Auth,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> ApiResult<Response> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut request = self
            .client
            .request(method.clone(), self.url(path))
            .header(REQUEST_ID_HEADER, &request_id);

        if auth == Auth::Session {
            if let Some(token) = self.session.get(TOKEN_KEY)?.filter(|t| !t.is_empty()) {
                request = request.bearer_auth(token);
            }
        }

        let response = build(request).send().await.map_err(|e| {
            tracing::warn!(request_id = %request_id, %method, path, error = %e, "Request failed");
            ApiError::from_transport(e)
        })?;

        let status = response.status();
        tracing::debug!(request_id = %request_id, %method, path, status = status.as_u16(), "API call");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);

        let error = match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(path.to_string()),
            _ => ApiError::Status {
                status: status.as_u16(),
                message,
            },
        };

        if auth == Auth::Session && error.is_session_expired() {
            tracing::warn!(request_id = %request_id, path, status = status.as_u16(), "Credentials rejected, clearing session");
            if let Err(e) = Session::clear(self.session.as_ref()) {
                tracing::error!(error = %e, "Failed to clear rejected session");
            }
        } else {
            tracing::warn!(request_id = %request_id, %method, path, error = %error, "API error");
        }

        Err(error)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let body = response.text().await.map_err(ApiError::from_transport)?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}
