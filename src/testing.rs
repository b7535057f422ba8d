//! Test support: an in-process mock of the marketplace backend

use crate::config::ApiConfig;
use crate::http::ApiClient;
use crate::models::{Role, UserDescriptor};
use crate::session::{MemorySessionStore, Session, SessionStore};
use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

type Hits = Arc<Mutex<Vec<String>>>;

/// Axum router served on an ephemeral port, recording every request line
pub(crate) struct MockBackend {
    pub base_url: String,
    hits: Hits,
    handle: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start(router: Router) -> Self {
        let hits: Hits = Arc::new(Mutex::new(Vec::new()));
        let app = router.layer(middleware::from_fn_with_state(hits.clone(), record));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            hits,
            handle,
        }
    }

    /// Every request seen so far as "METHOD /path"
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    /// Number of requests whose line starts with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.hits().iter().filter(|h| h.starts_with(prefix)).count()
    }

    /// A client pointed at this backend using `store` for its session
    pub fn client(&self, store: Arc<dyn SessionStore>) -> Arc<ApiClient> {
        let config = ApiConfig {
            base_url: self.base_url.clone(),
            request_timeout_secs: 5,
            ..Default::default()
        };
        Arc::new(ApiClient::new(&config, store).unwrap())
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn record(State(hits): State<Hits>, req: Request, next: Next) -> Response {
    hits.lock()
        .unwrap()
        .push(format!("{} {}", req.method(), req.uri().path()));
    next.run(req).await
}

/// A memory store already holding a session for `email` with `role`
pub(crate) fn session_store(email: &str, role: Role) -> Arc<MemorySessionStore> {
    let store = Arc::new(MemorySessionStore::new());
    Session::new(
        format!("token-for-{}", email),
        UserDescriptor {
            email: email.to_string(),
            role,
        },
    )
    .save(store.as_ref())
    .unwrap();
    store
}

/// A client whose every request fails to connect; proves no call was made
pub(crate) fn offline_client(store: Arc<dyn SessionStore>) -> Arc<ApiClient> {
    let config = ApiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        request_timeout_secs: 1,
        ..Default::default()
    };
    Arc::new(ApiClient::new(&config, store).unwrap())
}
