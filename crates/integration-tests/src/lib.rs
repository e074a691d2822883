//! Integration test harness for Dokan.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p dokan-integration-tests
//! ```
//!
//! No external services are needed: the hosted backend is an `httpmock`
//! server and sessions live in a [`MemoryStore`] the harness can edit
//! directly, which is how tests sign a visitor in.
//!
//! # Test Categories
//!
//! - `cart_consistency` - Cart service over the in-memory stores
//! - `cart_http` - Storefront routes over a mocked backend

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::str::FromStr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use httpmock::MockServer;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::session::Id;
use tower_sessions::{MemoryStore, SessionStore};

use dokan_storefront::build_router;
use dokan_storefront::config::{BackendConfig, StorefrontConfig};
use dokan_storefront::middleware::SESSION_COOKIE_NAME;
use dokan_storefront::models::{CurrentUser, session_keys};
use dokan_storefront::state::AppState;

/// Key every test request presents as `apikey`.
pub const ANON_KEY: &str = "anon-key";

/// Storefront configuration pointing at `backend_url`, with caching off.
#[must_use]
pub fn test_config(backend_url: &str) -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        database_url: None,
        backend: BackendConfig {
            url: backend_url.to_string(),
            anon_key: SecretString::from(ANON_KEY),
            catalog_cache_ttl: Duration::ZERO,
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The storefront router over a mocked backend.
pub struct TestApp {
    pub backend: MockServer,
    pub sessions: MemoryStore,
    router: Router,
}

impl TestApp {
    pub async fn start() -> Self {
        let backend = MockServer::start_async().await;
        let sessions = MemoryStore::default();
        let state = AppState::new(test_config(&backend.base_url()), None).unwrap();
        let router = build_router(state, sessions.clone());

        Self {
            backend,
            sessions,
            router,
        }
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::get(path);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    /// POST a urlencoded form.
    pub async fn post(&self, path: &str, form: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(form.to_string())).unwrap())
            .await
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Record `user` as signed in on the session behind `cookie`, as the
    /// auth provider's callback would.
    pub async fn sign_in(&self, cookie: &str, user: &CurrentUser) {
        let id = session_id(cookie);
        let mut record = self
            .sessions
            .load(&id)
            .await
            .unwrap()
            .expect("session exists");
        record.data.insert(
            session_keys::CURRENT_USER.to_string(),
            serde_json::to_value(user).unwrap(),
        );
        self.sessions.save(&record).await.unwrap();
    }
}

fn session_id(cookie: &str) -> Id {
    let value = cookie
        .strip_prefix(&format!("{SESSION_COOKIE_NAME}="))
        .expect("session cookie");
    Id::from_str(value).unwrap()
}

/// The `name=value` pair of the session cookie set by `response`.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response sets the session cookie")
        .to_str()
        .unwrap();
    set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Assert the status and decode the JSON body.
pub async fn json_body(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the body as text.
pub async fn text_body(response: Response<Body>, status: StatusCode) -> String {
    assert_eq!(response.status(), status);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// A `products` row as the backend returns it.
#[must_use]
pub fn product_json(id: &str, name: &str, price: i64) -> Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "slug": name.to_lowercase().replace(' ', "-"),
        "price": price,
        "images": [],
        "stock_quantity": 50,
        "is_active": true
    })
}
