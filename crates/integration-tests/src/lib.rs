//! Integration tests for Bramble.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bramble-integration-tests
//! ```
//!
//! No database is needed: the storefront router is driven in-process with
//! in-memory session and saved-item stores.
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Cart store behavior through whole shopping flows
//! - `recently_viewed` - Recently viewed list bounds and ordering
//! - `saved_items_failures` - Rollback and call ordering when the saved-items backend fails or stalls
//! - `storefront_api` - HTTP API with cookie sessions

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use bramble_core::{CartItem, ColorVariant, NewCartItem, Product, ProductId, ShopperKey};
use bramble_storefront::backend::{BackendError, InMemorySavedItems, SavedItemsBackend};
use bramble_storefront::config::{SentryConfig, SessionConfig, StorefrontConfig};
use bramble_storefront::state::AppState;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use tokio::sync::Semaphore;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

// =============================================================================
// Fixtures
// =============================================================================

/// Cart payload for a product priced in cents.
#[must_use]
pub fn item(id: &str, cents: i64) -> NewCartItem {
    NewCartItem {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        price: Decimal::new(cents, 2),
        image: format!("/img/{id}.jpg"),
        size: None,
    }
}

/// Catalog record for the recently viewed list.
#[must_use]
pub fn product(id: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        price: Decimal::new(4_200, 2),
        description: "Brushed cotton".to_string(),
        features: vec!["Relaxed fit".to_string()],
        materials: "100% cotton".to_string(),
        care: "Machine wash cold".to_string(),
        shipping: "Ships in 1-2 days".to_string(),
        stock: 12,
        colors: vec![ColorVariant {
            name: "Moss".to_string(),
            hex: "#4a5d23".to_string(),
            image: None,
        }],
        angle_images: Vec::new(),
        image: format!("/img/{id}.jpg"),
    }
}

/// Ids of cart lines, in order.
#[must_use]
pub fn ids(lines: &[CartItem]) -> Vec<String> {
    lines.iter().map(|line| line.id.to_string()).collect()
}

/// Storefront configuration for in-process tests.
///
/// # Panics
///
/// Never; the literal values are valid.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://bramble@localhost/bramble_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: url::Url::parse("http://localhost:3000").unwrap(),
        sessions: SessionConfig::default(),
        sentry: SentryConfig {
            dsn: None,
            environment: "test".to_string(),
            sample_rate: 0.0,
            traces_sample_rate: 0.0,
        },
    }
}

// =============================================================================
// FlakyBackend
// =============================================================================

/// Saved-items backend that can be switched to fail every call.
///
/// Successful calls are stored in an [`InMemorySavedItems`].
#[derive(Debug, Default)]
pub struct FlakyBackend {
    stored: InMemorySavedItems,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FlakyBackend {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every following call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of calls received, failed or not.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Lines stored for a shopper.
    #[must_use]
    pub fn stored(&self, shopper: &ShopperKey) -> Vec<CartItem> {
        self.stored.stored(shopper)
    }

    fn check(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

impl SavedItemsBackend for FlakyBackend {
    async fn save(&self, shopper: &ShopperKey, item: &CartItem) -> Result<(), BackendError> {
        self.check()?;
        self.stored.save(shopper, item).await
    }

    async fn remove(&self, shopper: &ShopperKey, id: &ProductId) -> Result<(), BackendError> {
        self.check()?;
        self.stored.remove(shopper, id).await
    }

    async fn list(&self, shopper: &ShopperKey) -> Result<Vec<CartItem>, BackendError> {
        self.check()?;
        self.stored.list(shopper).await
    }
}

// =============================================================================
// HeldSaves
// =============================================================================

/// Saved-items backend whose saves wait until released.
///
/// Removes and lists go straight through to an [`InMemorySavedItems`].
#[derive(Debug)]
pub struct HeldSaves {
    stored: InMemorySavedItems,
    gate: Semaphore,
    saves_started: AtomicUsize,
}

impl HeldSaves {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            stored: InMemorySavedItems::new(),
            gate: Semaphore::new(0),
            saves_started: AtomicUsize::new(0),
        })
    }

    /// Let `count` waiting or future saves through.
    pub fn release(&self, count: usize) {
        self.gate.add_permits(count);
    }

    /// Wait until `count` saves have reached the backend.
    ///
    /// # Panics
    ///
    /// Panics if that takes more than two seconds.
    #[allow(clippy::unwrap_used)]
    pub async fn wait_for_saves(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.saves_started.load(Ordering::SeqCst) < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    /// Lines stored for a shopper.
    #[must_use]
    pub fn stored(&self, shopper: &ShopperKey) -> Vec<CartItem> {
        self.stored.stored(shopper)
    }
}

impl SavedItemsBackend for HeldSaves {
    async fn save(&self, shopper: &ShopperKey, item: &CartItem) -> Result<(), BackendError> {
        self.saves_started.fetch_add(1, Ordering::SeqCst);
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| BackendError::Unavailable("gate closed".to_string()))?;
        self.stored.save(shopper, item).await
    }

    async fn remove(&self, shopper: &ShopperKey, id: &ProductId) -> Result<(), BackendError> {
        self.stored.remove(shopper, id).await
    }

    async fn list(&self, shopper: &ShopperKey) -> Result<Vec<CartItem>, BackendError> {
        self.stored.list(shopper).await
    }
}

// =============================================================================
// TestClient
// =============================================================================

/// In-process HTTP client for the storefront router that keeps the session
/// cookie between requests, like a browser.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// Build the storefront router over `backend` with in-memory sessions.
    ///
    /// # Panics
    ///
    /// Panics if the lazy pool cannot parse the test database URL.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn new<B: SavedItemsBackend>(backend: Arc<B>) -> Self {
        // Never connects unless a handler touches the database
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://bramble@localhost/bramble_test")
            .unwrap();
        let state = AppState::with_backend(test_config(), pool, backend);

        Self {
            router: bramble_storefront::app(state, MemoryStore::default()),
            cookie: None,
        }
    }

    /// Start over as a new visitor.
    pub fn forget_cookie(&mut self) {
        self.cookie = None;
    }

    /// Send a request and decode the JSON (or text) response body.
    ///
    /// # Panics
    ///
    /// Panics if the router fails to produce a response.
    #[allow(clippy::unwrap_used)]
    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, value)
    }

    pub async fn get(&mut self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(Method::POST, uri, body).await
    }

    pub async fn patch(&mut self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }
}
