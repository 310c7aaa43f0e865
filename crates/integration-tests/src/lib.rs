//! Integration tests for Emporium.
//!
//! Each test builds the full axum router over a fresh in-memory store and
//! drives it in-process with `tower::ServiceExt::oneshot`, so no server,
//! port or database is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p emporium-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header::CONTENT_TYPE},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use emporium_core::{ProductId, UserId};
use emporium_storefront::config::StorefrontConfig;
use emporium_storefront::db::{MemoryStore, Store};
use emporium_storefront::state::AppState;

/// Signing secret used by every test context.
pub const TOKEN_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";

/// Password given to every account created through the helpers.
pub const PASSWORD: &str = "s3cret-pass";

/// A response with its body decoded as JSON (or as a JSON string when the
/// body is not JSON).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// A signed-in account.
#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: UserId,
    pub token: String,
    pub refresh_token: String,
}

/// The router plus direct access to its store.
pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    accounts: std::sync::atomic::AtomicU32,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Build a router over an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let env: HashMap<&str, &str> = HashMap::from([
            ("EMPORIUM_STORE", "memory"),
            ("EMPORIUM_TOKEN_SECRET", TOKEN_SECRET),
        ]);
        let config = StorefrontConfig::from_lookup(|key| env.get(key).map(|v| (*v).to_string()))
            .expect("test configuration is valid");

        let store = Arc::new(MemoryStore::new());
        let shared: Arc<dyn Store> = store.clone();
        let app = emporium_storefront::app(AppState::new(config, shared));

        Self {
            app,
            store,
            accounts: std::sync::atomic::AtomicU32::new(0),
        }
    }

    /// Send a request with an optional `token` header and JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let raw = body.map(|b| b.to_string()).unwrap_or_default();
        self.send_raw(method, uri, token, &raw).await
    }

    /// Send a request with a raw (possibly malformed) JSON body.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: &str,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("token", token);
        }
        if !body.is_empty() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(Body::from(body.to_owned()))
            .expect("request is well formed");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        self.send(Method::POST, uri, token, body).await
    }

    /// Sign up and log in a new customer with a unique email and phone.
    pub async fn customer(&self) -> Account {
        self.account("/api/v1/users").await
    }

    /// Sign up and log in a new admin.
    pub async fn admin(&self) -> Account {
        self.account("/api/v1/admin").await
    }

    async fn account(&self, prefix: &str) -> Account {
        let n = self
            .accounts
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let email = format!("user{n}@example.com");

        let signup = self
            .post(
                &format!("{prefix}/signup"),
                None,
                Some(signup_body(&email, &format!("98765{n:05}"))),
            )
            .await;
        assert_eq!(signup.status, StatusCode::CREATED, "{:?}", signup.body);

        let login = self
            .post(
                &format!("{prefix}/login"),
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(login.status, StatusCode::OK, "{:?}", login.body);

        Account {
            user_id: UserId::parse(login.body["user_id"].as_str().expect("user_id"))
                .expect("user_id is an object id"),
            token: login.body["token"].as_str().expect("token").to_owned(),
            refresh_token: login.body["refresh_token"]
                .as_str()
                .expect("refresh_token")
                .to_owned(),
        }
    }

    /// Create a product through the admin route.
    pub async fn product(&self, admin: &Account, name: &str, price: i64) -> ProductId {
        let response = self
            .post(
                "/api/v1/admin/addproduct",
                Some(&admin.token),
                Some(json!({ "product_name": name, "price": price, "rating": 4 })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

        ProductId::parse(
            response.body["data"]["product_id"]
                .as_str()
                .expect("product_id"),
        )
        .expect("product_id is an object id")
    }
}

/// A valid signup body.
#[must_use]
pub fn signup_body(email: &str, phone: &str) -> Value {
    json!({
        "first_name": "Test",
        "last_name": "User",
        "email": email,
        "phone": phone,
        "password": PASSWORD,
    })
}
