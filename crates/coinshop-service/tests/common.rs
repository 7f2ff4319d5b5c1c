//! Common test utilities for coinshop integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::json;

use coinshop_core::Username;
use coinshop_service::{create_router, AppState, ServiceConfig, StoreBackend};
use coinshop_store::{MemoryStore, Store};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server, for checking state directly.
    pub store: MemoryStore,
}

impl TestHarness {
    /// Create a new test harness with an empty in-memory store.
    pub fn new() -> Self {
        let store = MemoryStore::new();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            store_backend: StoreBackend::Memory,
            jwt_secret: "test-secret".into(),
            ..ServiceConfig::default()
        };

        let state = AppState::new(Arc::new(store.clone()), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, store }
    }

    /// Sign in (registering on first use) and return the bearer header value.
    pub async fn sign_in(&self, username: &str) -> String {
        let response = self
            .server
            .post("/api/auth")
            .json(&json!({ "username": username, "password": "password" }))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        let token = body["token"].as_str().expect("token in response");
        format!("Bearer {token}")
    }

    /// Current balance straight from the store.
    pub async fn balance(&self, username: &str) -> i64 {
        self.store
            .get_account(&Username::new(username).unwrap())
            .await
            .unwrap()
            .expect("account exists")
            .balance
    }

    /// Fetch `/api/info` for a signed-in user.
    pub async fn info(&self, auth: &str) -> serde_json::Value {
        let response = self
            .server
            .get("/api/info")
            .add_header("authorization", auth)
            .await;
        response.assert_status_ok();
        response.json()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
