//! Integration tests for ShopTax.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the backend services and the server
//! cargo run -p shoptax-app
//!
//! # Run integration tests (ignored by default)
//! cargo test -p shoptax-integration-tests -- --ignored
//! ```
//!
//! The tests talk to a running server over HTTP; they are `#[ignore]`d so
//! `cargo test` stays green without a live deployment.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use reqwest::Client;

/// Shared context for tests that drive the server over HTTP.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Build a context pointing at the server under test.
    ///
    /// `SHOPTAX_TEST_URL` overrides the default of `http://localhost:3000`.
    #[must_use]
    pub fn new() -> Self {
        let base_url = std::env::var("SHOPTAX_TEST_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let client = Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");
        Self { client, base_url }
    }

    /// Absolute URL for a path on the server under test.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Log in with the given credentials, storing the session cookie on the
    /// shared client. Panics if login does not redirect to a role home.
    pub async fn login(&self, email: &str, password: &str) {
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .expect("Failed to submit login form");

        assert!(
            resp.status().is_redirection(),
            "login did not redirect: {}",
            resp.status()
        );
        let location = resp
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(
            location == "/dashboard" || location == "/admin",
            "login redirected to {location} instead of a role home"
        );
    }

    /// Unique email for registration tests.
    #[must_use]
    pub fn unique_email(prefix: &str) -> String {
        format!("{prefix}+{}@example.com", uuid::Uuid::new_v4().simple())
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
