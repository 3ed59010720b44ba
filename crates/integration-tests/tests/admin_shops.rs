//! Integration tests for admin shop management.
//!
//! These tests require:
//! - A running server (cargo run -p shoptax-app)
//! - Reachable identity/records backend services
//! - A verified admin account (SHOPTAX_TEST_ADMIN_EMAIL / _PASSWORD)
//!
//! Run with: cargo test -p shoptax-integration-tests -- --ignored

use reqwest::StatusCode;

use shoptax_integration_tests::TestContext;

fn admin_credentials() -> Option<(String, String)> {
    let email = std::env::var("SHOPTAX_TEST_ADMIN_EMAIL").ok()?;
    let password = std::env::var("SHOPTAX_TEST_ADMIN_PASSWORD").ok()?;
    Some((email, password))
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_admin_dashboard_requires_auth() {
    let ctx = TestContext::new();
    let resp = ctx
        .client
        .get(ctx.url("/admin"))
        .send()
        .await
        .expect("Failed to get admin dashboard");

    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/auth/login");
}

#[tokio::test]
#[ignore = "Requires running server and a verified admin account"]
async fn test_admin_dashboard_shows_stats_and_map() {
    let (email, password) = admin_credentials().expect("admin test credentials not set");
    let ctx = TestContext::new();
    ctx.login(&email, &password).await;

    let resp = ctx
        .client
        .get(ctx.url("/admin"))
        .send()
        .await
        .expect("Failed to get admin dashboard");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("taxes paid"));
    assert!(body.contains("taxes unpaid"));
    // Map bootstrap payload is embedded for the client script.
    assert!(body.contains("map-data"));
}

#[tokio::test]
#[ignore = "Requires running server and a verified admin account"]
async fn test_mark_paid_then_unpaid_roundtrip() {
    let (email, password) = admin_credentials().expect("admin test credentials not set");
    let shop_id =
        std::env::var("SHOPTAX_TEST_SHOP_ID").expect("SHOPTAX_TEST_SHOP_ID not set");
    let ctx = TestContext::new();
    ctx.login(&email, &password).await;

    for status in ["paid", "unpaid"] {
        let resp = ctx
            .client
            .post(ctx.url(&format!("/admin/shops/{shop_id}/status")))
            .form(&[("status", status)])
            .send()
            .await
            .expect("Failed to update status");

        assert!(resp.status().is_redirection());

        let detail = ctx
            .client
            .get(ctx.url(&format!("/admin/shops/{shop_id}")))
            .send()
            .await
            .expect("Failed to get shop detail")
            .text()
            .await
            .expect("Failed to read body");
        let expected = if status == "paid" { "Paid" } else { "Unpaid" };
        assert!(detail.contains(expected));
    }
}
