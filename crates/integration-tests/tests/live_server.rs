//! The saved cart API against a running server.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (saved-cart migrate)
//! - The server running (cargo run -p saved-cart-server)
//! - `SHOPIFY_API_KEY` and `SHOPIFY_API_SECRET` matching the server's
//!
//! Run with: cargo test -p saved-cart-integration-tests -- --ignored

use chrono::Utc;
use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};

use saved_cart_server::config::ShopifyAppConfig;
use saved_cart_server::middleware::{SessionClaims, SessionTokenVerifier};

/// Base URL for the API (configurable via environment).
fn base_url() -> String {
    std::env::var("SAVED_CART_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Sign a session token with the server's credentials.
fn session_token() -> String {
    let config = ShopifyAppConfig {
        api_key: std::env::var("SHOPIFY_API_KEY").expect("SHOPIFY_API_KEY not set"),
        api_secret: SecretString::from(
            std::env::var("SHOPIFY_API_SECRET").expect("SHOPIFY_API_SECRET not set"),
        ),
    };
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        iss: None,
        dest: "https://live-test.myshopify.com".to_string(),
        aud: config.api_key.clone(),
        sub: None,
        exp: now + 60,
        nbf: now - 1,
        iat: now - 1,
        jti: format!("live-{now}"),
        sid: None,
    };
    SessionTokenVerifier::new(&config)
        .sign(&claims)
        .expect("Failed to sign session token")
}

/// A customer ID no earlier run has used.
fn fresh_customer_id() -> String {
    format!("live-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_live_health() {
    let resp = Client::new()
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .expect("Failed to reach server");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_live_save_and_fetch() {
    let client = Client::new();
    let base_url = base_url();
    let customer_id = fresh_customer_id();
    let line = json!({ "id": "a", "merchandise": { "title": "Shoe" } });

    let resp = client
        .get(format!("{base_url}/api/getCart?customerId={customer_id}"))
        .bearer_auth(session_token())
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse getCart");
    assert_eq!(body, json!({ "isSuccess": true, "data": null }));

    let resp = client
        .post(format!("{base_url}/api/saveCart"))
        .bearer_auth(session_token())
        .json(&json!({
            "checkoutToken": "live-token",
            "selectedProduct": [line.clone()],
            "customerId": customer_id
        }))
        .send()
        .await
        .expect("Failed to save cart");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{base_url}/api/saveCart"))
        .bearer_auth(session_token())
        .json(&json!({
            "checkoutToken": "live-token",
            "selectedProduct": [],
            "customerId": customer_id
        }))
        .send()
        .await
        .expect("Failed to save cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = client
        .get(format!("{base_url}/api/getCart?customerId={customer_id}"))
        .bearer_auth(session_token())
        .send()
        .await
        .expect("Failed to get cart")
        .json()
        .await
        .expect("Failed to parse getCart");
    assert_eq!(body["data"]["products"], json!([]));
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_live_rejects_missing_token() {
    let resp = Client::new()
        .post(format!("{}/api/saveCart", base_url()))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to reach server");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
