//! Integration tests for the startup sequence ([`webhook_bot::build_app`]).
//!
//! A mockito server stands in for the Bot API. Teloxide request path format is `/bot<token>/<method>`.
//! Config is built directly, so no env mutation is needed.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use webhook_bot::{build_app, BotConfig};

const TEST_BOT_TOKEN: &str = "123456:test_bot_token";

fn test_config(api_url: String, state_store_url: String) -> BotConfig {
    BotConfig {
        base_url: "https://example.com/".to_string(),
        bot_token: TEST_BOT_TOKEN.to_string(),
        webhook_path: "/tgupdates".to_string(),
        telegram_api_url: Some(api_url),
        proxy_url: None,
        state_store_url,
        state_destiny: "default".to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
        log_file: "logs/webhook-bot-test.log".to_string(),
        dispatch_timeout_secs: None,
        allowed_users: Vec::new(),
    }
}

async fn mock_set_webhook(server: &mut mockito::ServerGuard, status: usize, body: &str) -> mockito::Mock {
    server
        .mock("POST", format!("/bot{}/setWebhook", TEST_BOT_TOKEN).as_str())
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

async fn mock_get_me(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("POST", format!("/bot{}/getMe", TEST_BOT_TOKEN).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
            "ok": true,
            "result": {
                "id": 123456,
                "is_bot": true,
                "first_name": "TestBot",
                "username": "testbot",
                "can_join_groups": true,
                "can_read_all_group_messages": false,
                "supports_inline_queries": false,
                "can_connect_to_business": false,
                "has_main_web_app": false
            }
        }"#,
        )
        .create_async()
        .await
}

/// **Test: Startup registers the webhook, reads the username and serves the routes.**
///
/// **Setup:** Bot API mock answering setWebhook and getMe; SQLite state store in a temp dir.
/// **Action:** `build_app`, then GET /ping and POST /tgupdates without a secret.
/// **Expected:** URL https://example.com/tgupdates; username testbot; ping ok; missing secret rejected.
#[tokio::test]
async fn test_build_app_happy_path() {
    let mut server = mockito::Server::new_async().await;
    let set_webhook = mock_set_webhook(&mut server, 200, r#"{"ok": true, "result": true}"#).await;
    let _get_me = mock_get_me(&mut server).await;
    let temp_dir = TempDir::new().unwrap();
    let db = format!("sqlite://{}/fsm.db", temp_dir.path().display());

    let app = build_app(&test_config(server.url(), db)).await.unwrap();

    set_webhook.assert_async().await;
    assert_eq!(app.webhook_url, "https://example.com/tgupdates");
    assert_eq!(app.bot_username.as_deref(), Some("testbot"));

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value =
        serde_json::from_slice(&response.into_body().collect().await.unwrap().to_bytes()).unwrap();
    assert_eq!(body, json!({"pong": true}));

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tgupdates")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"update_id": 1}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    let body: Value =
        serde_json::from_slice(&response.into_body().collect().await.unwrap().to_bytes()).unwrap();
    assert_eq!(body, json!({"status": "error", "message": "Wrong secret token !"}));

    app.storage.close().await.unwrap();
}

/// **Test: A rejected setWebhook aborts startup.**
///
/// **Setup:** setWebhook answers 401.
/// **Action:** `build_app`.
/// **Expected:** Err mentioning webhook registration.
#[tokio::test]
async fn test_build_app_fails_when_registration_fails() {
    let mut server = mockito::Server::new_async().await;
    let _set_webhook = mock_set_webhook(
        &mut server,
        401,
        r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#,
    )
    .await;

    let result = build_app(&test_config(server.url(), "memory".to_string())).await;

    let err = result.err().unwrap();
    assert!(format!("{:#}", err).contains("Webhook registration failed"));
}

/// **Test: A bad state store URL aborts before the webhook is touched.**
///
/// **Setup:** STATE_STORE_URL with an unsupported scheme; setWebhook mock expecting no calls.
/// **Action:** `build_app`.
/// **Expected:** Err; setWebhook never called.
#[tokio::test]
async fn test_build_app_fails_on_bad_state_store() {
    let mut server = mockito::Server::new_async().await;
    let set_webhook = server
        .mock("POST", format!("/bot{}/setWebhook", TEST_BOT_TOKEN).as_str())
        .expect(0)
        .create_async()
        .await;

    let result = build_app(&test_config(server.url(), "mongodb://localhost/app".to_string())).await;

    assert!(result.is_err());
    set_webhook.assert_async().await;
}

/// **Test: Invalid config is rejected before any I/O.**
#[tokio::test]
async fn test_build_app_validates_config() {
    let mut config = test_config("http://127.0.0.1:1".to_string(), "memory".to_string());
    config.base_url = "not a url".to_string();

    assert!(build_app(&config).await.is_err());
}
