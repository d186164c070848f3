mod common;

use huddle_gateway::token::{SessionTokenStore, TokenData, TokenStore};
use huddle_gateway::Config;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::capture_logs;

fn config(server: &MockServer) -> Config {
    Config::from_values(server.uri(), Some(5), None, None, None)
}

#[tokio::test]
async fn refresh_stores_issued_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refreshToken": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"token": "a2", "refreshToken": "r2"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = SessionTokenStore::new(
        &config(&server),
        Some(TokenData::new("a1", Some("r1".into()))),
    )
    .unwrap();

    assert_eq!(store.refresh_access_token("r1").await.unwrap().as_deref(), Some("a2"));
    assert_eq!(store.get_token().await.unwrap().as_deref(), Some("a2"));
    assert_eq!(
        store.get_token_data().await.unwrap(),
        Some(TokenData::new("a2", Some("r2".into())))
    );
}

#[tokio::test]
async fn bare_response_keeps_previous_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "a2"})))
        .mount(&server)
        .await;

    let store = SessionTokenStore::new(
        &config(&server),
        Some(TokenData::new("a1", Some("r1".into()))),
    )
    .unwrap();

    assert_eq!(store.refresh_access_token("r1").await.unwrap().as_deref(), Some("a2"));
    let data = store.get_token_data().await.unwrap().unwrap();
    assert_eq!(data.refresh_token.as_deref(), Some("r1"));
}

#[tokio::test]
async fn rejection_returns_none_and_keeps_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(403).set_body_string("refresh token revoked"))
        .mount(&server)
        .await;

    let store = SessionTokenStore::new(
        &config(&server),
        Some(TokenData::new("a1", Some("r1".into()))),
    )
    .unwrap();

    assert_eq!(store.refresh_access_token("r1").await.unwrap(), None);
    assert_eq!(store.get_token().await.unwrap().as_deref(), Some("a1"));

    store.remove_token().await.unwrap();
    assert_eq!(store.get_token_data().await.unwrap(), None);
}

#[tokio::test]
async fn unsuccessful_envelope_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "expired refresh token"
        })))
        .mount(&server)
        .await;

    let store = SessionTokenStore::new(&config(&server), None).unwrap();
    assert_eq!(store.refresh_access_token("r1").await.unwrap(), None);
}

#[tokio::test]
async fn gateway_refreshes_through_session_store() {
    use std::sync::Arc;

    use huddle_gateway::Gateway;
    use serde_json::Value;
    use wiremock::matchers::header;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"token": "a2"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .and(header("Authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .and(header("Authorization", "Bearer a2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(SessionTokenStore::new(&config(&server), None).unwrap());
    store
        .set_tokens(TokenData::new("a1", Some("r1".into())))
        .await;
    let gateway = Gateway::builder(config(&server))
        .token_store(store.clone())
        .build()
        .unwrap();

    let data = gateway.get_envelope("/events").await.unwrap();
    assert_eq!(data, Some(Value::Array(vec![])));
    assert_eq!(store.get_token().await.unwrap().as_deref(), Some("a2"));
}

#[tokio::test]
async fn unreadable_token_payload_is_logged_and_refused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"session": "a2"}
        })))
        .mount(&server)
        .await;

    let store = SessionTokenStore::new(&config(&server), Some(TokenData::new("a1", Some("r1".into()))))
        .unwrap();
    let (lines, guard) = capture_logs();
    let refreshed = store.refresh_access_token("r1").await.unwrap();
    drop(guard);

    assert_eq!(refreshed, None);
    assert_eq!(store.get_token().await.unwrap().as_deref(), Some("a1"));
    let logs = lines.lock().unwrap().clone();
    assert!(
        logs.iter()
            .any(|l| l.contains("WARN") && l.contains("token refresh response unreadable")),
        "got: {:?}",
        logs
    );
}
