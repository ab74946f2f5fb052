#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use mb_api::AppState;
use mb_auth_simple::SimpleIdentityProvider;
use mb_db_memory::MemoryStore;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

/// Router over a fresh in-memory store, plus the store for direct inspection.
pub fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let identity = Arc::new(SimpleIdentityProvider::new(SecretString::from(
        "test-pepper".to_string(),
    )));
    let state = AppState::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        identity,
    );
    (mb_api::app(state, &[]), store)
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

/// Registers a user and returns its uid.
pub async fn register(app: &Router, email: &str, username: &str) -> String {
    let (status, body) = post(
        app,
        "/auth/register",
        serde_json::json!({ "email": email, "password": "hunter22", "username": username }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["uid"].as_str().unwrap().to_string()
}
