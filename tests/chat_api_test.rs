
use axum::extract::ConnectInfo;
use axum::http::{header, Method, StatusCode};
use serde_json::json;
use std::net::SocketAddr;

use test_helpers::*;

/// A chat request arriving from `peer`, as the server's connection info sees it.
fn chat(message: &str, peer: &str) -> axum::http::Request<axum::body::Body> {
    let mut req = json_request(Method::POST, "/api/chat", &json!({ "message": message }), None);
    let addr: SocketAddr = format!("{peer}:40000").parse().expect("socket address");
    req.extensions_mut().insert(ConnectInfo(addr));
    req
}

fn chat_forwarded_for(message: &str, peer: &str, forwarded_for: &str) -> axum::http::Request<axum::body::Body> {
    let mut req = chat(message, peer);
    req.headers_mut()
        .insert("x-forwarded-for", forwarded_for.parse().expect("header value"));
    req
}

#[tokio::test]
async fn test_chat_replies_by_topic() {
    let app = spawn_app_with(
        bookit_api::Config {
            chat_rate_limit: 0,
            ..test_config()
        },
        std::sync::Arc::new(bookit_api::services::LogNotifier),
    );

    let cases = [
        ("hello there", "greeting"),
        ("how do I cancel", "cancellation"),
        ("How much does a ticket cost?", "booking"),
        ("asdkjasd", "fallback"),
    ];
    for (message, topic) in cases {
        let response = app.send(chat(message, "203.0.113.1")).await;
        assert_eq!(response.status(), StatusCode::OK, "{message}");
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["topic"], topic, "{message}");
        assert!(!body["message"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_chat_rejects_empty_and_oversized_messages() {
    let app = spawn_app();

    let response = app.send(chat("   ", "203.0.113.2")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Message is required");

    let response = app.send(chat(&"x".repeat(501), "203.0.113.2")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // No body at all is a validation error too, not a bare extractor rejection.
    let req = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{"))
        .unwrap();
    let response = app.send(req).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_chat_is_rate_limited_per_client() {
    // test_config allows 3 requests per window.
    let app = spawn_app();

    for _ in 0..3 {
        let response = app.send(chat("hi", "198.51.100.9")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.send(chat("hi", "198.51.100.9")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .headers()
        .get(header::RETRY_AFTER)
        .expect("Retry-After header")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
    assert_eq!(body_json(response).await["success"], false);

    // A different client still gets through.
    let response = app.send(chat("hi", "198.51.100.10")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_forwarded_for_cannot_reset_the_limit_by_default() {
    let app = spawn_app();

    let mut accepted = 0;
    for i in 0..20 {
        let response = app
            .send(chat_forwarded_for("hi", "192.0.2.50", &format!("10.9.0.{i}")))
            .await;
        if response.status() == StatusCode::OK {
            accepted += 1;
        } else {
            assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        }
    }
    assert_eq!(accepted, 3);
}

#[tokio::test]
async fn test_forwarded_for_names_the_client_behind_a_trusted_proxy() {
    let app = spawn_app_with(
        bookit_api::Config {
            trust_proxy_headers: true,
            ..test_config()
        },
        std::sync::Arc::new(bookit_api::services::LogNotifier),
    );

    for _ in 0..3 {
        let response = app.send(chat_forwarded_for("hi", "192.0.2.1", "203.0.113.20")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app.send(chat_forwarded_for("hi", "192.0.2.1", "203.0.113.20")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Same proxy, different client.
    let response = app.send(chat_forwarded_for("hi", "192.0.2.1", "203.0.113.21")).await;
    assert_eq!(response.status(), StatusCode::OK);
}
