mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{bearer, test_app, test_router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

async fn send(
    router: &Router,
    method: &str,
    path: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app();
    let router = test_router(&app);

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn api_requires_a_valid_token() {
    let app = test_app();
    let router = test_router(&app);

    let (status, body) = send(&router, "GET", "/api/v1/conversations", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(
        &router,
        "GET",
        "/api/v1/conversations",
        Some("Bearer not-a-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn conversation_and_message_round_trip() {
    let app = test_app();
    let alice = app.users.add_user("alice");
    let bob = app.users.add_user("bob");
    let router = test_router(&app);
    let alice_auth = bearer(alice);
    let bob_auth = bearer(bob);

    // first contact
    let (status, conv) = send(
        &router,
        "GET",
        &format!("/api/v1/conversations/user/{bob}"),
        Some(&alice_auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conv["user"]["username"], "bob");
    assert_eq!(conv["lastMessage"], Value::Null);
    assert_eq!(conv["unread"], 0);
    let conv_id = conv["id"].as_str().unwrap().to_string();

    // send
    let (status, message) = send(
        &router,
        "POST",
        &format!("/api/v1/conversations/{conv_id}/messages"),
        Some(&alice_auth),
        Some(json!({ "text": "hello world" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["conversationId"], conv_id.as_str());
    assert_eq!(message["sender"]["username"], "alice");
    assert_eq!(message["text"], "hello world");
    assert_eq!(message["read"], false);
    assert!(message["createdAt"].is_string());

    // the recipient sees preview + unread
    let (status, list) = send(&router, "GET", "/api/v1/conversations", Some(&bob_auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["lastMessage"], "hello world");
    assert_eq!(list[0]["unread"], 1);
    assert_eq!(list[0]["user"]["username"], "alice");

    // opening the thread acknowledges it
    let (status, messages) = send(
        &router,
        "GET",
        &format!("/api/v1/conversations/{conv_id}/messages"),
        Some(&bob_auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages.as_array().unwrap().len(), 1);
    assert_eq!(messages[0]["read"], true);

    let (_, list) = send(&router, "GET", "/api/v1/conversations", Some(&bob_auth), None).await;
    assert_eq!(list[0]["unread"], 0);

    // nothing left to mark
    let (status, marked) = send(
        &router,
        "PUT",
        &format!("/api/v1/conversations/{conv_id}/read"),
        Some(&bob_auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(marked["count"], 0);
}

#[tokio::test]
async fn invalid_requests_map_to_the_documented_statuses() {
    let app = test_app();
    let alice = app.users.add_user("alice");
    let bob = app.users.add_user("bob");
    let carol = app.users.add_user("carol");
    let router = test_router(&app);
    let alice_auth = bearer(alice);

    // self chat
    let (status, body) = send(
        &router,
        "GET",
        &format!("/api/v1/conversations/user/{alice}"),
        Some(&alice_auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ARGUMENT");

    // unknown user
    let (status, body) = send(
        &router,
        "GET",
        &format!("/api/v1/conversations/user/{}", Uuid::new_v4()),
        Some(&alice_auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (_, conv) = send(
        &router,
        "GET",
        &format!("/api/v1/conversations/user/{bob}"),
        Some(&alice_auth),
        None,
    )
    .await;
    let conv_id = conv["id"].as_str().unwrap().to_string();

    // empty text
    let (status, body) = send(
        &router,
        "POST",
        &format!("/api/v1/conversations/{conv_id}/messages"),
        Some(&alice_auth),
        Some(json!({ "text": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ARGUMENT");

    // outsider
    let carol_auth = bearer(carol);
    let (status, body) = send(
        &router,
        "POST",
        &format!("/api/v1/conversations/{conv_id}/messages"),
        Some(&carol_auth),
        Some(json!({ "text": "let me in" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}
