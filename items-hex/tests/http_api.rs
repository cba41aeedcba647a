//! Integration tests for the HTTP surface.
//!
//! These tests drive the full router (auth middleware, rate limiting,
//! CORS, handlers) against an in-memory SQLite repository.

use std::net::SocketAddr;

use axum::{
    Router,
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{Method, Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use items_hex::{AuthGate, ItemService, inbound::HttpServer};
use items_repo::SqliteRepo;
use serde_json::{Value, json};
use tower::ServiceExt;

const TOKEN: &str = "secret-token";

/// Helper to create a router backed by a fresh in-memory database.
async fn create_app() -> Router {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    let server = HttpServer::new(ItemService::new(repo), AuthGate::default());
    server.router()
}

fn with_peer(app: Router, ip: [u8; 4]) -> Router {
    app.layer(MockConnectInfo(SocketAddr::from((ip, 40000))))
}

fn token_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "username={}&password={}",
            username, password
        )))
        .unwrap()
}

fn authed(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn create_item(app: &Router, name: &str, description: &str) -> Value {
    let response = app
        .clone()
        .oneshot(authed(
            Method::POST,
            &format!("/items/?name={}&description={}", name, description),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ─────────────────────────────────────────────────────────────────────────────
// Token issuance
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_token_with_valid_credentials() {
    let app = create_app().await;

    let response = app.oneshot(token_request("admin", "password")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"access_token": "secret-token", "token_type": "bearer"})
    );
}

#[tokio::test]
async fn test_token_with_invalid_credentials() {
    let app = create_app().await;

    let response = app.oneshot(token_request("admin", "nope")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"detail": "Invalid credentials"})
    );
}

#[tokio::test]
async fn test_token_with_missing_field() {
    let app = create_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=admin"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(response).await["detail"].is_string());
}

#[tokio::test]
async fn test_token_route_is_rate_limited_per_client() {
    let app = with_peer(create_app().await, [10, 0, 0, 1]);

    for i in 1..=5 {
        let response = app
            .clone()
            .oneshot(token_request("admin", "password"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "request {} admitted", i);
    }

    let response = app
        .clone()
        .oneshot(token_request("admin", "password"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[header::RETRY_AFTER], "60");
    assert_eq!(
        body_json(response).await,
        json!({"detail": "Rate limit exceeded"})
    );
}

#[tokio::test]
async fn test_failed_logins_count_toward_the_limit() {
    let app = with_peer(create_app().await, [10, 0, 0, 2]);

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(token_request("admin", "wrong"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .oneshot(token_request("admin", "password"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rate_limit_does_not_apply_to_items() {
    let app = with_peer(create_app().await, [10, 0, 0, 3]);

    for _ in 0..10 {
        let response = app
            .clone()
            .oneshot(authed(Method::GET, "/items/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_items_require_token() {
    let app = create_app().await;

    let request = Request::builder()
        .uri("/items/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    assert_eq!(
        body_json(response).await,
        json!({"detail": "Not authenticated"})
    );
}

#[tokio::test]
async fn test_items_reject_wrong_token() {
    let app = create_app().await;

    let request = Request::builder()
        .uri("/items/1")
        .header(header::AUTHORIZATION, "Bearer not-the-token")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    assert_eq!(
        body_json(response).await,
        json!({"detail": "Invalid authentication credentials"})
    );
}

#[tokio::test]
async fn test_bearer_scheme_without_token_is_invalid() {
    let app = create_app().await;

    let request = Request::builder()
        .uri("/items/")
        .header(header::AUTHORIZATION, "Bearer")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        json!({"detail": "Invalid authentication credentials"})
    );
}

#[tokio::test]
async fn test_public_endpoints_need_no_token() {
    let app = create_app().await;

    let health = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body_json(health).await, json!({"status": "healthy"}));

    let docs = app
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(docs.status(), StatusCode::OK);
    assert!(body_json(docs).await["paths"]["/token"].is_object());
}

// ─────────────────────────────────────────────────────────────────────────────
// Items
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_end_to_end_item_lifecycle() {
    let app = create_app().await;

    let token = body_json(
        app.clone()
            .oneshot(token_request("admin", "password"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(token["access_token"], TOKEN);

    let created = create_item(&app, "widget", "a%20widget").await;
    let id = created["id"].as_i64().expect("integer id");
    assert_eq!(created["name"], "widget");
    assert_eq!(created["description"], "a widget");

    let fetched = app
        .clone()
        .oneshot(authed(Method::GET, &format!("/items/{}", id)))
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(body_json(fetched).await, created);

    let updated = app
        .clone()
        .oneshot(authed(
            Method::PUT,
            &format!("/items/{}?name=gadget&description=a%20widget", id),
        ))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    assert_eq!(
        body_json(updated).await,
        json!({"id": id, "name": "gadget", "description": "a widget"})
    );

    let deleted = app
        .clone()
        .oneshot(authed(Method::DELETE, &format!("/items/{}", id)))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(
        body_json(deleted).await,
        json!({"message": "Item deleted"})
    );

    let gone = app
        .oneshot(authed(Method::GET, &format!("/items/{}", id)))
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(gone).await, json!({"detail": "Item not found"}));
}

#[tokio::test]
async fn test_create_item_from_json_body() {
    let app = create_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/items/")
        .header(header::AUTHORIZATION, format!("Bearer {}", TOKEN))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name": "widget", "description": "a widget"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "widget");
    assert_eq!(body["description"], "a widget");
}

#[tokio::test]
async fn test_create_item_missing_fields() {
    let app = create_app().await;

    let response = app
        .oneshot(authed(Method::POST, "/items/?name=widget"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(response).await["detail"].is_string());
}

#[tokio::test]
async fn test_list_items_without_trailing_slash() {
    let app = create_app().await;
    create_item(&app, "a", "first").await;
    create_item(&app, "b", "second").await;

    let response = app
        .oneshot(authed(Method::GET, "/items"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_item_is_404() {
    let app = create_app().await;

    for request in [
        authed(Method::GET, "/items/999"),
        authed(Method::PUT, "/items/999?name=n&description=d"),
        authed(Method::DELETE, "/items/999"),
    ] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "Item not found"})
        );
    }
}

#[tokio::test]
async fn test_non_integer_id_is_422() {
    let app = create_app().await;

    let response = app
        .oneshot(authed(Method::GET, "/items/abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await,
        json!({"detail": "Invalid item id"})
    );
}

#[tokio::test]
async fn test_update_checks_item_id_before_fields() {
    let app = create_app().await;

    let response = app
        .oneshot(authed(Method::PUT, "/items/abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await,
        json!({"detail": "Invalid item id"})
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// CORS
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let app = create_app().await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/items/")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,x-custom")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "DELETE");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "authorization,x-custom"
    );
}

#[tokio::test]
async fn test_cors_ignores_other_origins() {
    let app = create_app().await;

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn test_cors_preflight_from_other_origin_is_rejected() {
    let app = create_app().await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/items/")
        .header(header::ORIGIN, "http://evil.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(
        response
            .headers()
            .keys()
            .all(|name| !name.as_str().starts_with("access-control-"))
    );
    assert_eq!(
        body_json(response).await,
        json!({"detail": "Disallowed CORS origin"})
    );
}

#[tokio::test]
async fn test_cors_origin_is_configurable() {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    let app = HttpServer::new(ItemService::new(repo), AuthGate::default())
        .with_allowed_origin("https://app.example")
        .unwrap()
        .router();

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://app.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example"
    );
}
