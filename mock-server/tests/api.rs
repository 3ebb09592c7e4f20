use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_state, Db, FormEcho, Profile, Token};
use std::collections::HashMap;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn empty(method: &str, uri: &str) -> Request<String> {
    Request::builder().method(method).uri(uri).body(String::new()).unwrap()
}

fn bearer(uri: &str, token: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(String::new())
        .unwrap()
}

async fn issue(app: axum::Router) -> String {
    let resp = app.oneshot(empty("POST", "/auth/token")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let token: Token = body_json(resp).await;
    token.access_token
}

// --- echo ---

#[tokio::test]
async fn echo_returns_query_items() {
    let resp = app().oneshot(empty("GET", "/echo?a=a&b=8")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let items: HashMap<String, String> = body_json(resp).await;
    assert_eq!(items["a"], "a");
    assert_eq!(items["b"], "8");
}

#[tokio::test]
async fn echo_without_query_is_empty() {
    let resp = app().oneshot(empty("GET", "/echo")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let items: HashMap<String, String> = body_json(resp).await;
    assert!(items.is_empty());
}

// --- form ---

#[tokio::test]
async fn form_echoes_fields_and_content_type() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/form")
                .header(
                    http::header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded; charset=utf-8",
                )
                .body("a=a&b=b&c=8".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: FormEcho = body_json(resp).await;
    assert_eq!(
        echo.content_type.as_deref(),
        Some("application/x-www-form-urlencoded; charset=utf-8")
    );
    assert_eq!(echo.fields["c"], "8");
    assert_eq!(echo.fields.len(), 3);
}

#[tokio::test]
async fn form_rejects_missing_content_type() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/form")
                .body("a=a".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

// --- auth ---

#[tokio::test]
async fn me_without_token_is_unauthorized() {
    let resp = app().oneshot(empty("GET", "/me")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn me_with_current_token_returns_profile() {
    let app = app();
    let token = issue(app.clone()).await;

    let resp = app.oneshot(bearer("/me", &token)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let profile: Profile = body_json(resp).await;
    assert_eq!(profile.name, "octocat");
    assert_eq!(profile.visits, 1);
}

#[tokio::test]
async fn me_with_stale_token_is_unauthorized() {
    let app = app();
    let stale = issue(app.clone()).await;
    let _fresh = issue(app.clone()).await;

    let resp = app.oneshot(bearer("/me", &stale)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expire_invalidates_token() {
    let db = Db::default();
    let app = app_with_state(db.clone());
    let token = issue(app.clone()).await;

    let resp = app.clone().oneshot(empty("POST", "/auth/expire")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app.oneshot(bearer("/me", &token)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(db.tokens_issued(), 1);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let resp = app().oneshot(empty("GET", "/nope")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
