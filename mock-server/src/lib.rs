//! HTTP server used by the client's integration tests.
//!
//! Routes:
//! - `GET /echo` returns the query items as a JSON object.
//! - `POST /form` returns the form body as a JSON object plus the received
//!   content type.
//! - `POST /auth/token` issues a new bearer token.
//! - `POST /auth/expire` invalidates the current token.
//! - `GET /me` requires `Authorization: Bearer <current token>`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    /// Number of successful `/me` calls served so far, this one included.
    pub visits: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormEcho {
    pub content_type: Option<String>,
    pub fields: HashMap<String, String>,
}

#[derive(Default)]
pub struct AuthState {
    token: RwLock<Option<String>>,
    visits: AtomicUsize,
    issued: AtomicUsize,
}

impl AuthState {
    /// How many tokens `/auth/token` has handed out.
    pub fn tokens_issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

pub type Db = Arc<AuthState>;

pub fn app() -> Router {
    app_with_state(Db::default())
}

/// Like `app`, but lets the caller keep a handle on the auth state.
pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/echo", get(echo))
        .route("/form", post(form))
        .route("/auth/token", post(issue_token))
        .route("/auth/expire", post(expire_token))
        .route("/me", get(me))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, Db::default()).await
}

pub async fn serve(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

async fn echo(Query(items): Query<HashMap<String, String>>) -> Json<HashMap<String, String>> {
    Json(items)
}

async fn form(headers: HeaderMap, Form(fields): Form<HashMap<String, String>>) -> Json<FormEcho> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    Json(FormEcho {
        content_type,
        fields,
    })
}

async fn issue_token(State(db): State<Db>) -> (StatusCode, Json<Token>) {
    let access_token = Uuid::new_v4().to_string();
    *db.token.write().await = Some(access_token.clone());
    db.issued.fetch_add(1, Ordering::SeqCst);
    tracing::info!("issued new access token");
    (StatusCode::CREATED, Json(Token { access_token }))
}

async fn expire_token(State(db): State<Db>) -> StatusCode {
    *db.token.write().await = None;
    tracing::info!("access token expired");
    StatusCode::NO_CONTENT
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Profile>, StatusCode> {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    let current = db.token.read().await;
    match (presented, current.as_deref()) {
        (Some(presented), Some(current)) if presented == current => {
            let visits = db.visits.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Json(Profile {
                name: "octocat".to_string(),
                visits,
            }))
        }
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}
