//! In-memory stand-in for the Forrst v2 API.
//!
//! Serves the JSON shapes the real service produces (string-typed counts,
//! `stat`/`resp` envelopes, embedded authors) from the seed data in
//! `fixtures/`. Comments can be added at runtime so tests can observe server
//! state changing between two otherwise identical reads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const RATE_LIMIT: u64 = 150;
pub const PAGE_SIZE: usize = 10;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Seeded records. Posts and comments reference their author by username;
/// the full user object is embedded when a response is rendered.
#[derive(Debug, Clone)]
pub struct Store {
    pub users: Vec<Value>,
    pub posts: Vec<Value>,
    pub comments: Vec<Value>,
}

impl Store {
    pub fn seeded() -> Self {
        Self {
            users: seed(include_str!("../fixtures/users.json")),
            posts: seed(include_str!("../fixtures/posts.json")),
            comments: seed(include_str!("../fixtures/comments.json")),
        }
    }

    fn user(&self, username: &str) -> Option<&Value> {
        self.users.iter().find(|u| u["username"] == username)
    }

    fn embed_user(&self, record: &Value) -> Value {
        let mut record = record.clone();
        if let Some(username) = record["user"].as_str() {
            record["user"] = self.user(username).cloned().unwrap_or(Value::Null);
        }
        record
    }
}

fn seed(raw: &str) -> Vec<Value> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
    calls: Arc<AtomicU64>,
}

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let state = AppState {
        store: Arc::new(RwLock::new(store)),
        calls: Arc::new(AtomicU64::new(0)),
    };
    Router::new()
        .route("/api/v2/stats", get(stats))
        .route("/api/v2/users/info", get(user_info))
        .route("/api/v2/users/posts", get(user_posts))
        .route("/api/v2/posts/list", get(post_list))
        .route("/api/v2/posts/all", get(all_posts))
        .route("/api/v2/posts/show", get(show_post))
        .route("/api/v2/posts/comments", get(post_comments).post(create_comment))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Error envelope: `{"stat": "fail", "resp": {"error": ...}}`.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    message: String,
}

impl Failure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = json!({"stat": "fail", "resp": {"error": self.message}});
        (self.status, Json(body)).into_response()
    }
}

type Reply = Result<Json<Value>, Failure>;

fn ok(resp: Value) -> Reply {
    Ok(Json(json!({"stat": "ok", "in": 0.0113, "authed": false, "env": "mock", "resp": resp})))
}

fn count_call(state: &AppState) -> u64 {
    state.calls.fetch_add(1, Ordering::SeqCst) + 1
}

fn parse_u64(params: &HashMap<String, String>, key: &str) -> Result<Option<u64>, Failure> {
    params
        .get(key)
        .map(|raw| {
            raw.parse()
                .map_err(|_| Failure::new(StatusCode::BAD_REQUEST, format!("invalid {key}")))
        })
        .transpose()
}

fn user_id(user: &Value) -> Option<u64> {
    user["id"].as_u64().or_else(|| user["id"].as_str()?.parse().ok())
}

fn post_id(post: &Value) -> u64 {
    post["id"].as_str().and_then(|s| s.parse().ok()).unwrap_or(0)
}

fn stat(post: &Value, key: &str) -> u64 {
    post[key].as_str().and_then(|s| s.parse().ok()).unwrap_or(0)
}

async fn stats(State(state): State<AppState>) -> Reply {
    let calls = count_call(&state);
    ok(json!({"rate_limit": RATE_LIMIT.to_string(), "calls_made": calls.to_string()}))
}

async fn user_info(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    count_call(&state);
    let store = state.store.read().await;
    let user = match (parse_u64(&params, "id")?, params.get("username")) {
        (Some(id), None) => store
            .users
            .iter()
            .find(|u| user_id(u) == Some(id)),
        (None, Some(username)) => store.user(username),
        _ => {
            return Err(Failure::new(
                StatusCode::BAD_REQUEST,
                "pass exactly one of id or username",
            ))
        }
    };
    let user = user.ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "user not found"))?;
    debug!(username = %user["username"], "users/info");
    ok(user.clone())
}

async fn user_posts(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    count_call(&state);
    let username = params
        .get("username")
        .ok_or_else(|| Failure::new(StatusCode::BAD_REQUEST, "username is required"))?;
    let limit = parse_u64(&params, "limit")?.map_or(PAGE_SIZE, |l| l as usize);
    let after = parse_u64(&params, "after")?;

    let store = state.store.read().await;
    if store.user(username).is_none() {
        return Err(Failure::new(StatusCode::NOT_FOUND, "user not found"));
    }
    let posts: Vec<Value> = store
        .posts
        .iter()
        .filter(|p| p["user"] == username.as_str())
        .filter(|p| params.get("type").map_or(true, |t| p["post_type"] == t.as_str()))
        .filter(|p| after.map_or(true, |a| post_id(p) < a))
        .take(limit)
        .map(|p| store.embed_user(p))
        .collect();
    ok(json!({"posts": posts}))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    post_type: Option<String>,
    sort: Option<String>,
    page: Option<usize>,
}

async fn post_list(State(state): State<AppState>, Query(params): Query<ListParams>) -> Reply {
    count_call(&state);
    let store = state.store.read().await;
    let mut posts: Vec<&Value> = store
        .posts
        .iter()
        .filter(|p| params.post_type.as_deref().map_or(true, |t| p["post_type"] == t))
        .collect();
    match params.sort.as_deref() {
        None | Some("recent") => posts.sort_by_key(|p| std::cmp::Reverse(post_id(p))),
        Some("popular") => posts.sort_by_key(|p| std::cmp::Reverse(stat(p, "like_count"))),
        Some("best") => posts.sort_by_key(|p| std::cmp::Reverse(stat(p, "comment_count"))),
        Some(other) => {
            return Err(Failure::new(
                StatusCode::BAD_REQUEST,
                format!("unknown sort {other}"),
            ))
        }
    }
    let page = params.page.unwrap_or(1).max(1);
    let posts: Vec<Value> = posts
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .map(|p| store.embed_user(p))
        .collect();
    ok(json!({"posts": posts}))
}

async fn all_posts(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    count_call(&state);
    let after = parse_u64(&params, "after")?;
    let store = state.store.read().await;
    let mut posts: Vec<&Value> = store
        .posts
        .iter()
        .filter(|p| after.map_or(true, |a| post_id(p) < a))
        .collect();
    posts.sort_by_key(|p| std::cmp::Reverse(post_id(p)));
    let posts: Vec<Value> = posts.into_iter().map(|p| store.embed_user(p)).collect();
    ok(json!({"posts": posts}))
}

async fn show_post(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    count_call(&state);
    let store = state.store.read().await;
    let post = match (parse_u64(&params, "id")?, params.get("tiny_id")) {
        (Some(id), None) => store.posts.iter().find(|p| post_id(p) == id),
        (None, Some(tiny_id)) => store.posts.iter().find(|p| p["tiny_id"] == tiny_id.as_str()),
        _ => return Err(Failure::new(StatusCode::BAD_REQUEST, "pass exactly one of id or tiny_id")),
    };
    let post = post.ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "post not found"))?;
    ok(store.embed_user(post))
}

async fn post_comments(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    count_call(&state);
    let id = parse_u64(&params, "id")?
        .ok_or_else(|| Failure::new(StatusCode::BAD_REQUEST, "id is required"))?;
    let store = state.store.read().await;
    if !store.posts.iter().any(|p| post_id(p) == id) {
        return Err(Failure::new(StatusCode::NOT_FOUND, "post not found"));
    }
    let comments: Vec<Value> = store
        .comments
        .iter()
        .filter(|c| c["post_id"].as_u64() == Some(id))
        .map(|c| store.embed_user(c))
        .collect();
    ok(json!({"comments": comments}))
}

#[derive(Debug, Deserialize)]
pub struct NewComment {
    pub username: String,
    pub body: String,
}

/// Not part of the public API; lets tests mutate server state.
async fn create_comment(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    Json(input): Json<NewComment>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    let id = parse_u64(&params, "id")?
        .ok_or_else(|| Failure::new(StatusCode::BAD_REQUEST, "id is required"))?;
    let mut store = state.store.write().await;
    if !store.posts.iter().any(|p| post_id(p) == id) {
        return Err(Failure::new(StatusCode::NOT_FOUND, "post not found"));
    }
    if store.user(&input.username).is_none() {
        return Err(Failure::new(StatusCode::BAD_REQUEST, "unknown user"));
    }
    let next_id = store.comments.iter().filter_map(|c| c["id"].as_u64()).max().unwrap_or(0) + 1;
    let now = chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string();
    let comment = json!({
        "id": next_id,
        "post_id": id,
        "user": input.username,
        "body": input.body,
        "created_at": now,
        "updated_at": now,
    });
    store.comments.push(comment.clone());
    let rendered = store.embed_user(&comment);
    Ok((StatusCode::CREATED, Json(json!({"stat": "ok", "resp": rendered}))))
}
