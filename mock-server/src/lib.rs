use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub post_id: u64,
    pub id: u64,
    pub name: String,
    pub email: String,
    pub body: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    #[serde(default = "default_user")]
    pub user_id: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    pub user_id: Option<u64>,
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentFilter {
    pub post_id: Option<u64>,
}

#[derive(Deserialize)]
pub struct Delay {
    #[serde(default)]
    pub ms: u64,
}

fn default_user() -> u64 {
    1
}

pub type Db = Arc<RwLock<BTreeMap<u64, Post>>>;

#[derive(Clone)]
pub struct AppState {
    posts: Db,
    comments: Arc<Vec<Comment>>,
}

/// Headers reflected back by `/echo`.
const ECHOED_HEADERS: &[&str] = &["accept", "content-type", "authorization", "x-request-id"];

pub fn app() -> Router {
    let state = AppState {
        posts: Arc::new(RwLock::new(seed_posts())),
        comments: Arc::new(seed_comments()),
    };
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post)
                .put(replace_post)
                .patch(update_post)
                .delete(delete_post),
        )
        .route("/comments", get(list_comments))
        .route("/echo", any(echo))
        .route("/slow", get(slow))
        .route("/status/{code}", any(status))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;

/// Resolve the listen port from the raw `PORT` value.
pub fn listen_port(raw: Option<&str>) -> Result<u16, std::io::Error> {
    match raw {
        None => Ok(DEFAULT_PORT),
        Some(value) => value.trim().parse::<u16>().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid PORT {value:?}: {e}"),
            )
        }),
    }
}

fn seed_posts() -> BTreeMap<u64, Post> {
    let titles = [
        "sunt aut facere repellat provident",
        "qui est esse",
        "ea molestias quasi exercitationem",
    ];
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let id = i as u64 + 1;
            let post = Post {
                user_id: 1,
                id,
                title: title.to_string(),
                body: format!("body of post {id}"),
            };
            (id, post)
        })
        .collect()
}

fn seed_comments() -> Vec<Comment> {
    (1..=6)
        .map(|id| {
            let post_id = (id - 1) / 2 + 1;
            Comment {
                post_id,
                id,
                name: format!("comment {id}"),
                email: format!("user{id}@example.com"),
                body: format!("comment {id} on post {post_id}"),
            }
        })
        .collect()
}

async fn list_posts(State(state): State<AppState>) -> Json<Vec<Post>> {
    let posts = state.posts.read().await;
    Json(posts.values().cloned().collect())
}

async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<NewPost>,
) -> (StatusCode, Json<Post>) {
    let mut posts = state.posts.write().await;
    let id = posts.keys().next_back().copied().unwrap_or(0) + 1;
    let post = Post {
        user_id: input.user_id,
        id,
        title: input.title,
        body: input.body,
    };
    posts.insert(id, post.clone());
    (StatusCode::CREATED, Json(post))
}

async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Post>, StatusCode> {
    let posts = state.posts.read().await;
    posts.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn replace_post(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<NewPost>,
) -> Result<Json<Post>, StatusCode> {
    let mut posts = state.posts.write().await;
    let post = posts.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    *post = Post {
        user_id: input.user_id,
        id,
        title: input.title,
        body: input.body,
    };
    Ok(Json(post.clone()))
}

async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<PostPatch>,
) -> Result<Json<Post>, StatusCode> {
    let mut posts = state.posts.write().await;
    let post = posts.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(user_id) = input.user_id {
        post.user_id = user_id;
    }
    if let Some(title) = input.title {
        post.title = title;
    }
    if let Some(body) = input.body {
        post.body = body;
    }
    Ok(Json(post.clone()))
}

async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, StatusCode> {
    let mut posts = state.posts.write().await;
    posts
        .remove(&id)
        .map(|_| Json(json!({})))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn list_comments(
    State(state): State<AppState>,
    Query(filter): Query<CommentFilter>,
) -> Json<Vec<Comment>> {
    let comments = state
        .comments
        .iter()
        .filter(|c| filter.post_id.map_or(true, |post_id| c.post_id == post_id))
        .cloned()
        .collect();
    Json(comments)
}

/// Reflect the request back so clients can check what actually went over
/// the wire.
async fn echo(
    method: Method,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Json<Value> {
    let echoed: HashMap<&str, &str> = ECHOED_HEADERS
        .iter()
        .filter_map(|name| {
            headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .map(|v| (*name, v))
        })
        .collect();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    Json(json!({
        "method": method.as_str(),
        "query": query,
        "headers": echoed,
        "body": body,
    }))
}

async fn slow(Query(delay): Query<Delay>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(delay.ms)).await;
    Json(json!({ "slept": delay.ms }))
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(json!({ "status": code }))))
}
