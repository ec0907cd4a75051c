use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Comment, Post};
use serde_json::Value;
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- posts ---

#[tokio::test]
async fn list_posts_returns_seed() {
    let resp = app().oneshot(empty_request("GET", "/posts")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let posts: Vec<Post> = body_json(resp).await;
    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0].id, 1);
}

#[tokio::test]
async fn get_post_by_id() {
    let resp = app().oneshot(empty_request("GET", "/posts/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let post: Post = body_json(resp).await;
    assert_eq!(post.id, 1);
    assert_eq!(post.user_id, 1);
}

#[tokio::test]
async fn get_missing_post_returns_404() {
    let resp = app().oneshot(empty_request("GET", "/posts/999")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_post_returns_201_with_next_id() {
    let resp = app()
        .oneshot(json_request("POST", "/posts", r#"{"title":"foo","body":"bar"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Post = body_json(resp).await;
    assert_eq!(post.id, 4);
    assert_eq!(post.title, "foo");
    assert_eq!(post.body, "bar");
}

#[tokio::test]
async fn create_post_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/posts", r#"{"not_title":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn patch_missing_post_returns_404() {
    let resp = app()
        .oneshot(json_request("PATCH", "/posts/42", r#"{"title":"x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- comments ---

#[tokio::test]
async fn comments_filter_by_post_id() {
    let resp = app()
        .oneshot(empty_request("GET", "/comments?postId=2"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let comments: Vec<Comment> = body_json(resp).await;
    assert_eq!(comments.len(), 2);
    assert!(comments.iter().all(|c| c.post_id == 2));
}

#[tokio::test]
async fn comments_without_filter_returns_all() {
    let resp = app().oneshot(empty_request("GET", "/comments")).await.unwrap();
    let comments: Vec<Comment> = body_json(resp).await;
    assert_eq!(comments.len(), 6);
}

// --- echo / status ---

#[tokio::test]
async fn echo_reflects_method_query_and_body() {
    let resp = app()
        .oneshot(json_request("PUT", "/echo?draft=true", r#"{"title":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echoed: Value = body_json(resp).await;
    assert_eq!(echoed["method"], "PUT");
    assert_eq!(echoed["query"]["draft"], "true");
    assert_eq!(echoed["headers"]["content-type"], "application/json");
    assert_eq!(echoed["body"]["title"], "x");
}

#[tokio::test]
async fn echo_without_body_reports_null() {
    let resp = app().oneshot(empty_request("DELETE", "/echo")).await.unwrap();
    let echoed: Value = body_json(resp).await;
    assert_eq!(echoed["method"], "DELETE");
    assert!(echoed["body"].is_null());
}

#[tokio::test]
async fn status_route_returns_requested_code() {
    let resp = app().oneshot(empty_request("GET", "/status/503")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], 503);
}

// --- full lifecycle on one app instance ---

#[tokio::test]
async fn post_lifecycle() {
    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/posts", r#"{"title":"Draft","userId":2}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Post = body_json(resp).await;
    let id = created.id;
    assert_eq!(created.user_id, 2);

    // patch title only
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PATCH",
            &format!("/posts/{id}"),
            r#"{"title":"Published"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let patched: Post = body_json(resp).await;
    assert_eq!(patched.title, "Published");
    assert_eq!(patched.user_id, 2);

    // put replaces everything
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/posts/{id}"),
            r#"{"title":"Replaced","body":"new"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let replaced: Post = body_json(resp).await;
    assert_eq!(replaced.title, "Replaced");
    assert_eq!(replaced.user_id, 1);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/posts/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"{}");

    // get after delete — 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/posts/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
