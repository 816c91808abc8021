//! End-to-end behaviour of the posts resource, driven through the router
//! without a socket.

use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use posts::model::{NewPost, Post, PostFilter};
use posts::store::{MemoryStore, PostStore, SharedStore, StoreError};
use posts::{Method, Request, Response, Router, api};

const JSON: &str = "application/json";

struct App {
    router: Router<SharedStore>,
    store: SharedStore,
}

impl App {
    async fn seed(&self, posts: &[(&str, &str)]) -> Vec<Post> {
        let mut out = Vec::new();
        for (title, body) in posts {
            out.push(self.store.insert(NewPost::new(*title, *body)).await.unwrap());
        }
        out
    }

    async fn send(&self, req: Request) -> Response {
        self.router.handle(req).await
    }

    async fn get_json(&self, target: &str) -> Response {
        self.send(Request::builder(Method::Get, target).header("accept", JSON).build()).await
    }

    async fn write_json(&self, method: Method, target: &str, payload: &Value) -> Response {
        let req = Request::builder(method, target)
            .header("accept", JSON)
            .header("content-type", JSON)
            .body(serde_json::to_vec(payload).unwrap())
            .build();
        self.send(req).await
    }
}

#[fixture]
fn app() -> App {
    let store = MemoryStore::shared();
    App { router: api::router(store.clone()), store }
}

fn json_body(res: &Response) -> Value {
    assert_eq!(res.header("content-type"), Some(JSON));
    serde_json::from_slice(res.body()).unwrap()
}

fn message(res: &Response) -> String {
    json_body(res)["message"].as_str().unwrap().to_owned()
}

// ── list ──────────────────────────────────────────────────────────────────────

#[rstest]
#[tokio::test]
async fn get_empty_posts(app: App) {
    let res = app.get_json("/api/posts").await;

    assert_eq!(res.code(), StatusCode::OK);
    assert_eq!(json_body(&res), json!([]));
}

#[rstest]
#[tokio::test]
async fn get_posts_in_id_order(app: App) {
    app.seed(&[("Example Post A", "Just a test"), ("Example Post B", "Still a test")]).await;

    let res = app.get_json("/api/posts").await;

    assert_eq!(res.code(), StatusCode::OK);
    assert_eq!(
        json_body(&res),
        json!([
            {"id": 1, "title": "Example Post A", "body": "Just a test"},
            {"id": 2, "title": "Example Post B", "body": "Still a test"},
        ]),
    );
}

#[rstest]
#[tokio::test]
async fn get_posts_with_title(app: App) {
    app.seed(&[
        ("Post with bells", "Just a test"),
        ("Post with whistles", "Still a test"),
        ("Post with bells and whistles", "Another test"),
    ])
    .await;

    let res = app.get_json("/api/posts?title_like=whistles").await;

    assert_eq!(res.code(), StatusCode::OK);
    assert_eq!(
        json_body(&res),
        json!([
            {"id": 2, "title": "Post with whistles", "body": "Still a test"},
            {"id": 3, "title": "Post with bells and whistles", "body": "Another test"},
        ]),
    );
}

#[rstest]
#[tokio::test]
async fn get_posts_with_title_and_body(app: App) {
    app.seed(&[
        ("Post with bells", "whistles"),
        ("Post with whistles", "bells"),
        ("Post with bells and whistles", "bells and whistles"),
    ])
    .await;

    let res = app.get_json("/api/posts?title_like=whistles&body_like=bells").await;

    let titles: Vec<Value> = json_body(&res)
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].clone())
        .collect();
    assert_eq!(titles, vec![json!("Post with whistles"), json!("Post with bells and whistles")]);
}

#[rstest]
#[tokio::test]
async fn filters_are_case_sensitive_and_decoded(app: App) {
    app.seed(&[("Bells ring", ""), ("bells and whistles", "")]).await;

    let res = app.get_json("/api/posts?title_like=bells%20and").await;
    assert_eq!(json_body(&res).as_array().unwrap().len(), 1);

    let res = app.get_json("/api/posts?title_like=").await;
    assert_eq!(json_body(&res).as_array().unwrap().len(), 2);
}

#[rstest]
#[case("application/xml")]
#[case("text/html")]
#[tokio::test]
async fn unsupported_accept_header(app: App, #[case] accept: &str) {
    let req = Request::builder(Method::Get, "/api/posts").header("accept", accept).build();
    let res = app.send(req).await;

    assert_eq!(res.code(), StatusCode::NOT_ACCEPTABLE);
    assert_eq!(message(&res), "Request must accept application/json data");
}

// ── get ───────────────────────────────────────────────────────────────────────

#[rstest]
#[tokio::test]
async fn get_post(app: App) {
    let seeded = app.seed(&[("Example Post A", "Just a test"), ("Example Post B", "Still a test")]).await;

    let res = app.get_json(&format!("/api/posts/{}", seeded[1].id)).await;

    assert_eq!(res.code(), StatusCode::OK);
    assert_eq!(json_body(&res), json!({"id": 2, "title": "Example Post B", "body": "Still a test"}));
}

#[rstest]
#[tokio::test]
async fn get_non_existent_post(app: App) {
    // No Accept header: get has no negotiation guard.
    let res = app.send(Request::builder(Method::Get, "/api/posts/1").build()).await;

    assert_eq!(res.code(), StatusCode::NOT_FOUND);
    assert_eq!(message(&res), "Could not find post with id 1");
}

#[rstest]
#[case("/api/posts/abc")]
#[case("/api/posts/-1")]
#[tokio::test]
async fn non_integer_id_is_a_route_miss(app: App, #[case] target: &str) {
    let res = app.get_json(target).await;

    assert_eq!(res.code(), StatusCode::NOT_FOUND);
    assert_eq!(message(&res), format!("No route for GET {target}"));
}

#[rstest]
#[tokio::test]
async fn oversized_id_is_not_found(app: App) {
    let res = app.get_json("/api/posts/99999999999999999999").await;

    assert_eq!(res.code(), StatusCode::NOT_FOUND);
    assert_eq!(message(&res), "Could not find post with id 99999999999999999999");
}

// ── create ────────────────────────────────────────────────────────────────────

#[rstest]
#[tokio::test]
async fn post_post(app: App) {
    let res = app
        .write_json(Method::Post, "/api/posts", &json!({"title": "Example Post", "body": "Just a test"}))
        .await;

    assert_eq!(res.code(), StatusCode::CREATED);
    assert_eq!(res.header("location"), Some("/api/posts/1"));
    assert_eq!(json_body(&res), json!({"id": 1, "title": "Example Post", "body": "Just a test"}));

    let stored = app.store.list(&PostFilter::default()).await.unwrap();
    assert_eq!(stored, vec![Post { id: 1, title: "Example Post".into(), body: "Just a test".into() }]);
}

#[rstest]
#[tokio::test]
async fn created_post_round_trips(app: App) {
    let created = app
        .write_json(Method::Post, "/api/posts", &json!({"title": "", "body": "", "extra": true}))
        .await;
    let location = created.header("location").unwrap().to_owned();

    let fetched = app.get_json(&location).await;

    assert_eq!(json_body(&fetched), json_body(&created));
    assert_eq!(json_body(&fetched), json!({"id": 1, "title": "", "body": ""}));
}

#[rstest]
#[tokio::test]
async fn unsupported_mimetype(app: App) {
    let req = Request::builder(Method::Post, "/api/posts")
        .header("accept", JSON)
        .header("content-type", "application/xml")
        .body(r#""<xml></xml>""#)
        .build();
    let res = app.send(req).await;

    assert_eq!(res.code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(message(&res), "Request must contain application/json data");
}

#[rstest]
#[tokio::test]
async fn accept_is_checked_before_content_type(app: App) {
    let req = Request::builder(Method::Post, "/api/posts")
        .header("accept", "application/xml")
        .header("content-type", "application/xml")
        .build();

    assert_eq!(app.send(req).await.code(), StatusCode::NOT_ACCEPTABLE);
}

#[rstest]
#[case(json!({"title": "Example Post", "body": 32}), "32 is not of type 'string'")]
#[case(json!({"title": "Example Post"}), "'body' is a required property")]
#[case(json!("<xml></xml>"), "'<xml></xml>' is not of type 'object'")]
#[tokio::test]
async fn invalid_data(app: App, #[case] payload: Value, #[case] expected: &str) {
    let res = app.write_json(Method::Post, "/api/posts", &payload).await;

    assert_eq!(res.code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(message(&res), expected);
    assert!(app.store.list(&PostFilter::default()).await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn malformed_json(app: App) {
    let req = Request::builder(Method::Post, "/api/posts")
        .header("accept", JSON)
        .header("content-type", JSON)
        .body("{\"title\": ")
        .build();
    let res = app.send(req).await;

    assert_eq!(res.code(), StatusCode::BAD_REQUEST);
    assert!(message(&res).starts_with("Failed to decode JSON object: "));
}

// ── update ────────────────────────────────────────────────────────────────────

#[rstest]
#[tokio::test]
async fn update_post(app: App) {
    let created = app.write_json(Method::Post, "/api/posts", &json!({"title": "", "body": ""})).await;
    assert_eq!(created.header("location"), Some("/api/posts/1"));

    let res = app
        .write_json(
            Method::Put,
            "/api/posts/1",
            &json!({"title": "New Post Title", "body": "New Post Content"}),
        )
        .await;

    assert_eq!(res.code(), StatusCode::OK);
    assert_eq!(res.header("location"), Some("/api/posts/1"));
    assert_eq!(
        app.store.list(&PostFilter::default()).await.unwrap(),
        vec![Post { id: 1, title: "New Post Title".into(), body: "New Post Content".into() }],
    );
}

#[rstest]
#[tokio::test]
async fn update_missing_post(app: App) {
    let res = app.write_json(Method::Put, "/api/posts/4", &json!({"title": "t", "body": "b"})).await;

    assert_eq!(res.code(), StatusCode::NOT_FOUND);
    assert_eq!(message(&res), "Could not find post with id 4");
}

#[rstest]
#[tokio::test]
async fn update_validates_payload(app: App) {
    app.seed(&[("t", "b")]).await;

    let res = app.write_json(Method::Put, "/api/posts/1", &json!({"title": 7, "body": "b"})).await;

    assert_eq!(res.code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(message(&res), "7 is not of type 'string'");
    assert_eq!(app.store.get(1).await.unwrap().unwrap().title, "t");
}

// ── delete ────────────────────────────────────────────────────────────────────

#[rstest]
#[tokio::test]
async fn delete_post(app: App) {
    app.seed(&[("Example Post", "Just a test")]).await;
    assert_eq!(json_body(&app.get_json("/api/posts").await).as_array().unwrap().len(), 1);

    let req = Request::builder(Method::Post, "/api/posts/1/delete").header("accept", JSON).build();
    let res = app.send(req).await;

    assert_eq!(res.code(), StatusCode::OK);
    assert_eq!(json_body(&res), json!({"id": 1, "title": "Example Post", "body": "Just a test"}));
    assert_eq!(json_body(&app.get_json("/api/posts").await), json!([]));
}

#[rstest]
#[tokio::test]
async fn delete_missing_post(app: App) {
    let req = Request::builder(Method::Post, "/api/posts/1/delete").header("accept", JSON).build();
    let res = app.send(req).await;

    assert_eq!(res.code(), StatusCode::NOT_FOUND);
    assert_eq!(message(&res), "Could not find post with id 1");
}

#[rstest]
#[tokio::test]
async fn delete_requires_json_accept(app: App) {
    app.seed(&[("keep", "me")]).await;

    let req = Request::builder(Method::Post, "/api/posts/1/delete").header("accept", "text/plain").build();
    let res = app.send(req).await;

    assert_eq!(res.code(), StatusCode::NOT_ACCEPTABLE);
    assert!(app.store.get(1).await.unwrap().is_some());
}

// ── routing & health ─────────────────────────────────────────────────────────

#[rstest]
#[tokio::test]
async fn wrong_method_is_405(app: App) {
    let res = app.send(Request::builder(Method::Delete, "/api/posts/1").build()).await;

    assert_eq!(res.code(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(message(&res), "Method DELETE not allowed for /api/posts/1");
}

#[rstest]
#[case("/healthz", json!({"status": "ok"}))]
#[case("/readyz", json!({"status": "ready"}))]
#[tokio::test]
async fn health_probes(app: App, #[case] path: &str, #[case] expected: Value) {
    let res = app.send(Request::builder(Method::Get, path).build()).await;

    assert_eq!(res.code(), StatusCode::OK);
    assert_eq!(json_body(&res), expected);
}

// ── store failures ───────────────────────────────────────────────────────────

struct BrokenStore;

#[async_trait]
impl PostStore for BrokenStore {
    async fn insert(&self, _: NewPost) -> Result<Post, StoreError> { Err(down()) }
    async fn get(&self, _: i64) -> Result<Option<Post>, StoreError> { Err(down()) }
    async fn list(&self, _: &PostFilter) -> Result<Vec<Post>, StoreError> { Err(down()) }
    async fn update(&self, _: i64, _: NewPost) -> Result<Option<Post>, StoreError> { Err(down()) }
    async fn delete(&self, _: i64) -> Result<Option<Post>, StoreError> { Err(down()) }
}

fn down() -> StoreError {
    StoreError::Unavailable("connection refused".into())
}

#[tokio::test]
async fn store_failure_is_a_generic_500() {
    let store: SharedStore = Arc::new(BrokenStore);
    let app = App { router: api::router(store.clone()), store };

    let res = app.get_json("/api/posts").await;
    assert_eq!(res.code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(message(&res), "Internal server error");

    let res = app.send(Request::builder(Method::Get, "/readyz").build()).await;
    assert_eq!(res.code(), StatusCode::SERVICE_UNAVAILABLE);
}
