//! The `/api/posts` resource.
//!
//! | Method | Path                     | Handler         |
//! |--------|--------------------------|-----------------|
//! | GET    | `/api/posts`             | [`list_posts`]  |
//! | POST   | `/api/posts`             | [`create_post`] |
//! | GET    | `/api/posts/{id}`        | [`get_post`]    |
//! | PUT    | `/api/posts/{id}`        | [`update_post`] |
//! | POST   | `/api/posts/{id}/delete` | [`delete_post`] |
//!
//! Write routes check `Accept` before `Content-Type`, then decode, then
//! validate. `get_post` has no `Accept` guard.

use http::StatusCode;
use http::header::LOCATION;
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::health;
use crate::middleware::negotiation::{self, JSON};
use crate::model::{NewPost, Post, PostFilter};
use crate::request::Request;
use crate::response::{Json, Response};
use crate::router::Router;
use crate::store::SharedStore;
use crate::validation::validate_post;

pub const POSTS_PATH: &str = "/api/posts";

/// Builds the full application router around `store`, health probes included.
pub fn router(store: SharedStore) -> Router<SharedStore> {
    Router::new(store)
        .get(POSTS_PATH, list_posts)
        .post(POSTS_PATH, create_post)
        .get("/api/posts/{id}", get_post)
        .put("/api/posts/{id}", update_post)
        .post("/api/posts/{id}/delete", delete_post)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness)
}

/// Path of the get-by-id route for `id`.
pub fn post_location(id: i64) -> String {
    format!("{POSTS_PATH}/{id}")
}

/// `GET /api/posts?title_like=..&body_like=..`
pub async fn list_posts(req: Request, store: SharedStore) -> Result<Json<Vec<Post>>, ApiError> {
    negotiation::accept(&req, JSON)?;

    let filter = PostFilter {
        title_like: non_empty_query(&req, "title_like"),
        body_like: non_empty_query(&req, "body_like"),
    };
    Ok(Json(store.list(&filter).await?))
}

/// `GET /api/posts/{id}`
pub async fn get_post(req: Request, store: SharedStore) -> Result<Json<Post>, ApiError> {
    let id = post_id(&req)?;
    store.get(id).await?.map(Json).ok_or_else(|| ApiError::not_found(id))
}

/// `POST /api/posts`
pub async fn create_post(req: Request, store: SharedStore) -> Result<Response, ApiError> {
    let new_post = json_payload(&req)?;

    let post = store.insert(new_post).await?;
    info!(id = post.id, "post created");
    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .header(LOCATION.as_str(), &post_location(post.id))
        .json(&post))
}

/// `PUT /api/posts/{id}`
pub async fn update_post(req: Request, store: SharedStore) -> Result<Response, ApiError> {
    let id = post_id(&req)?;
    let new_post = json_payload(&req)?;

    let post = store.update(id, new_post).await?.ok_or_else(|| ApiError::not_found(id))?;
    info!(id, "post updated");
    Ok(Response::builder()
        .header(LOCATION.as_str(), &post_location(post.id))
        .json(&post))
}

/// `POST /api/posts/{id}/delete`
pub async fn delete_post(req: Request, store: SharedStore) -> Result<Json<Post>, ApiError> {
    negotiation::accept(&req, JSON)?;
    let id = post_id(&req)?;

    let post = store.delete(id).await?.ok_or_else(|| ApiError::not_found(id))?;
    info!(id, "post deleted");
    Ok(Json(post))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Guards, decodes and validates a write body.
fn json_payload(req: &Request) -> Result<NewPost, ApiError> {
    negotiation::accept(req, JSON)?;
    negotiation::require(req, JSON)?;

    let value: Value = serde_json::from_slice(req.body()).map_err(ApiError::MalformedJson)?;
    Ok(validate_post(&value)?)
}

/// The `{id}` segment as a non-negative integer. Signs and letters are a
/// route miss; digits beyond `i64` name a post that cannot exist.
fn post_id(req: &Request) -> Result<i64, ApiError> {
    let raw = req.param("id")
        .filter(|raw| !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| ApiError::no_route(req.method(), req.path()))?;
    raw.parse().map_err(|_| ApiError::not_found(raw))
}

fn non_empty_query(req: &Request, key: &str) -> Option<String> {
    req.query(key).filter(|value| !value.is_empty())
}
