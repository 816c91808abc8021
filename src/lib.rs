//! # posts
//!
//! A minimal blog-post JSON API: list with substring filters, fetch, create,
//! update and delete, on a small hyper + tokio HTTP layer.
//!
//! ## Layout
//!
//! - HTTP layer: [`Router`] (radix tree via [`matchit`]), [`Request`],
//!   [`Response`], [`Server`] with graceful shutdown.
//! - Resource: [`api`] handlers, guarded by [`middleware::negotiation`],
//!   validated by [`validation`], persisted through [`store::PostStore`].
//! - Process: [`config`] (clap) and [`telemetry`] (tracing-subscriber).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use posts::{Server, api, store::MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), posts::Error> {
//!     let app = api::router(MemoryStore::shared());
//!     Server::bind("0.0.0.0:3000".parse()?).await?.serve(app).await
//! }
//! ```
//!
//! Routers can also be driven without a socket:
//!
//! ```rust
//! use posts::{Method, Request, api, store::MemoryStore};
//!
//! # tokio_test_block_on(async {
//! let app = api::router(MemoryStore::shared());
//! let req = Request::builder(Method::Get, "/api/posts")
//!     .header("accept", "application/json")
//!     .build();
//! assert_eq!(app.handle(req).await.body(), b"[]");
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;

pub mod api;
pub mod config;
pub mod health;
pub mod middleware;
pub mod model;
pub mod store;
pub mod telemetry;
pub mod validation;

pub use error::{ApiError, Error};
pub use handler::Handler;
pub use method::{Method, UnknownMethod};
pub use request::{Request, RequestBuilder};
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::{DEFAULT_BODY_LIMIT, Server};
