//! Posts API with a couple of seeded posts.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -H 'accept: application/json' 'http://localhost:3000/api/posts?title_like=bells'
//!   curl http://localhost:3000/api/posts/1
//!   curl -X POST http://localhost:3000/api/posts \
//!        -H 'accept: application/json' -H 'content-type: application/json' \
//!        -d '{"title":"Hello","body":"World"}'
//!   curl -X POST -H 'accept: application/json' http://localhost:3000/api/posts/1/delete
//!   curl http://localhost:3000/healthz

use posts::model::NewPost;
use posts::store::{MemoryStore, PostStore};
use posts::{Server, api};

#[tokio::main]
async fn main() -> Result<(), posts::Error> {
    tracing_subscriber::fmt::init();

    let store = MemoryStore::shared();
    for (title, body) in [
        ("Post with bells", "Just a test"),
        ("Post with whistles", "Still a test"),
    ] {
        if let Err(e) = store.insert(NewPost::new(title, body)).await {
            tracing::error!("seeding failed: {e}");
        }
    }

    Server::bind("0.0.0.0:3000".parse()?)
        .await?
        .serve(api::router(store))
        .await
}
