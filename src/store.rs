//! Post persistence.
//!
//! Handlers see only [`PostStore`]; the router carries a [`SharedStore`] as
//! its state. [`MemoryStore`] keeps everything in a `BTreeMap` keyed by id,
//! so listing in id order falls out of iteration order.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::model::{NewPost, Post, PostFilter};

/// Backend failure. Surfaced to clients only as a generic `500`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for posts. Every method is one atomic operation.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Persists a post under the next id. Ids start at 1 and are never reused.
    async fn insert(&self, post: NewPost) -> Result<Post, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Post>, StoreError>;

    /// Posts matching `filter`, in ascending id order.
    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, StoreError>;

    /// Replaces title and body. `None` if no post has `id`.
    async fn update(&self, id: i64, post: NewPost) -> Result<Option<Post>, StoreError>;

    /// Removes the post and returns what it was. `None` if no post has `id`.
    async fn delete(&self, id: i64) -> Result<Option<Post>, StoreError>;
}

/// The handle handlers receive.
pub type SharedStore = Arc<dyn PostStore>;

#[derive(Debug)]
struct Table {
    rows: BTreeMap<i64, Post>,
    next_id: i64,
}

/// In-process [`PostStore`].
#[derive(Debug)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { table: RwLock::new(Table { rows: BTreeMap::new(), next_id: 1 }) }
    }

    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }
}

impl Default for MemoryStore {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert(&self, post: NewPost) -> Result<Post, StoreError> {
        let mut table = self.table.write().await;
        let id = table.next_id;
        table.next_id += 1;

        let post = post.with_id(id);
        table.rows.insert(id, post.clone());
        debug!(id, "post inserted");
        Ok(post)
    }

    async fn get(&self, id: i64) -> Result<Option<Post>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.values().filter(|p| filter.matches(p)).cloned().collect())
    }

    async fn update(&self, id: i64, post: NewPost) -> Result<Option<Post>, StoreError> {
        let mut table = self.table.write().await;
        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        *row = post.with_id(id);
        debug!(id, "post updated");
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<Option<Post>, StoreError> {
        let removed = self.table.write().await.rows.remove(&id);
        if removed.is_some() {
            debug!(id, "post deleted");
        }
        Ok(removed)
    }
}
