//! The Post resource.

use serde::{Deserialize, Serialize};

/// A persisted blog post. `id` is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
}

/// The writable fields of a post, accepted by create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
}

impl NewPost {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { title: title.into(), body: body.into() }
    }

    pub(crate) fn with_id(self, id: i64) -> Post {
        Post { id, title: self.title, body: self.body }
    }
}

/// Case-sensitive substring filters for listing. Absent filters match
/// everything; both present must both match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub title_like: Option<String>,
    pub body_like: Option<String>,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        contains(&post.title, self.title_like.as_deref())
            && contains(&post.body, self.body_like.as_deref())
    }
}

fn contains(haystack: &str, needle: Option<&str>) -> bool {
    needle.is_none_or(|needle| haystack.contains(needle))
}
