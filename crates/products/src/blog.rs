use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use toyshelf_core::{BlogId, UserId};

/// A stored blog post. Everything but the id is opaque to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blog {
    #[serde(rename = "_id")]
    pub id: BlogId,
    #[serde(flatten)]
    pub content: Map<String, Value>,
}

/// The set of blogs a user has pinned.
///
/// Created on first pin (upsert) and never deleted; `blogs` never holds
/// duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBlogPin {
    #[serde(rename = "_id")]
    pub user_id: UserId,
    #[serde(default)]
    pub blogs: Vec<BlogId>,
}

impl UserBlogPin {
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            blogs: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blog_keeps_opaque_content() {
        let id = BlogId::new();
        let blog: Blog = serde_json::from_value(json!({
            "_id": id.to_string(),
            "title": "Choosing a first kite",
            "tags": ["outdoor"]
        }))
        .unwrap();

        assert_eq!(blog.id, id);
        assert_eq!(blog.content["title"], json!("Choosing a first kite"));
        let back = serde_json::to_value(&blog).unwrap();
        assert_eq!(back["tags"], json!(["outdoor"]));
    }

    #[test]
    fn pin_document_without_blogs_decodes_empty() {
        let user = UserId::new();
        let pins: UserBlogPin =
            serde_json::from_value(json!({ "_id": user.to_string() })).unwrap();
        assert!(pins.blogs.is_empty());
    }
}
