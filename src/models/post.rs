// Post record as stored in the post table and returned in feeds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::dynamo::{attr_s, attr_ss, get_s, get_ss, Item};
use crate::db::StoreError;

/// A publication. `likes` has set semantics: each liking user appears at
/// most once, maintained by the like toggle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub likes: Vec<String>,
}

impl Post {
    pub fn new(user_id: String, description: String, image: Option<String>) -> Self {
        Post {
            id: Uuid::new_v4().to_string(),
            user_id,
            description,
            date: Utc::now(),
            image,
            likes: Vec::new(),
        }
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }

    pub fn to_item(&self) -> Item {
        let mut item = Item::new();
        item.insert("id".to_string(), attr_s(&self.id));
        item.insert("userId".to_string(), attr_s(&self.user_id));
        item.insert("description".to_string(), attr_s(&self.description));
        item.insert("date".to_string(), attr_s(&self.date.to_rfc3339()));
        if let Some(image) = &self.image {
            item.insert("image".to_string(), attr_s(image));
        }
        if let Some(likes) = attr_ss(&self.likes) {
            item.insert("likes".to_string(), likes);
        }
        item
    }

    pub fn from_item(item: &Item) -> Result<Self, StoreError> {
        let date_raw = get_s(item, "date")
            .ok_or_else(|| StoreError::Decode("post item missing date".to_string()))?;
        let date = DateTime::parse_from_rfc3339(&date_raw)
            .map_err(|e| StoreError::Decode(format!("post date is not RFC 3339: {}", e)))?
            .with_timezone(&Utc);

        Ok(Post {
            id: get_s(item, "id")
                .ok_or_else(|| StoreError::Decode("post item missing id".to_string()))?,
            user_id: get_s(item, "userId")
                .ok_or_else(|| StoreError::Decode("post item missing userId".to_string()))?,
            description: get_s(item, "description").unwrap_or_default(),
            date,
            image: get_s(item, "image"),
            likes: get_ss(item, "likes"),
        })
    }
}
