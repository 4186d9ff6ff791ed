// Post table access over DynamoDB.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::db::dynamo::{attr_s, response_item, response_page, DynamoClient};
use crate::db::{Page, PostRepository, StoreError};
use crate::models::Post;

/// Index over (userId, date) used for per-user feeds.
const USER_DATE_INDEX: &str = "userIdDateIndex";

pub struct DynamoPostRepository {
    client: Arc<DynamoClient>,
    table: String,
}

impl DynamoPostRepository {
    pub fn new(client: Arc<DynamoClient>, table: &str) -> Self {
        DynamoPostRepository {
            client,
            table: table.to_string(),
        }
    }

    fn key(&self, id: &str) -> Value {
        json!({ "id": attr_s(id) })
    }

    async fn conditional_update(&self, payload: Value) -> Result<bool, StoreError> {
        match self.client.call("UpdateItem", payload).await {
            Ok(_) => Ok(true),
            Err(StoreError::ConditionFailed) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn decode_page(response: &Value) -> Result<Page<Post>, StoreError> {
        let (items, last_key) = response_page(response);
        let posts = items
            .iter()
            .map(Post::from_item)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items: posts,
            last_key,
        })
    }
}

#[async_trait]
impl PostRepository for DynamoPostRepository {
    async fn get(&self, id: &str) -> Result<Option<Post>, StoreError> {
        let response = self
            .client
            .call(
                "GetItem",
                json!({ "TableName": self.table, "Key": self.key(id) }),
            )
            .await?;
        match response_item(&response) {
            Some(item) => Ok(Some(Post::from_item(item)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, post: &Post) -> Result<(), StoreError> {
        self.client
            .call(
                "PutItem",
                json!({ "TableName": self.table, "Item": post.to_item() }),
            )
            .await?;
        Ok(())
    }

    async fn add_like(&self, post_id: &str, user_id: &str) -> Result<bool, StoreError> {
        self.conditional_update(json!({
            "TableName": self.table,
            "Key": self.key(post_id),
            "UpdateExpression": "ADD likes :user",
            "ConditionExpression":
                "attribute_exists(id) AND (attribute_not_exists(likes) OR NOT contains(likes, :id))",
            "ExpressionAttributeValues": {
                ":user": { "SS": [user_id] },
                ":id": attr_s(user_id),
            }
        }))
        .await
    }

    async fn remove_like(&self, post_id: &str, user_id: &str) -> Result<bool, StoreError> {
        self.conditional_update(json!({
            "TableName": self.table,
            "Key": self.key(post_id),
            "UpdateExpression": "DELETE likes :user",
            "ConditionExpression": "contains(likes, :id)",
            "ExpressionAttributeValues": {
                ":user": { "SS": [user_id] },
                ":id": attr_s(user_id),
            }
        }))
        .await
    }

    async fn query_by_user(
        &self,
        user_id: &str,
        start_key: Option<Value>,
        limit: u32,
    ) -> Result<Page<Post>, StoreError> {
        let mut payload = json!({
            "TableName": self.table,
            "IndexName": USER_DATE_INDEX,
            "KeyConditionExpression": "userId = :user",
            "ExpressionAttributeValues": { ":user": attr_s(user_id) },
            "ScanIndexForward": false,
            "Limit": limit,
        });
        if let Some(key) = start_key {
            payload["ExclusiveStartKey"] = key;
        }

        let response = self.client.call("Query", payload).await?;
        Self::decode_page(&response)
    }

    async fn scan_by_users(
        &self,
        user_ids: &[String],
        start_key: Option<Value>,
        limit: u32,
    ) -> Result<Page<Post>, StoreError> {
        // "userId IN (:u0, :u1, ...)" with one placeholder per id
        let placeholders: Vec<String> = (0..user_ids.len()).map(|i| format!(":u{}", i)).collect();
        let mut values = serde_json::Map::new();
        for (placeholder, id) in placeholders.iter().zip(user_ids) {
            values.insert(placeholder.clone(), attr_s(id));
        }

        let mut payload = json!({
            "TableName": self.table,
            "FilterExpression": format!("userId IN ({})", placeholders.join(", ")),
            "ExpressionAttributeValues": Value::Object(values),
            "Limit": limit,
        });
        if let Some(key) = start_key {
            payload["ExclusiveStartKey"] = key;
        }

        let response = self.client.call("Scan", payload).await?;
        Self::decode_page(&response)
    }
}
