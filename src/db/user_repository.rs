// User table access over DynamoDB.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::db::dynamo::{attr_n, attr_s, response_item, response_page, DynamoClient};
use crate::db::{Page, StoreError, UserRepository};
use crate::models::User;

pub struct DynamoUserRepository {
    client: Arc<DynamoClient>,
    table: String,
}

impl DynamoUserRepository {
    pub fn new(client: Arc<DynamoClient>, table: &str) -> Self {
        DynamoUserRepository {
            client,
            table: table.to_string(),
        }
    }

    fn key(&self, cognito_id: &str) -> Value {
        json!({ "cognitoId": attr_s(cognito_id) })
    }

    /// Runs a conditional UpdateItem and maps a rejected condition to
    /// `Ok(false)` instead of an error.
    async fn conditional_update(&self, payload: Value) -> Result<bool, StoreError> {
        match self.client.call("UpdateItem", payload).await {
            Ok(_) => Ok(true),
            Err(StoreError::ConditionFailed) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl UserRepository for DynamoUserRepository {
    async fn get(&self, cognito_id: &str) -> Result<Option<User>, StoreError> {
        let response = self
            .client
            .call(
                "GetItem",
                json!({ "TableName": self.table, "Key": self.key(cognito_id) }),
            )
            .await?;
        match response_item(&response) {
            Some(item) => Ok(Some(User::from_item(item)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, user: &User) -> Result<(), StoreError> {
        self.client
            .call(
                "PutItem",
                json!({ "TableName": self.table, "Item": user.to_item() }),
            )
            .await?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        // whole-record overwrite, same as create on a keyed store
        self.create(user).await
    }

    async fn add_following(&self, actor_id: &str, target_id: &str) -> Result<bool, StoreError> {
        self.conditional_update(json!({
            "TableName": self.table,
            "Key": self.key(actor_id),
            "UpdateExpression": "ADD following :target",
            "ConditionExpression":
                "attribute_exists(cognitoId) AND (attribute_not_exists(following) OR NOT contains(following, :id))",
            "ExpressionAttributeValues": {
                ":target": { "SS": [target_id] },
                ":id": attr_s(target_id),
            }
        }))
        .await
    }

    async fn remove_following(&self, actor_id: &str, target_id: &str) -> Result<bool, StoreError> {
        self.conditional_update(json!({
            "TableName": self.table,
            "Key": self.key(actor_id),
            "UpdateExpression": "DELETE following :target",
            "ConditionExpression": "contains(following, :id)",
            "ExpressionAttributeValues": {
                ":target": { "SS": [target_id] },
                ":id": attr_s(target_id),
            }
        }))
        .await
    }

    async fn adjust_followers(&self, target_id: &str, delta: i64) -> Result<bool, StoreError> {
        let mut payload = json!({
            "TableName": self.table,
            "Key": self.key(target_id),
            "UpdateExpression": "ADD followers :delta",
            "ExpressionAttributeValues": { ":delta": attr_n(delta) }
        });
        if delta < 0 {
            // floor the counter at zero
            payload["ConditionExpression"] = json!("followers >= :min");
            payload["ExpressionAttributeValues"][":min"] = attr_n(-delta);
        }
        self.conditional_update(payload).await
    }

    async fn increment_posts(&self, cognito_id: &str) -> Result<(), StoreError> {
        self.client
            .call(
                "UpdateItem",
                json!({
                    "TableName": self.table,
                    "Key": self.key(cognito_id),
                    "UpdateExpression": "ADD posts :one",
                    "ExpressionAttributeValues": { ":one": attr_n(1) }
                }),
            )
            .await?;
        Ok(())
    }

    async fn search_by_name(
        &self,
        filter: &str,
        start_key: Option<Value>,
        limit: u32,
    ) -> Result<Page<User>, StoreError> {
        let mut payload = json!({
            "TableName": self.table,
            "FilterExpression": "contains(#n, :filter)",
            "ExpressionAttributeNames": { "#n": "name" },
            "ExpressionAttributeValues": { ":filter": attr_s(filter) },
            "Limit": limit,
        });
        if let Some(key) = start_key {
            payload["ExclusiveStartKey"] = key;
        }

        let response = self.client.call("Scan", payload).await?;
        let (items, last_key) = response_page(&response);
        let users = items
            .iter()
            .map(User::from_item)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items: users,
            last_key,
        })
    }
}
