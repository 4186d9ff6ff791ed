// User record as stored in the user table and returned by the API.

use serde::{Deserialize, Serialize};

use crate::db::dynamo::{attr_n, attr_s, attr_ss, get_n, get_s, get_ss, Item};
use crate::db::StoreError;

/// A registered user. Keyed by the identity-provider subject id.
///
/// Invariants maintained by the toggle operations: `following` has set
/// semantics and never contains the owner's own id; `followers` mirrors
/// how many other users follow this one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub cognito_id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub followers: i64,
    pub posts: i64,
    pub following: Vec<String>,
}

impl User {
    pub fn new(cognito_id: String, name: String, email: String, avatar: Option<String>) -> Self {
        User {
            cognito_id,
            name,
            email,
            avatar,
            followers: 0,
            posts: 0,
            following: Vec::new(),
        }
    }

    pub fn is_following(&self, target_id: &str) -> bool {
        // exact id equality, no case folding
        self.following.iter().any(|id| id == target_id)
    }

    pub fn to_item(&self) -> Item {
        let mut item = Item::new();
        item.insert("cognitoId".to_string(), attr_s(&self.cognito_id));
        item.insert("name".to_string(), attr_s(&self.name));
        item.insert("email".to_string(), attr_s(&self.email));
        if let Some(avatar) = &self.avatar {
            item.insert("avatar".to_string(), attr_s(avatar));
        }
        item.insert("followers".to_string(), attr_n(self.followers));
        item.insert("posts".to_string(), attr_n(self.posts));
        if let Some(following) = attr_ss(&self.following) {
            item.insert("following".to_string(), following);
        }
        item
    }

    pub fn from_item(item: &Item) -> Result<Self, StoreError> {
        Ok(User {
            cognito_id: get_s(item, "cognitoId")
                .ok_or_else(|| StoreError::Decode("user item missing cognitoId".to_string()))?,
            name: get_s(item, "name").unwrap_or_default(),
            email: get_s(item, "email").unwrap_or_default(),
            avatar: get_s(item, "avatar"),
            followers: get_n(item, "followers").unwrap_or(0),
            posts: get_n(item, "posts").unwrap_or(0),
            following: get_ss(item, "following"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_round_trip() {
        let mut user = User::new(
            "sub-1".to_string(),
            "Maria".to_string(),
            "maria@example.com".to_string(),
            Some("avatar-1.png".to_string()),
        );
        user.followers = 3;
        user.following = vec!["sub-2".to_string(), "sub-3".to_string()];

        let restored = User::from_item(&user.to_item()).unwrap();
        assert_eq!(restored, user);
    }

    #[test]
    fn empty_following_set_is_omitted_from_item() {
        let user = User::new(
            "sub-1".to_string(),
            "Maria".to_string(),
            "maria@example.com".to_string(),
            None,
        );
        let item = user.to_item();
        // DynamoDB rejects empty string sets
        assert!(!item.contains_key("following"));
        assert!(!item.contains_key("avatar"));
        assert_eq!(User::from_item(&item).unwrap(), user);
    }

    #[test]
    fn membership_check_is_exact() {
        let mut user = User::new("a".into(), "A".into(), "a@example.com".into(), None);
        user.following = vec!["Sub-2".to_string()];
        assert!(user.is_following("Sub-2"));
        assert!(!user.is_following("sub-2"));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let user = User::new("sub-1".into(), "Maria".into(), "maria@example.com".into(), None);
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["cognitoId"], "sub-1");
        assert!(value.get("avatar").is_none());
    }
}
