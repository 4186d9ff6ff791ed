// In-memory repositories mirroring the DynamoDB semantics, used by the
// integration tests and unit tests of the toggle service.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::db::{Page, PostRepository, StoreError, UserRepository};
use crate::models::{Post, User};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, user: User) {
        self.users
            .lock()
            .unwrap()
            .insert(user.cognito_id.clone(), user);
    }

    /// Current state of a record, for test assertions.
    pub fn snapshot(&self, cognito_id: &str) -> Option<User> {
        self.users.lock().unwrap().get(cognito_id).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, cognito_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().unwrap().get(cognito_id).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), StoreError> {
        self.seed(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        self.seed(user.clone());
        Ok(())
    }

    async fn add_following(&self, actor_id: &str, target_id: &str) -> Result<bool, StoreError> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(actor_id) {
            Some(actor) if !actor.is_following(target_id) => {
                actor.following.push(target_id.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_following(&self, actor_id: &str, target_id: &str) -> Result<bool, StoreError> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(actor_id) {
            Some(actor) if actor.is_following(target_id) => {
                actor.following.retain(|id| id != target_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn adjust_followers(&self, target_id: &str, delta: i64) -> Result<bool, StoreError> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(target_id) {
            Some(target) => {
                if delta < 0 && target.followers < -delta {
                    // floor at zero, as the conditional update does
                    return Ok(false);
                }
                target.followers += delta;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn increment_posts(&self, cognito_id: &str) -> Result<(), StoreError> {
        if let Some(user) = self.users.lock().unwrap().get_mut(cognito_id) {
            user.posts += 1;
        }
        Ok(())
    }

    async fn search_by_name(
        &self,
        filter: &str,
        start_key: Option<Value>,
        limit: u32,
    ) -> Result<Page<User>, StoreError> {
        let users = self.users.lock().unwrap();
        let mut matches: Vec<User> = users
            .values()
            .filter(|user| user.name.contains(filter))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.cognito_id.cmp(&b.cognito_id));

        let resume_after = start_key
            .as_ref()
            .and_then(|key| key["cognitoId"].as_str().map(str::to_string));
        if let Some(after) = resume_after {
            matches.retain(|user| user.cognito_id > after);
        }

        let remaining = matches.split_off(matches.len().min(limit as usize));
        let last_key = if remaining.is_empty() {
            None
        } else {
            matches
                .last()
                .map(|user| json!({ "cognitoId": user.cognito_id }))
        };

        Ok(Page {
            items: matches,
            last_key,
        })
    }
}

#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: Mutex<HashMap<String, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, post: Post) {
        self.posts.lock().unwrap().insert(post.id.clone(), post);
    }

    pub fn snapshot(&self, id: &str) -> Option<Post> {
        self.posts.lock().unwrap().get(id).cloned()
    }

    /// All stored posts of one user, for test assertions.
    pub fn snapshot_all_for(&self, user_id: &str) -> Vec<Post> {
        self.posts
            .lock()
            .unwrap()
            .values()
            .filter(|post| post.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn get(&self, id: &str) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.lock().unwrap().get(id).cloned())
    }

    async fn create(&self, post: &Post) -> Result<(), StoreError> {
        self.seed(post.clone());
        Ok(())
    }

    async fn add_like(&self, post_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let mut posts = self.posts.lock().unwrap();
        match posts.get_mut(post_id) {
            Some(post) if !post.is_liked_by(user_id) => {
                post.likes.push(user_id.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove_like(&self, post_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let mut posts = self.posts.lock().unwrap();
        match posts.get_mut(post_id) {
            Some(post) if post.is_liked_by(user_id) => {
                post.likes.retain(|id| id != user_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn query_by_user(
        &self,
        user_id: &str,
        start_key: Option<Value>,
        limit: u32,
    ) -> Result<Page<Post>, StoreError> {
        let posts = self.posts.lock().unwrap();
        let mut matches: Vec<Post> = posts
            .values()
            .filter(|post| post.user_id == user_id)
            .cloned()
            .collect();
        // newest first, id as tie-break for a stable order
        matches.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));

        Ok(paginate(matches, start_key, limit, |post| {
            json!({
                "id": post.id,
                "userId": post.user_id,
                "date": post.date.to_rfc3339(),
            })
        }))
    }

    async fn scan_by_users(
        &self,
        user_ids: &[String],
        start_key: Option<Value>,
        limit: u32,
    ) -> Result<Page<Post>, StoreError> {
        let posts = self.posts.lock().unwrap();
        let mut matches: Vec<Post> = posts
            .values()
            .filter(|post| user_ids.iter().any(|id| *id == post.user_id))
            .cloned()
            .collect();
        // scan order: by key
        matches.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(paginate(matches, start_key, limit, |post| {
            json!({ "id": post.id })
        }))
    }
}

/// Resumes after the post named by `start_key` and cuts one page,
/// emitting a resume key only when more items remain.
fn paginate(
    mut matches: Vec<Post>,
    start_key: Option<Value>,
    limit: u32,
    key_of: impl Fn(&Post) -> Value,
) -> Page<Post> {
    if let Some(after) = start_key
        .as_ref()
        .and_then(|key| key["id"].as_str().map(str::to_string))
    {
        if let Some(pos) = matches.iter().position(|post| post.id == after) {
            matches.drain(..=pos);
        }
    }

    let remaining = matches.split_off(matches.len().min(limit as usize));
    let last_key = if remaining.is_empty() {
        None
    } else {
        matches.last().map(&key_of)
    };

    Page {
        items: matches,
        last_key,
    }
}
