// Document store access: repository traits, the DynamoDB wire client and
// the in-memory implementations used by the test suites.

pub mod dynamo;
pub mod memory;
pub mod post_repository;
pub mod user_repository;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Post, User};

pub use dynamo::DynamoClient;
pub use memory::{InMemoryPostRepository, InMemoryUserRepository};
pub use post_repository::DynamoPostRepository;
pub use user_repository::DynamoUserRepository;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document store request failed: {0}")]
    Request(String),

    /// A conditional update was rejected by the store. For the toggle
    /// operations this means the transition already happened elsewhere.
    #[error("conditional update rejected")]
    ConditionFailed,

    #[error("failed to decode stored record: {0}")]
    Decode(String),
}

/// One page of results plus the store's resume key, if any.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub last_key: Option<Value>,
}

/// Key-based access to the user table.
///
/// The toggle support methods are atomic conditional updates: they return
/// `false` when the store rejected the condition, meaning the membership
/// was already in the desired state (e.g. a concurrent toggle won).
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, cognito_id: &str) -> Result<Option<User>, StoreError>;
    async fn create(&self, user: &User) -> Result<(), StoreError>;
    /// Whole-record overwrite.
    async fn update(&self, user: &User) -> Result<(), StoreError>;

    /// Adds `target_id` to the actor's `following` set unless present.
    async fn add_following(&self, actor_id: &str, target_id: &str) -> Result<bool, StoreError>;
    /// Removes `target_id` from the actor's `following` set if present.
    async fn remove_following(&self, actor_id: &str, target_id: &str) -> Result<bool, StoreError>;
    /// Atomic counter update; decrements are floored at zero and report
    /// `false` when the floor condition rejected the write.
    async fn adjust_followers(&self, target_id: &str, delta: i64) -> Result<bool, StoreError>;
    async fn increment_posts(&self, cognito_id: &str) -> Result<(), StoreError>;

    /// Contains-filter scan over user names, paginated.
    async fn search_by_name(
        &self,
        filter: &str,
        start_key: Option<Value>,
        limit: u32,
    ) -> Result<Page<User>, StoreError>;
}

/// Key-based access to the post table.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Post>, StoreError>;
    async fn create(&self, post: &Post) -> Result<(), StoreError>;

    async fn add_like(&self, post_id: &str, user_id: &str) -> Result<bool, StoreError>;
    async fn remove_like(&self, post_id: &str, user_id: &str) -> Result<bool, StoreError>;

    /// Posts of one user, newest first, paginated.
    async fn query_by_user(
        &self,
        user_id: &str,
        start_key: Option<Value>,
        limit: u32,
    ) -> Result<Page<Post>, StoreError>;

    /// Posts of any of the given users (home feed predicate), paginated.
    async fn scan_by_users(
        &self,
        user_ids: &[String],
        start_key: Option<Value>,
        limit: u32,
    ) -> Result<Page<Post>, StoreError>;
}
