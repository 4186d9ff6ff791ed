// Follow/unfollow and like/unlike toggles.
//
// Each toggle flips a set membership in one call. The writes are atomic
// conditional updates: when a concurrent toggle already applied the same
// transition, the conditional write reports it and the counter update is
// skipped, so each transition adjusts `followers` exactly once. The two
// records touched by a follow toggle are still written independently;
// there is no cross-record atomicity.

use std::sync::Arc;

use crate::db::{PostRepository, UserRepository};
use crate::utils::service_error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    Unfollowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Added,
    Removed,
}

pub struct RelationshipService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
}

impl RelationshipService {
    pub fn new(users: Arc<dyn UserRepository>, posts: Arc<dyn PostRepository>) -> Self {
        RelationshipService { users, posts }
    }

    /// Flips whether `actor_id` follows `target_id` and keeps the
    /// target's `followers` counter in step.
    pub async fn toggle_follow(
        &self,
        actor_id: &str,
        target_id: &str,
    ) -> Result<FollowOutcome, ApiError> {
        if target_id.trim().is_empty() {
            return Err(ApiError::Validation(
                "Usuário a ser seguido não informado".to_string(),
            ));
        }

        let actor = self
            .users
            .get(actor_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Usuário logado não encontrado".to_string()))?;

        if actor_id == target_id {
            return Err(ApiError::Validation(
                "Usuário não pode seguir a si mesmo".to_string(),
            ));
        }

        let target = self.users.get(target_id).await?.ok_or_else(|| {
            ApiError::NotFound("Usuário a ser seguido não encontrado".to_string())
        })?;

        if actor.is_following(&target.cognito_id) {
            let applied = self.users.remove_following(actor_id, target_id).await?;
            if applied {
                let decremented = self.users.adjust_followers(target_id, -1).await?;
                if !decremented {
                    // counter already at zero; keep the floor
                    tracing::warn!(target = target_id, "followers decrement floored at zero");
                }
            } else {
                tracing::debug!(
                    actor = actor_id,
                    target = target_id,
                    "unfollow already applied concurrently"
                );
            }
            Ok(FollowOutcome::Unfollowed)
        } else {
            let applied = self.users.add_following(actor_id, target_id).await?;
            if applied {
                self.users.adjust_followers(target_id, 1).await?;
            } else {
                tracing::debug!(
                    actor = actor_id,
                    target = target_id,
                    "follow already applied concurrently"
                );
            }
            Ok(FollowOutcome::Followed)
        }
    }

    /// Flips whether `actor_id` likes post `post_id`. Single record.
    pub async fn toggle_like(
        &self,
        actor_id: &str,
        post_id: &str,
    ) -> Result<LikeOutcome, ApiError> {
        if post_id.trim().is_empty() {
            return Err(ApiError::Validation(
                "Publicação não informada".to_string(),
            ));
        }

        self.users
            .get(actor_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Usuário logado não encontrado".to_string()))?;

        let post = self
            .posts
            .get(post_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Publicação não encontrada".to_string()))?;

        if post.is_liked_by(actor_id) {
            self.posts.remove_like(post_id, actor_id).await?;
            Ok(LikeOutcome::Removed)
        } else {
            self.posts.add_like(post_id, actor_id).await?;
            Ok(LikeOutcome::Added)
        }
    }
}
