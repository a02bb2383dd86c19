//! Repository trait definitions for testability and dependency injection.
//!
//! Managers depend on these traits rather than on a pool, so the same domain
//! code runs against [`PgStore`](super::PgStore) in production and
//! [`MemoryStore`](super::MemoryStore) in tests.
//!
//! Write operations report the number of rows they touched; callers decide
//! whether zero is an error.

use async_trait::async_trait;

use super::timeouts::StoreResult;
use crate::auth::{CredentialRecord, NewUser, User, UserId};
use crate::menu::{
    Comment, CommentId, CommentPatch, Dish, DishId, DishPatch, Leader, LeaderId, LeaderPatch,
    NewComment, NewDish, NewLeader, NewPromotion, Promotion, PromotionId, PromotionPatch,
};

/// Trait for user account operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, returning the assigned id
    async fn create_user(&self, user: &NewUser) -> StoreResult<UserId>;

    /// Fetch what a login needs for one username
    async fn find_credentials(&self, username: &str) -> StoreResult<Option<CredentialRecord>>;

    /// List all users, without password hashes
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Cheap round trip used by health checks
    async fn ping(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait DishRepository: Send + Sync {
    /// List dishes, optionally only the featured ones. Comments are left empty.
    async fn list_dishes(&self, featured_only: bool) -> StoreResult<Vec<Dish>>;

    /// Fetch one dish without its comments
    async fn find_dish(&self, id: DishId) -> StoreResult<Option<Dish>>;

    async fn create_dish(&self, dish: &NewDish) -> StoreResult<DishId>;

    async fn update_dish(&self, id: DishId, patch: &DishPatch) -> StoreResult<u64>;

    /// Delete one dish; its comments and favorite entries go with it
    async fn delete_dish(&self, id: DishId) -> StoreResult<u64>;

    async fn delete_all_dishes(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait PromotionRepository: Send + Sync {
    async fn list_promotions(&self, featured_only: bool) -> StoreResult<Vec<Promotion>>;

    async fn find_promotion(&self, id: PromotionId) -> StoreResult<Option<Promotion>>;

    async fn create_promotion(&self, promotion: &NewPromotion) -> StoreResult<PromotionId>;

    async fn update_promotion(&self, id: PromotionId, patch: &PromotionPatch)
    -> StoreResult<u64>;

    async fn delete_promotion(&self, id: PromotionId) -> StoreResult<u64>;

    async fn delete_all_promotions(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait LeaderRepository: Send + Sync {
    async fn list_leaders(&self, featured_only: bool) -> StoreResult<Vec<Leader>>;

    async fn find_leader(&self, id: LeaderId) -> StoreResult<Option<Leader>>;

    async fn create_leader(&self, leader: &NewLeader) -> StoreResult<LeaderId>;

    async fn update_leader(&self, id: LeaderId, patch: &LeaderPatch) -> StoreResult<u64>;

    async fn delete_leader(&self, id: LeaderId) -> StoreResult<u64>;

    async fn delete_all_leaders(&self) -> StoreResult<u64>;
}

/// Comments on dishes, joined with their authors' public names
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn list_comments(&self, dish_id: DishId) -> StoreResult<Vec<Comment>>;

    async fn find_comment(
        &self,
        dish_id: DishId,
        comment_id: CommentId,
    ) -> StoreResult<Option<Comment>>;

    /// Insert a comment. A missing dish or author is `StoreError::MissingReference`.
    async fn create_comment(
        &self,
        dish_id: DishId,
        author_id: UserId,
        comment: &NewComment,
    ) -> StoreResult<CommentId>;

    /// Update a comment, matching only when `author_id` wrote it
    async fn update_comment(
        &self,
        dish_id: DishId,
        comment_id: CommentId,
        author_id: UserId,
        patch: &CommentPatch,
    ) -> StoreResult<u64>;

    /// Delete a comment, matching only when `author_id` wrote it
    async fn delete_comment(
        &self,
        dish_id: DishId,
        comment_id: CommentId,
        author_id: UserId,
    ) -> StoreResult<u64>;

    async fn delete_all_comments(&self, dish_id: DishId) -> StoreResult<u64>;
}

/// Per-user favorite dishes
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    async fn list_favorites(&self, user_id: UserId) -> StoreResult<Vec<Dish>>;

    async fn find_favorite(&self, user_id: UserId, dish_id: DishId) -> StoreResult<Option<Dish>>;

    /// Add several favorites atomically: either every dish is recorded or none
    /// is. Pairs already present are skipped and not counted.
    async fn add_favorites(&self, user_id: UserId, dish_ids: &[DishId]) -> StoreResult<u64>;

    async fn remove_favorite(&self, user_id: UserId, dish_id: DishId) -> StoreResult<u64>;

    async fn clear_favorites(&self, user_id: UserId) -> StoreResult<u64>;
}
