//! Menu manager: dishes, promotions, leaders, comments and favorites.

use std::sync::Arc;

use super::{
    errors::{MenuError, MenuResult},
    models::{
        Comment, CommentId, CommentPatch, Dish, DishId, DishPatch, FavoriteDishes,
        FavoriteStatus, Leader, LeaderId, LeaderPatch, MAX_RATING, MIN_RATING, MutationStatus,
        NewComment, NewDish, NewLeader, NewPromotion, Promotion, PromotionId, PromotionPatch,
    },
};
use crate::auth::UserId;
use crate::db::{
    CommentRepository, DishRepository, FavoriteRepository, LeaderRepository,
    PromotionRepository, StoreError,
};

fn check_rating(rating: i32) -> MenuResult<()> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(MenuError::InvalidRating(rating))
    }
}

/// A unique-name hit while updating is a bad request, not a store fault
fn reject_update_conflict(err: StoreError) -> MenuError {
    match err {
        StoreError::Conflict(what) => {
            log::debug!("Update rejected on {what}");
            MenuError::UpdateConflict
        }
        other => MenuError::from(other),
    }
}

/// Thin CRUD layer over the menu repositories.
///
/// Cloning is cheap; every repository is shared behind an `Arc`.
#[derive(Clone)]
pub struct MenuManager {
    dishes: Arc<dyn DishRepository>,
    promotions: Arc<dyn PromotionRepository>,
    leaders: Arc<dyn LeaderRepository>,
    comments: Arc<dyn CommentRepository>,
    favorites: Arc<dyn FavoriteRepository>,
}

impl MenuManager {
    pub fn new(
        dishes: Arc<dyn DishRepository>,
        promotions: Arc<dyn PromotionRepository>,
        leaders: Arc<dyn LeaderRepository>,
        comments: Arc<dyn CommentRepository>,
        favorites: Arc<dyn FavoriteRepository>,
    ) -> Self {
        Self {
            dishes,
            promotions,
            leaders,
            comments,
            favorites,
        }
    }

    /// Build a manager whose repositories are all backed by one store
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: DishRepository
            + PromotionRepository
            + LeaderRepository
            + CommentRepository
            + FavoriteRepository
            + 'static,
    {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
        )
    }

    // Dishes

    pub async fn list_dishes(&self, featured_only: bool) -> MenuResult<Vec<Dish>> {
        Ok(self.dishes.list_dishes(featured_only).await?)
    }

    /// Fetch one dish with its comments populated
    pub async fn get_dish(&self, id: DishId) -> MenuResult<Option<Dish>> {
        let Some(mut dish) = self.dishes.find_dish(id).await? else {
            return Ok(None);
        };
        dish.comments = self.comments.list_comments(id).await?;
        Ok(Some(dish))
    }

    pub async fn create_dish(&self, dish: NewDish) -> MenuResult<MutationStatus> {
        let id = self.dishes.create_dish(&dish).await?;
        log::info!("Created dish {} ({})", id, dish.name);
        Ok(MutationStatus::affected(1))
    }

    /// Apply a partial update and return the dish as stored afterwards.
    ///
    /// `None` when no row matched `id`.
    pub async fn update_dish(&self, id: DishId, patch: DishPatch) -> MenuResult<Option<Dish>> {
        if patch.is_empty() {
            return Err(MenuError::EmptyUpdate);
        }
        let updated = self
            .dishes
            .update_dish(id, &patch)
            .await
            .map_err(reject_update_conflict)?;
        if updated == 0 {
            return Ok(None);
        }
        self.get_dish(id).await
    }

    pub async fn delete_dish(&self, id: DishId) -> MenuResult<MutationStatus> {
        let n = self.dishes.delete_dish(id).await?;
        Ok(MutationStatus::affected(n))
    }

    pub async fn delete_all_dishes(&self) -> MenuResult<MutationStatus> {
        let n = self.dishes.delete_all_dishes().await?;
        log::warn!("Deleted all dishes ({n} rows)");
        Ok(MutationStatus::affected(n))
    }

    // Promotions

    pub async fn list_promotions(&self, featured_only: bool) -> MenuResult<Vec<Promotion>> {
        Ok(self.promotions.list_promotions(featured_only).await?)
    }

    pub async fn get_promotion(&self, id: PromotionId) -> MenuResult<Option<Promotion>> {
        Ok(self.promotions.find_promotion(id).await?)
    }

    pub async fn create_promotion(&self, promotion: NewPromotion) -> MenuResult<MutationStatus> {
        self.promotions.create_promotion(&promotion).await?;
        Ok(MutationStatus::affected(1))
    }

    pub async fn update_promotion(
        &self,
        id: PromotionId,
        patch: PromotionPatch,
    ) -> MenuResult<Option<Promotion>> {
        if patch.is_empty() {
            return Err(MenuError::EmptyUpdate);
        }
        let updated = self
            .promotions
            .update_promotion(id, &patch)
            .await
            .map_err(reject_update_conflict)?;
        if updated == 0 {
            return Ok(None);
        }
        self.get_promotion(id).await
    }

    pub async fn delete_promotion(&self, id: PromotionId) -> MenuResult<MutationStatus> {
        let n = self.promotions.delete_promotion(id).await?;
        Ok(MutationStatus::affected(n))
    }

    pub async fn delete_all_promotions(&self) -> MenuResult<MutationStatus> {
        let n = self.promotions.delete_all_promotions().await?;
        log::warn!("Deleted all promotions ({n} rows)");
        Ok(MutationStatus::affected(n))
    }

    // Leaders

    pub async fn list_leaders(&self, featured_only: bool) -> MenuResult<Vec<Leader>> {
        Ok(self.leaders.list_leaders(featured_only).await?)
    }

    pub async fn get_leader(&self, id: LeaderId) -> MenuResult<Option<Leader>> {
        Ok(self.leaders.find_leader(id).await?)
    }

    pub async fn create_leader(&self, leader: NewLeader) -> MenuResult<MutationStatus> {
        self.leaders.create_leader(&leader).await?;
        Ok(MutationStatus::affected(1))
    }

    pub async fn update_leader(
        &self,
        id: LeaderId,
        patch: LeaderPatch,
    ) -> MenuResult<Option<Leader>> {
        if patch.is_empty() {
            return Err(MenuError::EmptyUpdate);
        }
        let updated = self
            .leaders
            .update_leader(id, &patch)
            .await
            .map_err(reject_update_conflict)?;
        if updated == 0 {
            return Ok(None);
        }
        self.get_leader(id).await
    }

    pub async fn delete_leader(&self, id: LeaderId) -> MenuResult<MutationStatus> {
        let n = self.leaders.delete_leader(id).await?;
        Ok(MutationStatus::affected(n))
    }

    pub async fn delete_all_leaders(&self) -> MenuResult<MutationStatus> {
        let n = self.leaders.delete_all_leaders().await?;
        log::warn!("Deleted all leaders ({n} rows)");
        Ok(MutationStatus::affected(n))
    }

    // Comments

    pub async fn list_comments(&self, dish_id: DishId) -> MenuResult<Vec<Comment>> {
        Ok(self.comments.list_comments(dish_id).await?)
    }

    pub async fn get_comment(
        &self,
        dish_id: DishId,
        comment_id: CommentId,
    ) -> MenuResult<Option<Comment>> {
        Ok(self.comments.find_comment(dish_id, comment_id).await?)
    }

    /// Post a comment as `author_id`. A missing dish is `NotFound`.
    pub async fn add_comment(
        &self,
        dish_id: DishId,
        author_id: UserId,
        comment: NewComment,
    ) -> MenuResult<MutationStatus> {
        check_rating(comment.rating)?;
        self.comments
            .create_comment(dish_id, author_id, &comment)
            .await?;
        Ok(MutationStatus::affected(1))
    }

    /// Fails with `NotOwner` unless `requester` wrote the comment
    async fn ensure_author(
        &self,
        dish_id: DishId,
        comment_id: CommentId,
        requester: UserId,
    ) -> MenuResult<()> {
        match self.comments.find_comment(dish_id, comment_id).await? {
            Some(comment) if comment.author.id == requester => Ok(()),
            _ => {
                log::warn!(
                    "User {requester} denied access to comment {comment_id} on dish {dish_id}"
                );
                Err(MenuError::NotOwner)
            }
        }
    }

    pub async fn update_comment(
        &self,
        dish_id: DishId,
        comment_id: CommentId,
        requester: UserId,
        patch: CommentPatch,
    ) -> MenuResult<Option<Comment>> {
        self.ensure_author(dish_id, comment_id, requester).await?;
        if patch.is_empty() {
            return Err(MenuError::EmptyUpdate);
        }
        if let Some(rating) = patch.rating {
            check_rating(rating)?;
        }

        let updated = self
            .comments
            .update_comment(dish_id, comment_id, requester, &patch)
            .await?;
        if updated == 0 {
            return Ok(None);
        }
        self.get_comment(dish_id, comment_id).await
    }

    pub async fn delete_comment(
        &self,
        dish_id: DishId,
        comment_id: CommentId,
        requester: UserId,
    ) -> MenuResult<MutationStatus> {
        self.ensure_author(dish_id, comment_id, requester).await?;
        let n = self
            .comments
            .delete_comment(dish_id, comment_id, requester)
            .await?;
        Ok(MutationStatus::affected(n))
    }

    pub async fn delete_all_comments(&self, dish_id: DishId) -> MenuResult<MutationStatus> {
        let n = self.comments.delete_all_comments(dish_id).await?;
        Ok(MutationStatus::affected(n))
    }

    // Favorites

    pub async fn list_favorites(&self, user_id: UserId) -> MenuResult<FavoriteDishes> {
        let dishes = self.favorites.list_favorites(user_id).await?;
        Ok(FavoriteDishes { dishes })
    }

    pub async fn favorite_status(
        &self,
        user_id: UserId,
        dish_id: DishId,
    ) -> MenuResult<FavoriteStatus> {
        let favorite = self.favorites.find_favorite(user_id, dish_id).await?;
        Ok(FavoriteStatus {
            exists: favorite.is_some(),
            favorites: favorite,
        })
    }

    pub async fn add_favorite(
        &self,
        user_id: UserId,
        dish_id: DishId,
    ) -> MenuResult<FavoriteDishes> {
        self.add_favorites(user_id, &[dish_id]).await
    }

    /// Add every listed dish or none of them, then return the full list
    pub async fn add_favorites(
        &self,
        user_id: UserId,
        dish_ids: &[DishId],
    ) -> MenuResult<FavoriteDishes> {
        self.favorites.add_favorites(user_id, dish_ids).await?;
        self.list_favorites(user_id).await
    }

    pub async fn remove_favorite(
        &self,
        user_id: UserId,
        dish_id: DishId,
    ) -> MenuResult<FavoriteDishes> {
        self.favorites.remove_favorite(user_id, dish_id).await?;
        self.list_favorites(user_id).await
    }

    pub async fn clear_favorites(&self, user_id: UserId) -> MenuResult<FavoriteDishes> {
        self.favorites.clear_favorites(user_id).await?;
        self.list_favorites(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::NewUser;
    use crate::db::{MemoryStore, UserRepository};

    async fn setup() -> (MenuManager, Arc<MemoryStore>, UserId, UserId) {
        let store = Arc::new(MemoryStore::new());
        let alice = store
            .create_user(&NewUser {
                firstname: "Alice".to_string(),
                lastname: "Liddell".to_string(),
                username: "alice".to_string(),
                password_hash: None,
            })
            .await
            .unwrap();
        let bob = store
            .create_user(&NewUser {
                firstname: "Bob".to_string(),
                lastname: "Builder".to_string(),
                username: "bob".to_string(),
                password_hash: None,
            })
            .await
            .unwrap();
        (MenuManager::from_store(store.clone()), store, alice, bob)
    }

    fn dish(name: &str, featured: bool) -> NewDish {
        NewDish {
            name: name.to_string(),
            image: format!("images/{}.png", name.to_lowercase()),
            category: "mains".to_string(),
            label: "Hot".to_string(),
            price: "4.99".to_string(),
            featured,
            description: String::new(),
        }
    }

    async fn first_dish_id(menu: &MenuManager) -> DishId {
        menu.list_dishes(false).await.unwrap()[0].id
    }

    #[tokio::test]
    async fn test_get_dish_populates_comments() {
        let (menu, _, alice, _) = setup().await;
        menu.create_dish(dish("Uthappizza", true)).await.unwrap();
        let id = first_dish_id(&menu).await;

        let status = menu
            .add_comment(
                id,
                alice,
                NewComment {
                    rating: 5,
                    comment: "Imagine all the eatables".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(status, MutationStatus::affected(1));

        let fetched = menu.get_dish(id).await.unwrap().unwrap();
        assert_eq!(fetched.comments.len(), 1);
        assert_eq!(fetched.comments[0].author.firstname, "Alice");

        let listed = menu.list_dishes(false).await.unwrap();
        assert!(listed[0].comments.is_empty());
    }

    #[tokio::test]
    async fn test_missing_dish_reads_as_none() {
        let (menu, _, _, _) = setup().await;
        assert!(menu.get_dish(42).await.unwrap().is_none());
        assert!(menu.get_promotion(42).await.unwrap().is_none());
        assert!(menu.get_leader(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_update() {
        let (menu, _, _, _) = setup().await;
        menu.create_dish(dish("Zucchipakoda", false)).await.unwrap();
        let id = first_dish_id(&menu).await;

        let updated = menu
            .update_dish(
                id,
                DishPatch {
                    price: Some("1.99".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.price, "1.99");
        assert_eq!(updated.name, "Zucchipakoda");
        assert_eq!(updated.label, "Hot");
    }

    #[tokio::test]
    async fn test_empty_and_missing_updates() {
        let (menu, _, _, _) = setup().await;
        menu.create_dish(dish("Vadonut", false)).await.unwrap();
        let id = first_dish_id(&menu).await;

        let empty = menu.update_dish(id, DishPatch::default()).await;
        assert!(matches!(empty, Err(MenuError::EmptyUpdate)));

        let missing = menu
            .update_leader(
                7,
                LeaderPatch {
                    abbr: Some("CEO".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(missing, Ok(None)));
    }

    #[tokio::test]
    async fn test_update_to_taken_name_is_rejected() {
        let (menu, _, _, _) = setup().await;
        menu.create_dish(dish("Uthappizza", false)).await.unwrap();
        menu.create_dish(dish("Zucchipakoda", false)).await.unwrap();
        let id = first_dish_id(&menu).await;

        let result = menu
            .update_dish(
                id,
                DishPatch {
                    name: Some("Zucchipakoda".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(MenuError::UpdateConflict)));
    }

    #[tokio::test]
    async fn test_rating_bounds() {
        let (menu, _, alice, _) = setup().await;
        menu.create_dish(dish("Vadonut", false)).await.unwrap();
        let id = first_dish_id(&menu).await;

        for rating in [0, 6, -1] {
            let result = menu
                .add_comment(
                    id,
                    alice,
                    NewComment {
                        rating,
                        comment: "x".to_string(),
                    },
                )
                .await;
            assert!(matches!(result, Err(MenuError::InvalidRating(r)) if r == rating));
        }
    }

    #[tokio::test]
    async fn test_comment_on_missing_dish_is_not_found() {
        let (menu, _, alice, _) = setup().await;
        let result = menu
            .add_comment(
                3,
                alice,
                NewComment {
                    rating: 3,
                    comment: "where am I".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(MenuError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_only_author_mutates_comment() {
        let (menu, _, alice, bob) = setup().await;
        menu.create_dish(dish("Uthappizza", false)).await.unwrap();
        let dish_id = first_dish_id(&menu).await;
        menu.add_comment(
            dish_id,
            alice,
            NewComment {
                rating: 4,
                comment: "good".to_string(),
            },
        )
        .await
        .unwrap();
        let comment_id = menu.list_comments(dish_id).await.unwrap()[0].id;

        let patch = CommentPatch {
            rating: Some(1),
            comment: None,
        };
        let denied = menu
            .update_comment(dish_id, comment_id, bob, patch.clone())
            .await;
        assert!(matches!(denied, Err(MenuError::NotOwner)));
        let denied = menu.delete_comment(dish_id, comment_id, bob).await;
        assert!(matches!(denied, Err(MenuError::NotOwner)));

        let updated = menu
            .update_comment(dish_id, comment_id, alice, patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.rating, 1);

        let deleted = menu.delete_comment(dish_id, comment_id, alice).await.unwrap();
        assert_eq!(deleted, MutationStatus::affected(1));
    }

    #[tokio::test]
    async fn test_unknown_comment_is_not_owned() {
        let (menu, _, alice, _) = setup().await;
        let result = menu.delete_comment(1, 1, alice).await;
        assert!(matches!(result, Err(MenuError::NotOwner)));
    }

    #[tokio::test]
    async fn test_favorites_lifecycle() {
        let (menu, _, alice, bob) = setup().await;
        menu.create_dish(dish("Uthappizza", false)).await.unwrap();
        menu.create_dish(dish("Zucchipakoda", false)).await.unwrap();
        let ids: Vec<DishId> = menu
            .list_dishes(false)
            .await
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();

        let after_add = menu.add_favorites(alice, &ids).await.unwrap();
        assert_eq!(after_add.dishes.len(), 2);

        let status = menu.favorite_status(alice, ids[0]).await.unwrap();
        assert!(status.exists);
        assert_eq!(status.favorites.unwrap().id, ids[0]);
        assert!(!menu.favorite_status(bob, ids[0]).await.unwrap().exists);

        let after_remove = menu.remove_favorite(alice, ids[0]).await.unwrap();
        assert_eq!(after_remove.dishes.len(), 1);
        assert_eq!(after_remove.dishes[0].id, ids[1]);

        let after_clear = menu.clear_favorites(alice).await.unwrap();
        assert!(after_clear.dishes.is_empty());
    }

    #[tokio::test]
    async fn test_favorites_batch_is_atomic() {
        let (menu, _, alice, _) = setup().await;
        menu.create_dish(dish("Uthappizza", false)).await.unwrap();
        let id = first_dish_id(&menu).await;

        let result = menu.add_favorites(alice, &[id, id + 100]).await;
        assert!(matches!(result, Err(MenuError::NotFound(_))));
        assert!(menu.list_favorites(alice).await.unwrap().dishes.is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_reports_count() {
        let (menu, store, _, _) = setup().await;
        menu.create_leader(NewLeader {
            name: "Peter Pan".to_string(),
            image: String::new(),
            designation: "Chief Epicurious Officer".to_string(),
            abbr: "CEO".to_string(),
            featured: true,
            description: String::new(),
        })
        .await
        .unwrap();
        menu.create_promotion(NewPromotion {
            name: "Weekend Grand Buffet".to_string(),
            image: String::new(),
            label: "New".to_string(),
            price: "19.99".to_string(),
            featured: true,
            description: String::new(),
        })
        .await
        .unwrap();

        assert_eq!(menu.list_leaders(true).await.unwrap().len(), 1);
        assert_eq!(menu.delete_all_leaders().await.unwrap().n, 1);
        assert_eq!(menu.delete_all_promotions().await.unwrap().n, 1);
        assert!(store.list_promotions(false).await.unwrap().is_empty());
    }
}
