//! In-memory implementation of the repository traits.
//!
//! Mirrors the PostgreSQL schema's constraints (unique usernames and names,
//! foreign keys, cascading deletes) so tests exercise the same failure modes
//! as production. Every trait call takes the lock once and never holds it
//! across an await point.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::repository::{
    CommentRepository, DishRepository, FavoriteRepository, LeaderRepository,
    PromotionRepository, UserRepository,
};
use super::timeouts::{StoreError, StoreResult};
use crate::auth::{CredentialRecord, NewUser, User, UserId};
use crate::menu::{
    Author, Comment, CommentId, CommentPatch, Dish, DishId, DishPatch, Leader, LeaderId,
    LeaderPatch, NewComment, NewDish, NewLeader, NewPromotion, Promotion, PromotionId,
    PromotionPatch,
};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredComment {
    dish_id: DishId,
    author_id: UserId,
    rating: i32,
    comment: String,
    date: chrono::DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, StoredUser>,
    dishes: BTreeMap<DishId, Dish>,
    promotions: BTreeMap<PromotionId, Promotion>,
    leaders: BTreeMap<LeaderId, Leader>,
    comments: BTreeMap<CommentId, StoredComment>,
    /// (user, dish) pairs in insertion order
    favorites: Vec<(UserId, DishId)>,
    sequences: Sequences,
}

/// Per-table id sequences, starting at 1 like `BIGSERIAL`
#[derive(Debug, Default)]
struct Sequences {
    users: i64,
    dishes: i64,
    promotions: i64,
    leaders: i64,
    comments: i64,
}

fn next_id(sequence: &mut i64) -> i64 {
    *sequence += 1;
    *sequence
}

impl Tables {
    fn comment_view(&self, id: CommentId, stored: &StoredComment) -> Option<Comment> {
        let author = &self.users.get(&stored.author_id)?.user;
        Some(Comment {
            id,
            rating: stored.rating,
            comment: stored.comment.clone(),
            author: Author {
                id: author.id,
                firstname: author.firstname.clone(),
                lastname: author.lastname.clone(),
            },
            date: stored.date,
        })
    }

    fn remove_dish_dependents(&mut self, dish_id: DishId) {
        self.comments.retain(|_, c| c.dish_id != dish_id);
        self.favorites.retain(|&(_, d)| d != dish_id);
    }
}

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A panicking test must not wedge every other user of the store
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Grant the admin role to an existing account.
    ///
    /// Roles only change through the store; there is no API for it.
    pub fn promote_to_admin(&self, username: &str) -> bool {
        let mut tables = self.lock();
        match tables
            .users
            .values_mut()
            .find(|stored| stored.user.username == username)
        {
            Some(stored) => {
                stored.user.admin = true;
                stored.user.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: &NewUser) -> StoreResult<UserId> {
        let mut tables = self.lock();
        if tables
            .users
            .values()
            .any(|stored| stored.user.username == user.username)
        {
            return Err(StoreError::Conflict("username".to_string()));
        }

        let id = next_id(&mut tables.sequences.users);
        let now = Utc::now();
        tables.users.insert(
            id,
            StoredUser {
                user: User {
                    id,
                    firstname: user.firstname.clone(),
                    lastname: user.lastname.clone(),
                    username: user.username.clone(),
                    admin: false,
                    created_at: now,
                    updated_at: now,
                },
                password_hash: user.password_hash.clone(),
            },
        );
        Ok(id)
    }

    async fn find_credentials(&self, username: &str) -> StoreResult<Option<CredentialRecord>> {
        let tables = self.lock();
        Ok(tables
            .users
            .values()
            .find(|stored| stored.user.username == username)
            .map(|stored| CredentialRecord {
                id: stored.user.id,
                password_hash: stored.password_hash.clone(),
                admin: stored.user.admin,
            }))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let tables = self.lock();
        Ok(tables.users.values().map(|s| s.user.clone()).collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl DishRepository for MemoryStore {
    async fn list_dishes(&self, featured_only: bool) -> StoreResult<Vec<Dish>> {
        let tables = self.lock();
        Ok(tables
            .dishes
            .values()
            .filter(|d| !featured_only || d.featured)
            .cloned()
            .collect())
    }

    async fn find_dish(&self, id: DishId) -> StoreResult<Option<Dish>> {
        Ok(self.lock().dishes.get(&id).cloned())
    }

    async fn create_dish(&self, dish: &NewDish) -> StoreResult<DishId> {
        let mut tables = self.lock();
        if tables.dishes.values().any(|d| d.name == dish.name) {
            return Err(StoreError::Conflict("dish name".to_string()));
        }

        let id = next_id(&mut tables.sequences.dishes);
        let now = Utc::now();
        tables.dishes.insert(
            id,
            Dish {
                id,
                name: dish.name.clone(),
                image: dish.image.clone(),
                category: dish.category.clone(),
                label: dish.label.clone(),
                price: dish.price.clone(),
                featured: dish.featured,
                description: dish.description.clone(),
                comments: Vec::new(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update_dish(&self, id: DishId, patch: &DishPatch) -> StoreResult<u64> {
        let mut tables = self.lock();
        if let Some(name) = &patch.name {
            if tables.dishes.values().any(|d| d.id != id && &d.name == name) {
                return Err(StoreError::Conflict("dish name".to_string()));
            }
        }

        let Some(dish) = tables.dishes.get_mut(&id) else {
            return Ok(0);
        };
        if let Some(name) = &patch.name {
            dish.name = name.clone();
        }
        if let Some(image) = &patch.image {
            dish.image = image.clone();
        }
        if let Some(category) = &patch.category {
            dish.category = category.clone();
        }
        if let Some(label) = &patch.label {
            dish.label = label.clone();
        }
        if let Some(price) = &patch.price {
            dish.price = price.clone();
        }
        if let Some(featured) = patch.featured {
            dish.featured = featured;
        }
        if let Some(description) = &patch.description {
            dish.description = description.clone();
        }
        dish.updated_at = Utc::now();
        Ok(1)
    }

    async fn delete_dish(&self, id: DishId) -> StoreResult<u64> {
        let mut tables = self.lock();
        if tables.dishes.remove(&id).is_none() {
            return Ok(0);
        }
        tables.remove_dish_dependents(id);
        Ok(1)
    }

    async fn delete_all_dishes(&self) -> StoreResult<u64> {
        let mut tables = self.lock();
        let removed = tables.dishes.len() as u64;
        tables.dishes.clear();
        tables.comments.clear();
        tables.favorites.clear();
        Ok(removed)
    }
}

#[async_trait]
impl PromotionRepository for MemoryStore {
    async fn list_promotions(&self, featured_only: bool) -> StoreResult<Vec<Promotion>> {
        let tables = self.lock();
        Ok(tables
            .promotions
            .values()
            .filter(|p| !featured_only || p.featured)
            .cloned()
            .collect())
    }

    async fn find_promotion(&self, id: PromotionId) -> StoreResult<Option<Promotion>> {
        Ok(self.lock().promotions.get(&id).cloned())
    }

    async fn create_promotion(&self, promotion: &NewPromotion) -> StoreResult<PromotionId> {
        let mut tables = self.lock();
        if tables.promotions.values().any(|p| p.name == promotion.name) {
            return Err(StoreError::Conflict("promotion name".to_string()));
        }

        let id = next_id(&mut tables.sequences.promotions);
        let now = Utc::now();
        tables.promotions.insert(
            id,
            Promotion {
                id,
                name: promotion.name.clone(),
                image: promotion.image.clone(),
                label: promotion.label.clone(),
                price: promotion.price.clone(),
                featured: promotion.featured,
                description: promotion.description.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update_promotion(
        &self,
        id: PromotionId,
        patch: &PromotionPatch,
    ) -> StoreResult<u64> {
        let mut tables = self.lock();
        if let Some(name) = &patch.name {
            if tables.promotions.values().any(|p| p.id != id && &p.name == name) {
                return Err(StoreError::Conflict("promotion name".to_string()));
            }
        }

        let Some(promotion) = tables.promotions.get_mut(&id) else {
            return Ok(0);
        };
        if let Some(name) = &patch.name {
            promotion.name = name.clone();
        }
        if let Some(image) = &patch.image {
            promotion.image = image.clone();
        }
        if let Some(label) = &patch.label {
            promotion.label = label.clone();
        }
        if let Some(price) = &patch.price {
            promotion.price = price.clone();
        }
        if let Some(featured) = patch.featured {
            promotion.featured = featured;
        }
        if let Some(description) = &patch.description {
            promotion.description = description.clone();
        }
        promotion.updated_at = Utc::now();
        Ok(1)
    }

    async fn delete_promotion(&self, id: PromotionId) -> StoreResult<u64> {
        Ok(self.lock().promotions.remove(&id).map_or(0, |_| 1))
    }

    async fn delete_all_promotions(&self) -> StoreResult<u64> {
        let mut tables = self.lock();
        let removed = tables.promotions.len() as u64;
        tables.promotions.clear();
        Ok(removed)
    }
}

#[async_trait]
impl LeaderRepository for MemoryStore {
    async fn list_leaders(&self, featured_only: bool) -> StoreResult<Vec<Leader>> {
        let tables = self.lock();
        Ok(tables
            .leaders
            .values()
            .filter(|l| !featured_only || l.featured)
            .cloned()
            .collect())
    }

    async fn find_leader(&self, id: LeaderId) -> StoreResult<Option<Leader>> {
        Ok(self.lock().leaders.get(&id).cloned())
    }

    async fn create_leader(&self, leader: &NewLeader) -> StoreResult<LeaderId> {
        let mut tables = self.lock();
        if tables.leaders.values().any(|l| l.name == leader.name) {
            return Err(StoreError::Conflict("leader name".to_string()));
        }

        let id = next_id(&mut tables.sequences.leaders);
        let now = Utc::now();
        tables.leaders.insert(
            id,
            Leader {
                id,
                name: leader.name.clone(),
                image: leader.image.clone(),
                designation: leader.designation.clone(),
                abbr: leader.abbr.clone(),
                featured: leader.featured,
                description: leader.description.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update_leader(&self, id: LeaderId, patch: &LeaderPatch) -> StoreResult<u64> {
        let mut tables = self.lock();
        if let Some(name) = &patch.name {
            if tables.leaders.values().any(|l| l.id != id && &l.name == name) {
                return Err(StoreError::Conflict("leader name".to_string()));
            }
        }

        let Some(leader) = tables.leaders.get_mut(&id) else {
            return Ok(0);
        };
        if let Some(name) = &patch.name {
            leader.name = name.clone();
        }
        if let Some(image) = &patch.image {
            leader.image = image.clone();
        }
        if let Some(designation) = &patch.designation {
            leader.designation = designation.clone();
        }
        if let Some(abbr) = &patch.abbr {
            leader.abbr = abbr.clone();
        }
        if let Some(featured) = patch.featured {
            leader.featured = featured;
        }
        if let Some(description) = &patch.description {
            leader.description = description.clone();
        }
        leader.updated_at = Utc::now();
        Ok(1)
    }

    async fn delete_leader(&self, id: LeaderId) -> StoreResult<u64> {
        Ok(self.lock().leaders.remove(&id).map_or(0, |_| 1))
    }

    async fn delete_all_leaders(&self) -> StoreResult<u64> {
        let mut tables = self.lock();
        let removed = tables.leaders.len() as u64;
        tables.leaders.clear();
        Ok(removed)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn list_comments(&self, dish_id: DishId) -> StoreResult<Vec<Comment>> {
        let tables = self.lock();
        Ok(tables
            .comments
            .iter()
            .filter(|(_, c)| c.dish_id == dish_id)
            .filter_map(|(&id, c)| tables.comment_view(id, c))
            .collect())
    }

    async fn find_comment(
        &self,
        dish_id: DishId,
        comment_id: CommentId,
    ) -> StoreResult<Option<Comment>> {
        let tables = self.lock();
        Ok(tables
            .comments
            .get(&comment_id)
            .filter(|c| c.dish_id == dish_id)
            .and_then(|c| tables.comment_view(comment_id, c)))
    }

    async fn create_comment(
        &self,
        dish_id: DishId,
        author_id: UserId,
        comment: &NewComment,
    ) -> StoreResult<CommentId> {
        let mut tables = self.lock();
        if !tables.dishes.contains_key(&dish_id) {
            return Err(StoreError::MissingReference("dish".to_string()));
        }
        if !tables.users.contains_key(&author_id) {
            return Err(StoreError::MissingReference("author".to_string()));
        }

        let id = next_id(&mut tables.sequences.comments);
        tables.comments.insert(
            id,
            StoredComment {
                dish_id,
                author_id,
                rating: comment.rating,
                comment: comment.comment.clone(),
                date: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn update_comment(
        &self,
        dish_id: DishId,
        comment_id: CommentId,
        author_id: UserId,
        patch: &CommentPatch,
    ) -> StoreResult<u64> {
        let mut tables = self.lock();
        let Some(stored) = tables
            .comments
            .get_mut(&comment_id)
            .filter(|c| c.dish_id == dish_id && c.author_id == author_id)
        else {
            return Ok(0);
        };

        if let Some(rating) = patch.rating {
            stored.rating = rating;
        }
        if let Some(comment) = &patch.comment {
            stored.comment = comment.clone();
        }
        Ok(1)
    }

    async fn delete_comment(
        &self,
        dish_id: DishId,
        comment_id: CommentId,
        author_id: UserId,
    ) -> StoreResult<u64> {
        let mut tables = self.lock();
        let owned = tables
            .comments
            .get(&comment_id)
            .is_some_and(|c| c.dish_id == dish_id && c.author_id == author_id);
        if !owned {
            return Ok(0);
        }
        tables.comments.remove(&comment_id);
        Ok(1)
    }

    async fn delete_all_comments(&self, dish_id: DishId) -> StoreResult<u64> {
        let mut tables = self.lock();
        let before = tables.comments.len();
        tables.comments.retain(|_, c| c.dish_id != dish_id);
        Ok((before - tables.comments.len()) as u64)
    }
}

#[async_trait]
impl FavoriteRepository for MemoryStore {
    async fn list_favorites(&self, user_id: UserId) -> StoreResult<Vec<Dish>> {
        let tables = self.lock();
        Ok(tables
            .favorites
            .iter()
            .filter(|&&(u, _)| u == user_id)
            .filter_map(|(_, d)| tables.dishes.get(d).cloned())
            .collect())
    }

    async fn find_favorite(&self, user_id: UserId, dish_id: DishId) -> StoreResult<Option<Dish>> {
        let tables = self.lock();
        if !tables.favorites.contains(&(user_id, dish_id)) {
            return Ok(None);
        }
        Ok(tables.dishes.get(&dish_id).cloned())
    }

    async fn add_favorites(&self, user_id: UserId, dish_ids: &[DishId]) -> StoreResult<u64> {
        let mut tables = self.lock();
        // Validate the whole batch before touching anything
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::MissingReference("user".to_string()));
        }
        if dish_ids.iter().any(|id| !tables.dishes.contains_key(id)) {
            return Err(StoreError::MissingReference("dish".to_string()));
        }

        let mut inserted = 0;
        for &dish_id in dish_ids {
            if !tables.favorites.contains(&(user_id, dish_id)) {
                tables.favorites.push((user_id, dish_id));
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn remove_favorite(&self, user_id: UserId, dish_id: DishId) -> StoreResult<u64> {
        let mut tables = self.lock();
        let before = tables.favorites.len();
        tables.favorites.retain(|&pair| pair != (user_id, dish_id));
        Ok((before - tables.favorites.len()) as u64)
    }

    async fn clear_favorites(&self, user_id: UserId) -> StoreResult<u64> {
        let mut tables = self.lock();
        let before = tables.favorites.len();
        tables.favorites.retain(|&(u, _)| u != user_id);
        Ok((before - tables.favorites.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            username: username.to_string(),
            password_hash: Some("$argon2id$fake".to_string()),
        }
    }

    fn new_dish(name: &str) -> NewDish {
        NewDish {
            name: name.to_string(),
            image: "images/dish.png".to_string(),
            category: "mains".to_string(),
            label: String::new(),
            price: "4.99".to_string(),
            featured: false,
            description: "tasty".to_string(),
        }
    }

    #[tokio::test]
    async fn test_usernames_are_unique() {
        let store = MemoryStore::new();
        assert_eq!(store.create_user(&new_user("ada")).await.unwrap(), 1);
        let dup = store.create_user(&new_user("ada")).await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_new_users_are_not_admin() {
        let store = MemoryStore::new();
        store.create_user(&new_user("ada")).await.unwrap();
        let creds = store.find_credentials("ada").await.unwrap().unwrap();
        assert!(!creds.admin);

        assert!(store.promote_to_admin("ada"));
        assert!(!store.promote_to_admin("nobody"));
        let creds = store.find_credentials("ada").await.unwrap().unwrap();
        assert!(creds.admin);
    }

    #[tokio::test]
    async fn test_comment_requires_existing_dish() {
        let store = MemoryStore::new();
        let user = store.create_user(&new_user("ada")).await.unwrap();
        let comment = NewComment {
            rating: 5,
            comment: "great".to_string(),
        };

        let result = store.create_comment(99, user, &comment).await;
        assert!(matches!(result, Err(StoreError::MissingReference(_))));
    }

    #[tokio::test]
    async fn test_deleting_dish_cascades() {
        let store = MemoryStore::new();
        let user = store.create_user(&new_user("ada")).await.unwrap();
        let dish = store.create_dish(&new_dish("Uthappizza")).await.unwrap();
        let comment = NewComment {
            rating: 4,
            comment: "nice".to_string(),
        };
        store.create_comment(dish, user, &comment).await.unwrap();
        store.add_favorites(user, &[dish]).await.unwrap();

        assert_eq!(store.delete_dish(dish).await.unwrap(), 1);
        assert!(store.list_comments(dish).await.unwrap().is_empty());
        assert!(store.list_favorites(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_favorites_is_all_or_nothing() {
        let store = MemoryStore::new();
        let user = store.create_user(&new_user("ada")).await.unwrap();
        let dish = store.create_dish(&new_dish("Uthappizza")).await.unwrap();

        let result = store.add_favorites(user, &[dish, 404]).await;
        assert!(matches!(result, Err(StoreError::MissingReference(_))));
        assert!(store.list_favorites(user).await.unwrap().is_empty());

        assert_eq!(store.add_favorites(user, &[dish, dish]).await.unwrap(), 1);
        assert_eq!(store.add_favorites(user, &[dish]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_comment_mutations_match_author_only() {
        let store = MemoryStore::new();
        let author = store.create_user(&new_user("ada")).await.unwrap();
        let other = store.create_user(&new_user("bob")).await.unwrap();
        let dish = store.create_dish(&new_dish("Uthappizza")).await.unwrap();
        let id = store
            .create_comment(
                dish,
                author,
                &NewComment {
                    rating: 2,
                    comment: "meh".to_string(),
                },
            )
            .await
            .unwrap();

        let patch = CommentPatch {
            rating: Some(5),
            comment: None,
        };
        assert_eq!(store.update_comment(dish, id, other, &patch).await.unwrap(), 0);
        assert_eq!(store.delete_comment(dish, id, other).await.unwrap(), 0);
        assert_eq!(store.update_comment(dish, id, author, &patch).await.unwrap(), 1);

        let updated = store.find_comment(dish, id).await.unwrap().unwrap();
        assert_eq!(updated.rating, 5);
        assert_eq!(updated.comment, "meh");
        assert_eq!(updated.author.firstname, "Ada");
    }

    #[tokio::test]
    async fn test_featured_filter() {
        let store = MemoryStore::new();
        store.create_dish(&new_dish("Plain")).await.unwrap();
        let mut featured = new_dish("Special");
        featured.featured = true;
        store.create_dish(&featured).await.unwrap();

        assert_eq!(store.list_dishes(false).await.unwrap().len(), 2);
        let only = store.list_dishes(true).await.unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].name, "Special");
    }
}
