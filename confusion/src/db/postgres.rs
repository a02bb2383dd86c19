//! PostgreSQL implementation of the repository traits.
//!
//! All statements are parameterized; user input never reaches the SQL text.
//! Partial updates use `COALESCE($n, column)` so a `None` field binds as NULL
//! and keeps the stored value.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::repository::{
    CommentRepository, DishRepository, FavoriteRepository, LeaderRepository,
    PromotionRepository, UserRepository,
};
use super::timeouts::{
    DEFAULT_TRANSACTION_TIMEOUT, StoreResult, with_default_timeout, with_timeout,
};
use crate::auth::{CredentialRecord, NewUser, User, UserId};
use crate::menu::{
    Author, Comment, CommentId, CommentPatch, Dish, DishId, DishPatch, Leader, LeaderId,
    LeaderPatch, NewComment, NewDish, NewLeader, NewPromotion, Promotion, PromotionId,
    PromotionPatch,
};

const DISH_COLUMNS: &str =
    "d.id, d.name, d.image, d.category, d.label, d.price, d.featured, d.description, \
     d.created_at, d.updated_at";

const COMMENT_SELECT: &str = "SELECT c.id, c.rating, c.comment, c.created_at, \
     u.id AS author_id, u.firstname, u.lastname \
     FROM comments c JOIN users u ON u.id = c.author_id";

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        firstname: row.get("firstname"),
        lastname: row.get("lastname"),
        username: row.get("username"),
        admin: row.get("admin"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn dish_from_row(row: &PgRow) -> Dish {
    Dish {
        id: row.get("id"),
        name: row.get("name"),
        image: row.get("image"),
        category: row.get("category"),
        label: row.get("label"),
        price: row.get("price"),
        featured: row.get("featured"),
        description: row.get("description"),
        comments: Vec::new(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn promotion_from_row(row: &PgRow) -> Promotion {
    Promotion {
        id: row.get("id"),
        name: row.get("name"),
        image: row.get("image"),
        label: row.get("label"),
        price: row.get("price"),
        featured: row.get("featured"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn leader_from_row(row: &PgRow) -> Leader {
    Leader {
        id: row.get("id"),
        name: row.get("name"),
        image: row.get("image"),
        designation: row.get("designation"),
        abbr: row.get("abbr"),
        featured: row.get("featured"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn comment_from_row(row: &PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        rating: row.get("rating"),
        comment: row.get("comment"),
        author: Author {
            id: row.get("author_id"),
            firstname: row.get("firstname"),
            lastname: row.get("lastname"),
        },
        date: row.get("created_at"),
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: &NewUser) -> StoreResult<UserId> {
        let row = with_default_timeout(
            sqlx::query(
                "INSERT INTO users (firstname, lastname, username, password_hash)
                 VALUES ($1, $2, $3, $4) RETURNING id",
            )
            .bind(&user.firstname)
            .bind(&user.lastname)
            .bind(&user.username)
            .bind(&user.password_hash)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(|e| e.for_write("username"))?;

        Ok(row.get("id"))
    }

    async fn find_credentials(&self, username: &str) -> StoreResult<Option<CredentialRecord>> {
        let row = with_default_timeout(
            sqlx::query("SELECT id, password_hash, admin FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(|r| CredentialRecord {
            id: r.get("id"),
            password_hash: r.get("password_hash"),
            admin: r.get("admin"),
        }))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT id, firstname, lastname, username, admin, created_at, updated_at
                 FROM users ORDER BY id",
            )
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        with_default_timeout(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }
}

#[async_trait]
impl DishRepository for PgStore {
    async fn list_dishes(&self, featured_only: bool) -> StoreResult<Vec<Dish>> {
        let sql = format!(
            "SELECT {DISH_COLUMNS} FROM dishes d WHERE ($1 = FALSE OR d.featured) ORDER BY d.id"
        );
        let rows =
            with_default_timeout(sqlx::query(&sql).bind(featured_only).fetch_all(&self.pool))
                .await?;

        Ok(rows.iter().map(dish_from_row).collect())
    }

    async fn find_dish(&self, id: DishId) -> StoreResult<Option<Dish>> {
        let sql = format!("SELECT {DISH_COLUMNS} FROM dishes d WHERE d.id = $1");
        let row =
            with_default_timeout(sqlx::query(&sql).bind(id).fetch_optional(&self.pool)).await?;

        Ok(row.as_ref().map(dish_from_row))
    }

    async fn create_dish(&self, dish: &NewDish) -> StoreResult<DishId> {
        let row = with_default_timeout(
            sqlx::query(
                "INSERT INTO dishes (name, image, category, label, price, featured, description)
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
            )
            .bind(&dish.name)
            .bind(&dish.image)
            .bind(&dish.category)
            .bind(&dish.label)
            .bind(&dish.price)
            .bind(dish.featured)
            .bind(&dish.description)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(|e| e.for_write("dish name"))?;

        Ok(row.get("id"))
    }

    async fn update_dish(&self, id: DishId, patch: &DishPatch) -> StoreResult<u64> {
        let result = with_default_timeout(
            sqlx::query(
                "UPDATE dishes SET
                    name = COALESCE($2, name),
                    image = COALESCE($3, image),
                    category = COALESCE($4, category),
                    label = COALESCE($5, label),
                    price = COALESCE($6, price),
                    featured = COALESCE($7, featured),
                    description = COALESCE($8, description),
                    updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.image)
            .bind(&patch.category)
            .bind(&patch.label)
            .bind(&patch.price)
            .bind(patch.featured)
            .bind(&patch.description)
            .execute(&self.pool),
        )
        .await
        .map_err(|e| e.for_write("dish name"))?;

        Ok(result.rows_affected())
    }

    async fn delete_dish(&self, id: DishId) -> StoreResult<u64> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM dishes WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_all_dishes(&self) -> StoreResult<u64> {
        let result =
            with_default_timeout(sqlx::query("DELETE FROM dishes").execute(&self.pool)).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl PromotionRepository for PgStore {
    async fn list_promotions(&self, featured_only: bool) -> StoreResult<Vec<Promotion>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT id, name, image, label, price, featured, description, created_at, updated_at
                 FROM promotions WHERE ($1 = FALSE OR featured) ORDER BY id",
            )
            .bind(featured_only)
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.iter().map(promotion_from_row).collect())
    }

    async fn find_promotion(&self, id: PromotionId) -> StoreResult<Option<Promotion>> {
        let row = with_default_timeout(
            sqlx::query(
                "SELECT id, name, image, label, price, featured, description, created_at, updated_at
                 FROM promotions WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(promotion_from_row))
    }

    async fn create_promotion(&self, promotion: &NewPromotion) -> StoreResult<PromotionId> {
        let row = with_default_timeout(
            sqlx::query(
                "INSERT INTO promotions (name, image, label, price, featured, description)
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
            )
            .bind(&promotion.name)
            .bind(&promotion.image)
            .bind(&promotion.label)
            .bind(&promotion.price)
            .bind(promotion.featured)
            .bind(&promotion.description)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(|e| e.for_write("promotion name"))?;

        Ok(row.get("id"))
    }

    async fn update_promotion(
        &self,
        id: PromotionId,
        patch: &PromotionPatch,
    ) -> StoreResult<u64> {
        let result = with_default_timeout(
            sqlx::query(
                "UPDATE promotions SET
                    name = COALESCE($2, name),
                    image = COALESCE($3, image),
                    label = COALESCE($4, label),
                    price = COALESCE($5, price),
                    featured = COALESCE($6, featured),
                    description = COALESCE($7, description),
                    updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.image)
            .bind(&patch.label)
            .bind(&patch.price)
            .bind(patch.featured)
            .bind(&patch.description)
            .execute(&self.pool),
        )
        .await
        .map_err(|e| e.for_write("promotion name"))?;

        Ok(result.rows_affected())
    }

    async fn delete_promotion(&self, id: PromotionId) -> StoreResult<u64> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM promotions WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_all_promotions(&self) -> StoreResult<u64> {
        let result =
            with_default_timeout(sqlx::query("DELETE FROM promotions").execute(&self.pool))
                .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl LeaderRepository for PgStore {
    async fn list_leaders(&self, featured_only: bool) -> StoreResult<Vec<Leader>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT id, name, image, designation, abbr, featured, description, created_at, updated_at
                 FROM leaders WHERE ($1 = FALSE OR featured) ORDER BY id",
            )
            .bind(featured_only)
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.iter().map(leader_from_row).collect())
    }

    async fn find_leader(&self, id: LeaderId) -> StoreResult<Option<Leader>> {
        let row = with_default_timeout(
            sqlx::query(
                "SELECT id, name, image, designation, abbr, featured, description, created_at, updated_at
                 FROM leaders WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(leader_from_row))
    }

    async fn create_leader(&self, leader: &NewLeader) -> StoreResult<LeaderId> {
        let row = with_default_timeout(
            sqlx::query(
                "INSERT INTO leaders (name, image, designation, abbr, featured, description)
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
            )
            .bind(&leader.name)
            .bind(&leader.image)
            .bind(&leader.designation)
            .bind(&leader.abbr)
            .bind(leader.featured)
            .bind(&leader.description)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(|e| e.for_write("leader name"))?;

        Ok(row.get("id"))
    }

    async fn update_leader(&self, id: LeaderId, patch: &LeaderPatch) -> StoreResult<u64> {
        let result = with_default_timeout(
            sqlx::query(
                "UPDATE leaders SET
                    name = COALESCE($2, name),
                    image = COALESCE($3, image),
                    designation = COALESCE($4, designation),
                    abbr = COALESCE($5, abbr),
                    featured = COALESCE($6, featured),
                    description = COALESCE($7, description),
                    updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.image)
            .bind(&patch.designation)
            .bind(&patch.abbr)
            .bind(patch.featured)
            .bind(&patch.description)
            .execute(&self.pool),
        )
        .await
        .map_err(|e| e.for_write("leader name"))?;

        Ok(result.rows_affected())
    }

    async fn delete_leader(&self, id: LeaderId) -> StoreResult<u64> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM leaders WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_all_leaders(&self) -> StoreResult<u64> {
        let result =
            with_default_timeout(sqlx::query("DELETE FROM leaders").execute(&self.pool)).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn list_comments(&self, dish_id: DishId) -> StoreResult<Vec<Comment>> {
        let sql = format!("{COMMENT_SELECT} WHERE c.dish_id = $1 ORDER BY c.id");
        let rows =
            with_default_timeout(sqlx::query(&sql).bind(dish_id).fetch_all(&self.pool)).await?;

        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn find_comment(
        &self,
        dish_id: DishId,
        comment_id: CommentId,
    ) -> StoreResult<Option<Comment>> {
        let sql = format!("{COMMENT_SELECT} WHERE c.dish_id = $1 AND c.id = $2");
        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(dish_id)
                .bind(comment_id)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(comment_from_row))
    }

    async fn create_comment(
        &self,
        dish_id: DishId,
        author_id: UserId,
        comment: &NewComment,
    ) -> StoreResult<CommentId> {
        let row = with_default_timeout(
            sqlx::query(
                "INSERT INTO comments (dish_id, author_id, rating, comment)
                 VALUES ($1, $2, $3, $4) RETURNING id",
            )
            .bind(dish_id)
            .bind(author_id)
            .bind(comment.rating)
            .bind(&comment.comment)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(|e| e.for_write("dish"))?;

        Ok(row.get("id"))
    }

    async fn update_comment(
        &self,
        dish_id: DishId,
        comment_id: CommentId,
        author_id: UserId,
        patch: &CommentPatch,
    ) -> StoreResult<u64> {
        let result = with_default_timeout(
            sqlx::query(
                "UPDATE comments SET
                    rating = COALESCE($4, rating),
                    comment = COALESCE($5, comment),
                    updated_at = NOW()
                 WHERE dish_id = $1 AND id = $2 AND author_id = $3",
            )
            .bind(dish_id)
            .bind(comment_id)
            .bind(author_id)
            .bind(patch.rating)
            .bind(&patch.comment)
            .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_comment(
        &self,
        dish_id: DishId,
        comment_id: CommentId,
        author_id: UserId,
    ) -> StoreResult<u64> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM comments WHERE dish_id = $1 AND id = $2 AND author_id = $3")
                .bind(dish_id)
                .bind(comment_id)
                .bind(author_id)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_all_comments(&self, dish_id: DishId) -> StoreResult<u64> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM comments WHERE dish_id = $1")
                .bind(dish_id)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl FavoriteRepository for PgStore {
    async fn list_favorites(&self, user_id: UserId) -> StoreResult<Vec<Dish>> {
        let sql = format!(
            "SELECT {DISH_COLUMNS} FROM dishes d JOIN favorites f ON f.dish_id = d.id
             WHERE f.user_id = $1 ORDER BY f.created_at, d.id"
        );
        let rows =
            with_default_timeout(sqlx::query(&sql).bind(user_id).fetch_all(&self.pool)).await?;

        Ok(rows.iter().map(dish_from_row).collect())
    }

    async fn find_favorite(&self, user_id: UserId, dish_id: DishId) -> StoreResult<Option<Dish>> {
        let sql = format!(
            "SELECT {DISH_COLUMNS} FROM dishes d JOIN favorites f ON f.dish_id = d.id
             WHERE f.user_id = $1 AND f.dish_id = $2"
        );
        let row = with_default_timeout(
            sqlx::query(&sql)
                .bind(user_id)
                .bind(dish_id)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(dish_from_row))
    }

    async fn add_favorites(&self, user_id: UserId, dish_ids: &[DishId]) -> StoreResult<u64> {
        let pool = &self.pool;
        let inserted = with_timeout(DEFAULT_TRANSACTION_TIMEOUT, async move {
            let mut tx = pool.begin().await?;
            let mut inserted = 0;
            for dish_id in dish_ids {
                // An early return drops `tx`, rolling back the whole batch
                let result = sqlx::query(
                    "INSERT INTO favorites (user_id, dish_id) VALUES ($1, $2)
                     ON CONFLICT (user_id, dish_id) DO NOTHING",
                )
                .bind(user_id)
                .bind(*dish_id)
                .execute(&mut *tx)
                .await?;
                inserted += result.rows_affected();
            }
            tx.commit().await?;
            Ok::<_, sqlx::Error>(inserted)
        })
        .await
        .map_err(|e| e.for_write("dish"))?;

        Ok(inserted)
    }

    async fn remove_favorite(&self, user_id: UserId, dish_id: DishId) -> StoreResult<u64> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND dish_id = $2")
                .bind(user_id)
                .bind(dish_id)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected())
    }

    async fn clear_favorites(&self, user_id: UserId) -> StoreResult<u64> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM favorites WHERE user_id = $1")
                .bind(user_id)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected())
    }
}
