//! Restaurant menu resources: dishes, promotions, leaders, comments on
//! dishes, and per-user favorite dishes.
//!
//! ## Example
//!
//! ```no_run
//! use confusion::db::MemoryStore;
//! use confusion::menu::MenuManager;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let menu = MenuManager::from_store(Arc::new(MemoryStore::new()));
//!     for dish in menu.list_dishes(true).await? {
//!         println!("{} ({})", dish.name, dish.price);
//!     }
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{MenuError, MenuResult};
pub use manager::MenuManager;
pub use models::{
    Author, Comment, CommentId, CommentPatch, Dish, DishId, DishPatch, FavoriteDishes,
    FavoriteRef, FavoriteStatus, Leader, LeaderId, LeaderPatch, MAX_RATING, MIN_RATING,
    MutationStatus, NewComment, NewDish, NewLeader, NewPromotion, Promotion, PromotionId,
    PromotionPatch, is_truthy,
};
