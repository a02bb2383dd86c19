//! Menu resource models.
//!
//! Field names on the wire follow the restaurant client: `_id`, `createdAt`,
//! `updatedAt`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::UserId;

pub type DishId = i64;
pub type PromotionId = i64;
pub type LeaderId = i64;
pub type CommentId = i64;

/// Lowest accepted comment rating
pub const MIN_RATING: i32 = 1;

/// Highest accepted comment rating
pub const MAX_RATING: i32 = 5;

/// Textual truth value: `1`, `t`, `T`, `true`, `True` or `TRUE`
pub fn is_truthy(text: &str) -> bool {
    matches!(text, "1" | "t" | "T" | "true" | "True" | "TRUE")
}

/// A featured flag as sent by clients: either a JSON boolean or one of the
/// strings accepted by [`is_truthy`]. Anything else reads as false.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Text(String),
}

impl FlagRepr {
    fn into_bool(self) -> bool {
        match self {
            FlagRepr::Bool(value) => value,
            FlagRepr::Text(text) => is_truthy(&text),
        }
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    FlagRepr::deserialize(deserializer).map(FlagRepr::into_bool)
}

fn deserialize_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<FlagRepr>::deserialize(deserializer)?.map(FlagRepr::into_bool))
}

/// A menu dish
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    #[serde(rename = "_id")]
    pub id: DishId,
    pub name: String,
    pub image: String,
    pub category: String,
    pub label: String,
    pub price: String,
    pub featured: bool,
    pub description: String,
    /// Only populated on single-dish reads
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDish {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub price: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub featured: bool,
    #[serde(default)]
    pub description: String,
}

/// Partial dish update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DishPatch {
    pub name: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub label: Option<String>,
    pub price: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub featured: Option<bool>,
    pub description: Option<String>,
}

impl DishPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.image.is_none()
            && self.category.is_none()
            && self.label.is_none()
            && self.price.is_none()
            && self.featured.is_none()
            && self.description.is_none()
    }
}

/// A promotion shown on the home page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    #[serde(rename = "_id")]
    pub id: PromotionId,
    pub name: String,
    pub image: String,
    pub label: String,
    pub price: String,
    pub featured: bool,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPromotion {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub price: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub featured: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromotionPatch {
    pub name: Option<String>,
    pub image: Option<String>,
    pub label: Option<String>,
    pub price: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub featured: Option<bool>,
    pub description: Option<String>,
}

impl PromotionPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.image.is_none()
            && self.label.is_none()
            && self.price.is_none()
            && self.featured.is_none()
            && self.description.is_none()
    }
}

/// A member of the restaurant's leadership
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leader {
    #[serde(rename = "_id")]
    pub id: LeaderId,
    pub name: String,
    pub image: String,
    pub designation: String,
    pub abbr: String,
    pub featured: bool,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLeader {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub abbr: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub featured: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderPatch {
    pub name: Option<String>,
    pub image: Option<String>,
    pub designation: Option<String>,
    pub abbr: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub featured: Option<bool>,
    pub description: Option<String>,
}

impl LeaderPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.image.is_none()
            && self.designation.is_none()
            && self.abbr.is_none()
            && self.featured.is_none()
            && self.description.is_none()
    }
}

/// Public part of a comment's author
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub firstname: String,
    pub lastname: String,
}

/// A rated comment on a dish
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: CommentId,
    pub rating: i32,
    pub comment: String,
    pub author: Author,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub rating: i32,
    pub comment: String,
}

/// Only the rating and the text of a comment can change
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPatch {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

impl CommentPatch {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.comment.is_none()
    }
}

/// Element of the `POST /favorites` body
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FavoriteRef {
    #[serde(rename = "_id")]
    pub id: DishId,
}

/// Whether one dish is among a user's favorites
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoriteStatus {
    pub exists: bool,
    pub favorites: Option<Dish>,
}

/// A user's favorite dishes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoriteDishes {
    pub dishes: Vec<Dish>,
}

/// Outcome of a create or delete, shaped like a document-store write result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationStatus {
    pub n: u64,
    pub ok: u8,
}

impl MutationStatus {
    pub fn affected(n: u64) -> Self {
        Self { n, ok: 1 }
    }
}
