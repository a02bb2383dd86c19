//! Favorite dish handlers. Every route acts on the caller's own list.
//!
//! Mutations answer with the caller's full favorite list:
//!
//! ```json
//! {"dishes": [{"_id": 1, "name": "Uthappizza", ...}]}
//! ```

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use confusion::menu::{DishId, FavoriteDishes, FavoriteRef, FavoriteStatus};

use super::{AppState, error::ApiError, middleware::CurrentUser};

pub async fn list_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<FavoriteDishes>, ApiError> {
    let user_id = user.id()?;
    Ok(Json(state.menu_manager.list_favorites(user_id).await?))
}

/// Add a batch of dishes, all or none; repeats are ignored
pub async fn add_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<Vec<FavoriteRef>>, JsonRejection>,
) -> Result<Json<FavoriteDishes>, ApiError> {
    let user_id = user.id()?;
    let Json(refs) = payload?;
    let dish_ids: Vec<DishId> = refs.iter().map(|favorite| favorite.id).collect();
    Ok(Json(
        state.menu_manager.add_favorites(user_id, &dish_ids).await?,
    ))
}

pub async fn clear_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<FavoriteDishes>, ApiError> {
    let user_id = user.id()?;
    Ok(Json(state.menu_manager.clear_favorites(user_id).await?))
}

/// `{exists, favorites}` for one dish
pub async fn favorite_status(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<DishId>, PathRejection>,
) -> Result<Json<FavoriteStatus>, ApiError> {
    let user_id = user.id()?;
    let Path(dish_id) = path?;
    Ok(Json(
        state.menu_manager.favorite_status(user_id, dish_id).await?,
    ))
}

pub async fn add_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<DishId>, PathRejection>,
) -> Result<Json<FavoriteDishes>, ApiError> {
    let user_id = user.id()?;
    let Path(dish_id) = path?;
    Ok(Json(state.menu_manager.add_favorite(user_id, dish_id).await?))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<DishId>, PathRejection>,
) -> Result<Json<FavoriteDishes>, ApiError> {
    let user_id = user.id()?;
    let Path(dish_id) = path?;
    Ok(Json(
        state.menu_manager.remove_favorite(user_id, dish_id).await?,
    ))
}
