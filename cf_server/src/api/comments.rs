//! Comment handlers.
//!
//! Any verified user may comment on a dish; only the author may edit or
//! remove a single comment. Wiping a dish's comments is admin only.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::Response,
};
use confusion::menu::{Comment, CommentId, CommentPatch, DishId, MutationStatus, NewComment};

use super::{AppState, error::ApiError, item_or_empty, middleware::CurrentUser};

pub async fn list_comments(
    State(state): State<AppState>,
    path: Result<Path<DishId>, PathRejection>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let Path(dish_id) = path?;
    Ok(Json(state.menu_manager.list_comments(dish_id).await?))
}

pub async fn get_comment(
    State(state): State<AppState>,
    path: Result<Path<(DishId, CommentId)>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path((dish_id, comment_id)) = path?;
    let comment = state.menu_manager.get_comment(dish_id, comment_id).await?;
    Ok(item_or_empty(comment))
}

/// Post a comment authored by the caller
pub async fn add_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<DishId>, PathRejection>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> Result<Json<MutationStatus>, ApiError> {
    let author_id = user.id()?;
    let Path(dish_id) = path?;
    let Json(comment) = payload?;
    let status = state
        .menu_manager
        .add_comment(dish_id, author_id, comment)
        .await?;
    Ok(Json(status))
}

pub async fn update_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<(DishId, CommentId)>, PathRejection>,
    payload: Result<Json<CommentPatch>, JsonRejection>,
) -> Result<Response, ApiError> {
    let requester = user.id()?;
    let Path((dish_id, comment_id)) = path?;
    let Json(patch) = payload?;
    let updated = state
        .menu_manager
        .update_comment(dish_id, comment_id, requester, patch)
        .await?;
    Ok(item_or_empty(updated))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<(DishId, CommentId)>, PathRejection>,
) -> Result<Json<MutationStatus>, ApiError> {
    let requester = user.id()?;
    let Path((dish_id, comment_id)) = path?;
    let status = state
        .menu_manager
        .delete_comment(dish_id, comment_id, requester)
        .await?;
    Ok(Json(status))
}

pub async fn delete_all_comments(
    State(state): State<AppState>,
    path: Result<Path<DishId>, PathRejection>,
) -> Result<Json<MutationStatus>, ApiError> {
    let Path(dish_id) = path?;
    Ok(Json(state.menu_manager.delete_all_comments(dish_id).await?))
}
