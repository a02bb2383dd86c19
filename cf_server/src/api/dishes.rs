//! Dish handlers.
//!
//! Reads are public; every mutation sits behind the admin gate.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::Response,
};
use confusion::menu::{Dish, DishId, DishPatch, MutationStatus, NewDish};

use super::{AppState, ListQuery, error::ApiError, item_or_empty};

/// `GET /dishes[?featured=true]`
pub async fn list_dishes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Dish>>, ApiError> {
    let dishes = state.menu_manager.list_dishes(query.featured_only()).await?;
    Ok(Json(dishes))
}

/// `GET /dishes/{dish_id}`: the dish with its comments, or `{}`
pub async fn get_dish(
    State(state): State<AppState>,
    path: Result<Path<DishId>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(dish_id) = path?;
    let dish = state.menu_manager.get_dish(dish_id).await?;
    Ok(item_or_empty(dish))
}

pub async fn create_dish(
    State(state): State<AppState>,
    payload: Result<Json<NewDish>, JsonRejection>,
) -> Result<Json<MutationStatus>, ApiError> {
    let Json(dish) = payload?;
    Ok(Json(state.menu_manager.create_dish(dish).await?))
}

/// `PUT /dishes/{dish_id}`: the updated dish, or `{}` when no row matched
pub async fn update_dish(
    State(state): State<AppState>,
    path: Result<Path<DishId>, PathRejection>,
    payload: Result<Json<DishPatch>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Path(dish_id) = path?;
    let Json(patch) = payload?;
    let updated = state.menu_manager.update_dish(dish_id, patch).await?;
    Ok(item_or_empty(updated))
}

pub async fn delete_dish(
    State(state): State<AppState>,
    path: Result<Path<DishId>, PathRejection>,
) -> Result<Json<MutationStatus>, ApiError> {
    let Path(dish_id) = path?;
    Ok(Json(state.menu_manager.delete_dish(dish_id).await?))
}

pub async fn delete_all_dishes(
    State(state): State<AppState>,
) -> Result<Json<MutationStatus>, ApiError> {
    Ok(Json(state.menu_manager.delete_all_dishes().await?))
}
