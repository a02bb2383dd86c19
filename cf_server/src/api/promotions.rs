//! Promotion handlers. Reads are public, mutations admin only.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::Response,
};
use confusion::menu::{MutationStatus, NewPromotion, Promotion, PromotionId, PromotionPatch};

use super::{AppState, ListQuery, error::ApiError, item_or_empty};

pub async fn list_promotions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Promotion>>, ApiError> {
    let promotions = state
        .menu_manager
        .list_promotions(query.featured_only())
        .await?;
    Ok(Json(promotions))
}

pub async fn get_promotion(
    State(state): State<AppState>,
    path: Result<Path<PromotionId>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(promotion_id) = path?;
    let promotion = state.menu_manager.get_promotion(promotion_id).await?;
    Ok(item_or_empty(promotion))
}

pub async fn create_promotion(
    State(state): State<AppState>,
    payload: Result<Json<NewPromotion>, JsonRejection>,
) -> Result<Json<MutationStatus>, ApiError> {
    let Json(promotion) = payload?;
    Ok(Json(state.menu_manager.create_promotion(promotion).await?))
}

pub async fn update_promotion(
    State(state): State<AppState>,
    path: Result<Path<PromotionId>, PathRejection>,
    payload: Result<Json<PromotionPatch>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Path(promotion_id) = path?;
    let Json(patch) = payload?;
    let updated = state
        .menu_manager
        .update_promotion(promotion_id, patch)
        .await?;
    Ok(item_or_empty(updated))
}

pub async fn delete_promotion(
    State(state): State<AppState>,
    path: Result<Path<PromotionId>, PathRejection>,
) -> Result<Json<MutationStatus>, ApiError> {
    let Path(promotion_id) = path?;
    Ok(Json(state.menu_manager.delete_promotion(promotion_id).await?))
}

pub async fn delete_all_promotions(
    State(state): State<AppState>,
) -> Result<Json<MutationStatus>, ApiError> {
    Ok(Json(state.menu_manager.delete_all_promotions().await?))
}
