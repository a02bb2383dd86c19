//! Leader handlers.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::Response,
};
use confusion::menu::{Leader, LeaderId, LeaderPatch, MutationStatus, NewLeader};

use super::{AppState, ListQuery, error::ApiError, item_or_empty};

pub async fn list_leaders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Leader>>, ApiError> {
    let leaders = state.menu_manager.list_leaders(query.featured_only()).await?;
    Ok(Json(leaders))
}

pub async fn get_leader(
    State(state): State<AppState>,
    path: Result<Path<LeaderId>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(leader_id) = path?;
    Ok(item_or_empty(state.menu_manager.get_leader(leader_id).await?))
}

pub async fn create_leader(
    State(state): State<AppState>,
    payload: Result<Json<NewLeader>, JsonRejection>,
) -> Result<Json<MutationStatus>, ApiError> {
    let Json(leader) = payload?;
    Ok(Json(state.menu_manager.create_leader(leader).await?))
}

pub async fn update_leader(
    State(state): State<AppState>,
    path: Result<Path<LeaderId>, PathRejection>,
    payload: Result<Json<LeaderPatch>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Path(leader_id) = path?;
    let Json(patch) = payload?;
    let updated = state.menu_manager.update_leader(leader_id, patch).await?;
    Ok(item_or_empty(updated))
}

pub async fn delete_leader(
    State(state): State<AppState>,
    path: Result<Path<LeaderId>, PathRejection>,
) -> Result<Json<MutationStatus>, ApiError> {
    let Path(leader_id) = path?;
    Ok(Json(state.menu_manager.delete_leader(leader_id).await?))
}

pub async fn delete_all_leaders(
    State(state): State<AppState>,
) -> Result<Json<MutationStatus>, ApiError> {
    Ok(Json(state.menu_manager.delete_all_leaders().await?))
}
