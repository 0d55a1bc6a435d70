use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{require_text, AppError};
use crate::models::ShoppingEntry;
use crate::shopping::list::validate_entry;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct AddShoppingRequest {
    pub user_id: String,
    pub name: String,
    pub quantity: Option<u32>,
}

#[derive(Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

/// GET /api/v1/shopping
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ShoppingEntry>>, AppError> {
    let user_id = require_text("user_id", &params.user_id)?;
    Ok(Json(state.store.list_shopping(&user_id).await?))
}

/// POST /api/v1/shopping
/// Adding a name already on the list (in any casing) increases its quantity.
pub async fn handle_add(
    State(state): State<AppState>,
    Json(req): Json<AddShoppingRequest>,
) -> Result<Json<ShoppingEntry>, AppError> {
    let user_id = require_text("user_id", &req.user_id)?;
    let quantity = req.quantity.unwrap_or(1);
    let name = validate_entry(&req.name, quantity)?;
    let entry = state.store.add_shopping(&user_id, &name, quantity).await?;
    info!("Shopping list of {user_id}: {} x{}", entry.name, entry.quantity);
    Ok(Json(entry))
}

/// DELETE /api/v1/shopping/:name
pub async fn handle_remove(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let user_id = require_text("user_id", &params.user_id)?;
    if state.store.remove_shopping(&user_id, &name).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("'{name}' is not on the shopping list")))
    }
}

/// DELETE /api/v1/shopping
pub async fn handle_clear(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ClearResponse>, AppError> {
    let user_id = require_text("user_id", &params.user_id)?;
    let removed = state.store.clear_shopping(&user_id).await?;
    Ok(Json(ClearResponse { removed }))
}
