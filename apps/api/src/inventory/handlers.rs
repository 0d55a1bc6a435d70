use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{require_text, AppError};
use crate::inventory::digest::{compute_digest, ExpiryDigest};
use crate::inventory::expiry::parse_expiration;
use crate::inventory::listing::{
    annotate, build_listing, ItemFilter, ListedItem, ListingQuery, SortMode,
};
use crate::models::item::check_quantity;
use crate::models::{DatedItem, Fridge, ItemUpdate, NewFridge, NewItem};
use crate::state::AppState;
use crate::store::AddOutcome;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct ShareRequest {
    pub user_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    pub q: Option<String>,
    #[serde(default)]
    pub filter: ItemFilter,
    #[serde(default)]
    pub sort: SortMode,
    pub threshold_days: Option<u32>,
    /// Overrides the server date, `yyyy-MM-dd`.
    pub today: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertParams {
    pub threshold_days: Option<u32>,
    pub today: Option<String>,
}

#[derive(Serialize)]
pub struct ListingResponse {
    pub fridge: Fridge,
    pub today: NaiveDate,
    pub threshold_days: u32,
    pub items: Vec<ListedItem>,
}

#[derive(Deserialize)]
pub struct DeleteItemsRequest {
    pub ids: Vec<i64>,
}

#[derive(Serialize)]
pub struct DeleteItemsResponse {
    pub deleted: usize,
}

fn resolve_today(param: Option<&str>) -> Result<NaiveDate, AppError> {
    match param {
        Some(raw) => parse_expiration(raw)
            .ok_or_else(|| AppError::Validation(format!("today '{raw}' is not a yyyy-MM-dd date"))),
        None => Ok(Local::now().date_naive()),
    }
}

/// Bad dates are accepted and treated as non-expiring, but worth a trace.
fn warn_on_unparseable(item_id: i64, date: Option<&str>) {
    if let Some(raw) = date {
        if parse_expiration(raw).is_none() {
            warn!("Item {item_id} has unparseable expiration date '{raw}'; it will never be flagged");
        }
    }
}

/// GET /api/v1/fridges
pub async fn handle_list_fridges(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<Fridge>>, AppError> {
    let user_id = require_text("user_id", &params.user_id)?;
    let fridges = state.store.list_fridges(&user_id).await?;
    Ok(Json(fridges))
}

/// POST /api/v1/fridges
pub async fn handle_create_fridge(
    State(state): State<AppState>,
    Json(req): Json<NewFridge>,
) -> Result<(StatusCode, Json<Fridge>), AppError> {
    let new = NewFridge {
        owner: require_text("owner", &req.owner)?,
        name: require_text("name", &req.name)?,
        color: req.color.filter(|c| !c.trim().is_empty()),
    };
    let fridge = state.store.create_fridge(new).await?;
    info!("Fridge {} '{}' created by {}", fridge.id, fridge.name, fridge.owner);
    Ok((StatusCode::CREATED, Json(fridge)))
}

/// DELETE /api/v1/fridges/:id
pub async fn handle_delete_fridge(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.store.delete_fridge(id).await?;
    info!("Fridge {id} deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/fridges/:id/share
pub async fn handle_share_fridge(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ShareRequest>,
) -> Result<Json<Fridge>, AppError> {
    let user_id = require_text("user_id", &req.user_id)?;
    let fridge = state.store.share_fridge(id, &user_id).await?;
    Ok(Json(fridge))
}

/// GET /api/v1/fridges/:id/items
pub async fn handle_list_items(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<ListingParams>,
) -> Result<Json<ListingResponse>, AppError> {
    let today = resolve_today(params.today.as_deref())?;
    let threshold_days = params
        .threshold_days
        .unwrap_or(state.config.expiring_soon_days);

    let fridge = state.store.get_fridge(id).await?;
    let items = state.store.list_items(id).await?;

    let query = ListingQuery {
        search: params.q,
        filter: params.filter,
        sort: params.sort,
        threshold_days,
    };
    let listed = annotate(build_listing(&items, &query, today), today, threshold_days);

    Ok(Json(ListingResponse {
        fridge,
        today,
        threshold_days,
        items: listed,
    }))
}

/// POST /api/v1/fridges/:id/items
/// 201 when the item is new, 200 when an existing item's quantity grew.
pub async fn handle_add_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NewItem>,
) -> Result<(StatusCode, Json<AddOutcome>), AppError> {
    if let Some(quantity) = req.quantity {
        if quantity == 0 {
            return Err(AppError::Validation("quantity must be positive".into()));
        }
        check_quantity(quantity)?;
    }
    let name = require_text("name", &req.name)?;
    warn_on_unparseable(req.id, req.expiration_date.as_deref());

    let outcome = state.store.add_item(id, NewItem { name, ..req }).await?;
    let status = if outcome.created {
        info!("Item {} added to fridge {id}", outcome.item.id);
        StatusCode::CREATED
    } else {
        info!(
            "Item {} in fridge {id} now has quantity {}",
            outcome.item.id, outcome.item.quantity
        );
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

/// GET /api/v1/fridges/:id/items/:item_id
pub async fn handle_get_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i64, i64)>,
) -> Result<Json<DatedItem>, AppError> {
    Ok(Json(state.store.get_item(id, item_id).await?))
}

/// PATCH /api/v1/fridges/:id/items/:item_id
pub async fn handle_update_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i64, i64)>,
    Json(req): Json<ItemUpdate>,
) -> Result<Json<DatedItem>, AppError> {
    let name = req
        .name
        .as_deref()
        .map(|n| require_text("name", n))
        .transpose()?;
    req.quantity.map(check_quantity).transpose()?;
    warn_on_unparseable(item_id, req.expiration_date.as_deref());

    let item = state
        .store
        .update_item(id, item_id, ItemUpdate { name, ..req })
        .await?;
    Ok(Json(item))
}

/// DELETE /api/v1/fridges/:id/items
/// Body `{"ids": [..]}`; ids that are not in the fridge are skipped.
pub async fn handle_delete_items(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<DeleteItemsRequest>,
) -> Result<Json<DeleteItemsResponse>, AppError> {
    let deleted = state.store.delete_items(id, &req.ids).await?;
    info!("Deleted {deleted} of {} requested items from fridge {id}", req.ids.len());
    Ok(Json(DeleteItemsResponse { deleted }))
}

/// GET /api/v1/fridges/:id/alerts
pub async fn handle_alerts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<AlertParams>,
) -> Result<Json<ExpiryDigest>, AppError> {
    let today = resolve_today(params.today.as_deref())?;
    let threshold_days = params
        .threshold_days
        .unwrap_or(state.config.expiring_soon_days);
    let items = state.store.list_items(id).await?;
    Ok(Json(compute_digest(&items, today, threshold_days)))
}
