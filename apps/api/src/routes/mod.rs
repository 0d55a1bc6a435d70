pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::gesture::handlers as gesture;
use crate::inventory::handlers as inventory;
use crate::shopping::handlers as shopping;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Fridges
        .route(
            "/api/v1/fridges",
            get(inventory::handle_list_fridges).post(inventory::handle_create_fridge),
        )
        .route(
            "/api/v1/fridges/:id",
            axum::routing::delete(inventory::handle_delete_fridge),
        )
        .route("/api/v1/fridges/:id/share", post(inventory::handle_share_fridge))
        .route("/api/v1/fridges/:id/alerts", get(inventory::handle_alerts))
        // Items
        .route(
            "/api/v1/fridges/:id/items",
            get(inventory::handle_list_items)
                .post(inventory::handle_add_item)
                .delete(inventory::handle_delete_items),
        )
        .route(
            "/api/v1/fridges/:id/items/:item_id",
            get(inventory::handle_get_item).patch(inventory::handle_update_item),
        )
        // Shopping list
        .route(
            "/api/v1/shopping",
            get(shopping::handle_list)
                .post(shopping::handle_add)
                .delete(shopping::handle_clear),
        )
        .route(
            "/api/v1/shopping/:name",
            axum::routing::delete(shopping::handle_remove),
        )
        // Motion
        .route(
            "/api/v1/devices/:device_id/motion",
            post(gesture::handle_motion).delete(gesture::handle_reset_motion),
        )
        .with_state(state)
}
