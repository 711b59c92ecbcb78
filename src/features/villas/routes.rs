use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::villas::handlers;
use crate::features::villas::services::VillaService;

pub const VILLAS_PATH: &str = "/api/villas";

/// Create routes for the villas feature
pub fn routes(service: Arc<VillaService>) -> Router {
    Router::new()
        .route(
            VILLAS_PATH,
            get(handlers::list_villas).post(handlers::create_villa),
        )
        .route(
            "/api/villas/{id}",
            get(handlers::get_villa)
                .put(handlers::update_villa)
                .patch(handlers::update_partial_villa)
                .delete(handlers::delete_villa),
        )
        .with_state(service)
}
