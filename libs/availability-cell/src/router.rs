use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn availability_routes(state: Arc<AppConfig>) -> Router {
    // Slot lookups are public; booking and schedule management live elsewhere.
    Router::new()
        .route("/slots", get(handlers::get_available_slots))
        .with_state(state)
}
