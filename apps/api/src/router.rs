use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use availability_cell::router::availability_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .nest("/availability", availability_routes(state))
}
