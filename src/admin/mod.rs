//! Pool administration endpoints.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use crate::http::server::AppState;
use self::handlers::*;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_instances))
        .route("/health", get(check_health))
        .route("/add_instance", post(add_instance))
        .route("/remove_instance", post(remove_instance))
}
