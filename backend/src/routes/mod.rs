//! Route definitions for the Battery Service Console

use axum::{middleware, routing::get, Router};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - client details
        .nest("/clients", client_routes())
}

/// Client details routes (protected)
fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/:client_id/warranties", get(handlers::get_client_warranties))
        .route(
            "/:client_id/warranties/export",
            get(handlers::export_client_warranties),
        )
        .route("/:client_id/summary", get(handlers::get_client_summary))
        .route_layer(middleware::from_fn(auth_middleware))
}
