use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        // Auth routes
        .route("/api/auth/login", post(handlers::auth::login))
        // Switch inventory routes
        .route("/api/switches", get(handlers::switches::list))
        .route("/api/switches", post(handlers::switches::create))
        .route("/api/switches/:id", get(handlers::switches::get))
        .route("/api/switches/:id", put(handlers::switches::update))
        .route("/api/switches/:id", delete(handlers::switches::delete))
        .route("/api/switches/:id/test", post(handlers::switches::test))
        // Interface routes
        .route("/api/switches/:id/interfaces", get(handlers::interfaces::list))
        .route("/api/switches/:id/interfaces/sync", post(handlers::interfaces::sync))
        .route("/api/switches/:id/interfaces/:name", put(handlers::interfaces::configure))
        // VLAN routes
        .route("/api/switches/:id/vlans", get(handlers::vlans::list))
        .route("/api/switches/:id/vlans", post(handlers::vlans::create))
        .route("/api/switches/:id/vlans/sync", post(handlers::vlans::sync))
        .route("/api/switches/:id/vlans/:vlan_id", delete(handlers::vlans::delete))
        // Port-channel routes
        .route("/api/switches/:id/port-channels", get(handlers::port_channels::list))
        .route("/api/switches/:id/port-channels/sync", post(handlers::port_channels::sync))
        // Configuration routes
        .route("/api/switches/:id/config", get(handlers::configs::get_running))
        .route("/api/switches/:id/config/validate", post(handlers::configs::validate))
        .route("/api/switches/:id/config/apply", post(handlers::configs::apply))
        // Backup routes
        .route("/api/switches/:id/backups", get(handlers::backups::list))
        .route("/api/switches/:id/backups", post(handlers::backups::create))
        .route("/api/backups/:id", get(handlers::backups::get))
        .route("/api/backups/:id/restore", post(handlers::backups::restore))
        .route("/api/backups/:a/diff/:b", get(handlers::backups::diff))
        // VLAN matrix routes
        .route("/api/switches/:id/vlan-matrix", get(handlers::vlan_matrix::get))
        .route("/api/switches/:id/vlan-matrix", post(handlers::vlan_matrix::apply))
        // Audit trail
        .route("/api/audit", get(handlers::audit::list))
        // Health check
        .route("/api/health", get(handlers::healthcheck))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
