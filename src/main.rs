//! Signet - a document template server.
//!
//! This is the main entry point for the template web server.
//! The application is organized into the following modules:
//!
//! - `models`: Data structures for users, templates, recipients, and fields
//! - `auth`: Session management and authentication
//! - `store`: sled-backed persistence for all records
//! - `storage`: Uploaded document files and data URL encoding
//! - `templates`: HTML/CSS/JS templates and rendering
//! - `handlers`: HTTP route handlers

use axum::{routing::get, Router};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use signet::{handlers, AppState};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = Arc::new(AppState::new());

    let app = Router::new()
        // Core routes
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_page).post(handlers::login_submit))
        .route("/signup", get(handlers::signup_page).post(handlers::signup_submit))
        .route("/logout", get(handlers::logout))
        // Template pages
        .route("/templates", get(handlers::templates_page))
        .route(
            "/templates/new",
            get(handlers::new_template_page).post(handlers::create_template_submit),
        )
        .route("/templates/{id}", get(handlers::template_editor))
        .route("/templates/{id}/document.pdf", get(handlers::download_document))
        // Template API
        .route(
            "/api/templates/{id}",
            axum::routing::post(handlers::save_template).delete(handlers::delete_template_api),
        )
        .route(
            "/api/templates/{id}/duplicate",
            axum::routing::post(handlers::duplicate_template_api),
        )
        .route("/api/templates/{id}/data-url", get(handlers::template_data_url))
        .with_state(state);

    let addr = std::env::var("SIGNET_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", addr, e));

    tracing::info!("Signet server running at http://{}", addr);

    axum::serve(listener, app).await.expect("Server error");
}
