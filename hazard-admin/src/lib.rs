//! hazard-admin library - administration interface for hazard categories
//! and technical recommendations
//!
//! Every handler runs against its own transaction taken from the shared
//! pool; writes commit explicitly and roll back on any error.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod reconcile;
pub mod templates;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::admin_index))
        .route("/technical_rec", get(api::list_technical_recs))
        .route(
            "/technical_rec/new",
            get(api::load_new_technical_rec_form).post(api::submit_new_technical_rec),
        )
        .route(
            "/technical_rec/:id",
            get(api::load_edit_technical_rec_form).post(api::submit_edit_technical_rec),
        )
        .route(
            "/:hazard_type/:hazard_level",
            get(api::load_hazard_category_form).post(api::submit_hazard_category_form),
        )
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
