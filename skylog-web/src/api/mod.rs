//! HTTP handlers for skylog-web
//!
//! Pages render HTML; form posts write and then redirect (303) to a page;
//! exports download JSON or CSV.

pub mod actions;
pub mod export;
pub mod health;
pub mod pages;
pub mod static_assets;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub use health::health_routes;

/// Build HTML page routes
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::index_page))
        .route("/result", get(pages::result_page))
        .route("/history", get(pages::history_page))
        .route("/edit", get(pages::edit_page))
}

/// Build form submission routes
pub fn action_routes() -> Router<AppState> {
    Router::new()
        .route("/search", post(actions::search))
        .route("/update", post(actions::update))
        .route("/delete", post(actions::delete))
}

/// Build download routes
pub fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/export/json", get(export::export_json))
        .route("/export/csv", get(export::export_csv))
}

/// Build embedded asset routes
pub fn static_routes() -> Router<AppState> {
    Router::new()
        .route("/static/app.css", get(static_assets::serve_css))
        .route("/static/geolocate.js", get(static_assets::serve_geolocate_js))
}
