//! skylog-web library interface
//!
//! Exposes the router and application state for the binary and for
//! integration testing.

pub mod api;
pub mod error;
pub mod services;
pub mod ui;

pub use crate::error::{PageError, PageResult};

use axum::Router;
use chrono::{DateTime, Utc};
use skylog_common::config::TomlConfig;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::{Geocoder, WeatherClient};

/// Size limits applied by handlers
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Longest accepted inclusive date range
    pub max_range_days: i64,
    /// Rows on the history page
    pub history_limit: i64,
    /// Rows in a full export
    pub export_limit: i64,
}

impl Default for Limits {
    fn default() -> Self {
        Self::from_config(&TomlConfig::default())
    }
}

impl Limits {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            max_range_days: config.weather.max_range_days,
            history_limit: config.history.page_limit,
            export_limit: config.history.export_limit,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub geocoder: Arc<Geocoder>,
    pub weather: Arc<WeatherClient>,
    pub limits: Limits,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, geocoder: Geocoder, weather: WeatherClient, limits: Limits) -> Self {
        Self {
            db,
            geocoder: Arc::new(geocoder),
            weather: Arc::new(weather),
            limits,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // HTML pages (GET)
        .merge(api::page_routes())
        // Form submissions (POST, redirect on success)
        .merge(api::action_routes())
        .merge(api::export_routes())
        .merge(api::static_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
