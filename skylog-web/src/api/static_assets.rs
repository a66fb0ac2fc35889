//! Embedded stylesheet and script

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

const APP_CSS: &str = include_str!("../../static/app.css");
const GEOLOCATE_JS: &str = include_str!("../../static/geolocate.js");

/// GET /static/app.css
pub async fn serve_css() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "text/css; charset=utf-8"),
            ("cache-control", "public, max-age=3600"),
        ],
        APP_CSS,
    )
        .into_response()
}

/// GET /static/geolocate.js
///
/// Browser geolocation for the "Use my location" button
pub async fn serve_geolocate_js() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "application/javascript; charset=utf-8"),
            ("cache-control", "public, max-age=3600"),
        ],
        GEOLOCATE_JS,
    )
        .into_response()
}
