//! Error types for skylog-web page handlers
//!
//! A failed form submission re-renders the form it came from, with the
//! user's input kept and the message shown above it.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::ui::{self, EditFields, SearchFields};

/// User-visible messages
pub mod messages {
    pub const UNRESOLVED: &str = "Could not resolve that location. Try a city, ZIP, or 'lat,lon'.";
    pub const EMPTY_QUERY: &str = "Please enter a location.";
    pub const BAD_COORDINATES: &str =
        "Coordinates must be within -90..90 latitude and -180..180 longitude.";
    pub const RANGE_FETCH_FAILED: &str = "Could not fetch date-range data.";
    pub const WEATHER_FAILED: &str = "Weather lookup failed. Please try again.";
    pub const NOT_FOUND: &str = "Record not found.";
    pub const NO_ID: &str = "No id provided.";
    pub const INTERNAL: &str = "Something went wrong. Please try again.";
}

/// Page handler error
#[derive(Debug, Error)]
pub enum PageError {
    /// Re-render the search form
    #[error("{message}")]
    Search {
        status: StatusCode,
        message: String,
        fields: SearchFields,
    },

    /// Re-render the edit form
    #[error("{message}")]
    Edit {
        status: StatusCode,
        message: String,
        fields: EditFields,
    },

    /// Requested query row does not exist (404)
    #[error("Record not found")]
    NotFound,

    /// skylog-common error (database, stored payload)
    #[error("Common error: {0}")]
    Common(#[from] skylog_common::Error),
}

impl PageError {
    pub fn search(status: StatusCode, message: impl Into<String>, fields: SearchFields) -> Self {
        PageError::Search {
            status,
            message: message.into(),
            fields,
        }
    }

    pub fn edit(status: StatusCode, message: impl Into<String>, fields: EditFields) -> Self {
        PageError::Edit {
            status,
            message: message.into(),
            fields,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::Search {
                status,
                message,
                fields,
            } => (status, Html(ui::index::render(&fields, Some(&message)))).into_response(),
            PageError::Edit {
                status,
                message,
                fields,
            } => (status, Html(ui::edit::render(&fields, Some(&message)))).into_response(),
            PageError::NotFound => (
                StatusCode::NOT_FOUND,
                Html(ui::index::render(
                    &SearchFields::default(),
                    Some(messages::NOT_FOUND),
                )),
            )
                .into_response(),
            PageError::Common(err) => {
                error!("Page handler failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(ui::index::render(
                        &SearchFields::default(),
                        Some(messages::INTERNAL),
                    )),
                )
                    .into_response()
            }
        }
    }
}

/// Result type for page handlers
pub type PageResult<T> = Result<T, PageError>;
