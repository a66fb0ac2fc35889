//! # SkyLog Common Library
//!
//! Shared code for the SkyLog weather lookup service:
//! - Database initialization, models and queries
//! - Configuration loading and root folder resolution
//! - Common error type
//! - Timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
