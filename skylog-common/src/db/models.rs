//! Database models
//!
//! Snapshot payloads are stored as JSON text; `CurrentConditions` and
//! `DailyRow` are their decoded forms.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One submitted location lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub id: i64,
    /// Text exactly as the user typed it
    pub input_text: String,
    /// Display name returned by the geocoder
    pub resolved_name: String,
    pub lat: f64,
    pub lon: f64,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SearchQuery {
    /// Both ends of the date range, if this query was a range lookup
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_start.zip(self.date_end)
    }

    pub fn has_date_range(&self) -> bool {
        self.date_start.is_some() || self.date_end.is_some()
    }
}

/// One stored weather result belonging to a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub id: i64,
    pub query_id: i64,
    pub current_json: String,
    pub forecast_json: String,
    pub created_at: DateTime<Utc>,
}

/// Current conditions, metric values with imperial conversions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentConditions {
    pub temperature_c: Option<f64>,
    pub temperature_f: Option<f64>,
    pub apparent_c: Option<f64>,
    pub apparent_f: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_speed_mph: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub precipitation_in: Option<f64>,
    pub weather_code: Option<i64>,
    pub weather_desc: String,
}

/// One day of forecast or archive data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyRow {
    /// ISO date as reported by the weather API
    pub date: String,
    pub tmax_c: Option<f64>,
    pub tmax_f: Option<f64>,
    pub tmin_c: Option<f64>,
    pub tmin_f: Option<f64>,
    pub precip_mm: Option<f64>,
    pub precip_in: Option<f64>,
    pub weather_code: Option<i64>,
    pub weather_desc: String,
}

/// Fields for inserting a new query row
#[derive(Debug, Clone)]
pub struct NewQuery {
    pub input_text: String,
    pub resolved_name: String,
    pub lat: f64,
    pub lon: f64,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub label: Option<String>,
}

/// Replacement values written by an edit
///
/// An edit re-resolves the location, so every field is overwritten; a `None`
/// date range or label clears the stored value.
#[derive(Debug, Clone)]
pub struct QueryUpdate {
    pub input_text: String,
    pub resolved_name: String,
    pub lat: f64,
    pub lon: f64,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub label: Option<String>,
}
