//! Form submissions
//!
//! Each action validates, resolves the location, fetches weather, writes,
//! then redirects (303) so a browser refresh never resubmits the form.
//! Failures re-render the form with the user's input kept.

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Redirect,
};
use serde::Deserialize;
use skylog_common::db::{
    create_query_with_snapshot, delete_query_cascade, get_query, update_query_with_snapshot,
    CurrentConditions, DailyRow, NewQuery, QueryUpdate,
};
use skylog_common::time::today;
use tracing::{info, warn};

use crate::error::{messages, PageError, PageResult};
use crate::services::{validate_date_range, DateRange, GeocodeError};
use crate::ui::{EditFields, SearchFields};
use crate::AppState;

/// POST /search body
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub q: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// POST /update body
#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    pub id: i64,
    #[serde(default)]
    pub input_text: String,
    pub label: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// POST /delete body
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub id: i64,
}

/// POST /search
///
/// Stores the lookup with its first snapshot and redirects to
/// `/result?id=N`.
pub async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> PageResult<Redirect> {
    let fields = SearchFields {
        q: form.q.clone(),
        start: form.start.clone().unwrap_or_default(),
        end: form.end.clone().unwrap_or_default(),
    };

    let range = validate_date_range(
        form.start.as_deref(),
        form.end.as_deref(),
        state.limits.max_range_days,
    )
    .map_err(|e| PageError::search(StatusCode::BAD_REQUEST, e.to_string(), fields.clone()))?;

    let location = state.geocoder.resolve(&form.q).await.map_err(|e| {
        PageError::search(StatusCode::BAD_REQUEST, geocode_message(&e), fields.clone())
    })?;

    let (current, rows) = fetch_for_storage(&state, location.lat, location.lon, range)
        .await
        .map_err(|msg| PageError::search(StatusCode::BAD_GATEWAY, msg, fields))?;

    let new_query = NewQuery {
        input_text: form.q,
        resolved_name: location.name,
        lat: location.lat,
        lon: location.lon,
        date_range: range.map(|r| r.as_tuple()),
        label: None,
    };

    let saved = create_query_with_snapshot(&state.db, &new_query, &current, &rows).await?;

    info!(
        query_id = saved.id,
        name = %saved.resolved_name,
        daily_rows = rows.len(),
        "Saved weather lookup"
    );

    Ok(Redirect::to(&format!("/result?id={}", saved.id)))
}

/// POST /update
///
/// Re-resolves the location, overwrites the row and appends a new snapshot.
/// Blank dates clear the stored range; a blank label clears the label.
pub async fn update(
    State(state): State<AppState>,
    Form(form): Form<UpdateForm>,
) -> PageResult<Redirect> {
    if get_query(&state.db, form.id).await?.is_none() {
        return Err(PageError::NotFound);
    }

    let fields = EditFields {
        id: form.id,
        input_text: form.input_text.clone(),
        label: form.label.clone().unwrap_or_default(),
        start: form.start.clone().unwrap_or_default(),
        end: form.end.clone().unwrap_or_default(),
    };

    let range = validate_date_range(
        form.start.as_deref(),
        form.end.as_deref(),
        state.limits.max_range_days,
    )
    .map_err(|e| PageError::edit(StatusCode::BAD_REQUEST, e.to_string(), fields.clone()))?;

    let location = state.geocoder.resolve(&form.input_text).await.map_err(|e| {
        PageError::edit(StatusCode::BAD_REQUEST, geocode_message(&e), fields.clone())
    })?;

    let (current, rows) = fetch_for_storage(&state, location.lat, location.lon, range)
        .await
        .map_err(|msg| PageError::edit(StatusCode::BAD_GATEWAY, msg, fields))?;

    let update = QueryUpdate {
        input_text: form.input_text,
        resolved_name: location.name,
        lat: location.lat,
        lon: location.lon,
        date_range: range.map(|r| r.as_tuple()),
        label: normalize_label(form.label.as_deref()),
    };

    // Row may have been deleted while the weather was being fetched
    if update_query_with_snapshot(&state.db, form.id, &update, &current, &rows)
        .await?
        .is_none()
    {
        return Err(PageError::NotFound);
    }

    info!(query_id = form.id, "Updated weather lookup");

    Ok(Redirect::to(&format!("/result?id={}", form.id)))
}

/// POST /delete
pub async fn delete(
    State(state): State<AppState>,
    Form(form): Form<DeleteForm>,
) -> PageResult<Redirect> {
    if !delete_query_cascade(&state.db, form.id).await? {
        return Err(PageError::NotFound);
    }

    info!(query_id = form.id, "Deleted weather lookup");

    Ok(Redirect::to("/history"))
}

/// Message shown for a failed location lookup
pub(crate) fn geocode_message(err: &GeocodeError) -> &'static str {
    match err {
        GeocodeError::EmptyQuery => messages::EMPTY_QUERY,
        GeocodeError::InvalidCoordinates { .. } => messages::BAD_COORDINATES,
        GeocodeError::Unresolved { .. } => messages::UNRESOLVED,
    }
}

/// Fetch what a stored snapshot holds: current conditions plus either the
/// requested range or the 5-day outlook
///
/// Current conditions are required. A failed range fetch is an error; a
/// failed 5-day outlook is stored as an empty list.
async fn fetch_for_storage(
    state: &AppState,
    lat: f64,
    lon: f64,
    range: Option<DateRange>,
) -> Result<(CurrentConditions, Vec<DailyRow>), &'static str> {
    match range {
        Some(range) => {
            let (rows, current) = tokio::join!(
                state.weather.daily_range(lat, lon, range, today()),
                state.weather.current(lat, lon),
            );

            let rows = rows.map_err(|e| {
                warn!("Date range fetch failed: {}", e);
                messages::RANGE_FETCH_FAILED
            })?;
            let current = current.map_err(|e| {
                warn!("Current conditions fetch failed: {}", e);
                messages::WEATHER_FAILED
            })?;

            Ok((current, rows))
        }
        None => {
            let (current, forecast) = tokio::join!(
                state.weather.current(lat, lon),
                state.weather.forecast_5d(lat, lon),
            );

            let current = current.map_err(|e| {
                warn!("Current conditions fetch failed: {}", e);
                messages::WEATHER_FAILED
            })?;
            let forecast = forecast.unwrap_or_else(|e| {
                warn!("5-day forecast fetch failed, storing none: {}", e);
                Vec::new()
            });

            Ok((current, forecast))
        }
    }
}

fn normalize_label(label: Option<&str>) -> Option<String> {
    label
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ProviderError;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label(Some("  Home ")), Some("Home".to_string()));
        assert_eq!(normalize_label(Some("   ")), None);
        assert_eq!(normalize_label(None), None);
    }

    #[test]
    fn test_geocode_messages() {
        assert_eq!(geocode_message(&GeocodeError::EmptyQuery), messages::EMPTY_QUERY);
        assert_eq!(
            geocode_message(&GeocodeError::Unresolved {
                primary: ProviderError::NoResults,
                fallback: ProviderError::Timeout,
            }),
            messages::UNRESOLVED
        );
    }
}
