//! HTML page handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use serde::Deserialize;
use skylog_common::db::{
    count_snapshots, get_latest_snapshot, get_query, list_queries, unpack_snapshot,
    CurrentConditions, DailyRow,
};
use skylog_common::time::today;
use tracing::{debug, warn};

use crate::error::{messages, PageError, PageResult};
use crate::services::{validate_date_range, DateRange};
use crate::ui::{self, result::ResultView, EditFields, SearchFields};
use crate::AppState;

/// GET /result parameters
///
/// `id` selects a stored lookup. Without it, `lat`, `lon` and `name` request
/// a live lookup that is shown but not saved.
#[derive(Debug, Default, Deserialize)]
pub struct ResultQuery {
    pub id: Option<i64>,
    pub q: Option<String>,
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<i64>,
}

/// GET /
pub async fn index_page() -> Html<String> {
    Html(ui::index::render(&SearchFields::default(), None))
}

/// GET /result
pub async fn result_page(
    State(state): State<AppState>,
    Query(params): Query<ResultQuery>,
) -> PageResult<Html<String>> {
    match params.id {
        Some(id) => stored_result(&state, id).await,
        None => live_result(&state, params).await,
    }
}

async fn stored_result(state: &AppState, id: i64) -> PageResult<Html<String>> {
    let query = get_query(&state.db, id).await?.ok_or(PageError::NotFound)?;
    let snapshot = get_latest_snapshot(&state.db, id).await?;
    let (current, rows) = unpack_snapshot(snapshot.as_ref())?;
    let snapshot_count = count_snapshots(&state.db, id).await?;

    let view = ResultView {
        id: Some(query.id),
        is_range: query.has_date_range(),
        date_range: query.date_range(),
        query: query.input_text,
        name: query.resolved_name,
        lat: query.lat,
        lon: query.lon,
        label: query.label,
        current,
        rows,
        snapshot_count: Some(snapshot_count),
        snapshot_at: snapshot.map(|s| s.created_at),
    };

    Ok(Html(ui::result::render(&view)))
}

async fn live_result(state: &AppState, params: ResultQuery) -> PageResult<Html<String>> {
    let fields = SearchFields {
        q: params.q.clone().unwrap_or_default(),
        start: params.start.clone().unwrap_or_default(),
        end: params.end.clone().unwrap_or_default(),
    };

    let (Some(lat), Some(lon), Some(name)) = (params.lat, params.lon, params.name) else {
        return Err(PageError::search(StatusCode::BAD_REQUEST, messages::NO_ID, fields));
    };

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(PageError::search(
            StatusCode::BAD_REQUEST,
            messages::BAD_COORDINATES,
            fields,
        ));
    }

    let range = validate_date_range(
        params.start.as_deref(),
        params.end.as_deref(),
        state.limits.max_range_days,
    )
    .map_err(|e| PageError::search(StatusCode::BAD_REQUEST, e.to_string(), fields))?;

    debug!(lat, lon, "Live lookup (not saved)");
    let (current, rows) = fetch_live(state, lat, lon, range).await;

    let view = ResultView {
        id: None,
        query: params.q.unwrap_or_default(),
        name,
        lat,
        lon,
        label: None,
        current,
        rows,
        is_range: range.is_some(),
        date_range: range.map(|r| r.as_tuple()),
        snapshot_count: None,
        snapshot_at: None,
    };

    Ok(Html(ui::result::render(&view)))
}

/// Nothing is stored, so a failed section is shown as unavailable
async fn fetch_live(
    state: &AppState,
    lat: f64,
    lon: f64,
    range: Option<DateRange>,
) -> (Option<CurrentConditions>, Vec<DailyRow>) {
    let (current, rows) = match range {
        Some(range) => {
            tokio::join!(
                state.weather.current(lat, lon),
                state.weather.daily_range(lat, lon, range, today()),
            )
        }
        None => {
            tokio::join!(
                state.weather.current(lat, lon),
                state.weather.forecast_5d(lat, lon),
            )
        }
    };

    let current = current
        .map_err(|e| warn!("Live current conditions failed: {}", e))
        .ok();
    let rows = rows.unwrap_or_else(|e| {
        warn!("Live daily rows failed: {}", e);
        Vec::new()
    });

    (current, rows)
}

/// GET /history
pub async fn history_page(State(state): State<AppState>) -> PageResult<Html<String>> {
    let rows = list_queries(&state.db, state.limits.history_limit).await?;
    Ok(Html(ui::history::render(&rows)))
}

/// GET /edit
pub async fn edit_page(
    State(state): State<AppState>,
    Query(params): Query<IdQuery>,
) -> PageResult<Html<String>> {
    let Some(id) = params.id else {
        return Err(PageError::search(
            StatusCode::BAD_REQUEST,
            messages::NO_ID,
            SearchFields::default(),
        ));
    };

    let query = get_query(&state.db, id).await?.ok_or(PageError::NotFound)?;

    Ok(Html(ui::edit::render(&EditFields::from_query(&query), None)))
}
