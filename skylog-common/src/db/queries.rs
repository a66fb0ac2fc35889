//! Search query and snapshot database operations

use sqlx::sqlite::SqliteRow;
use chrono::{DateTime, Utc};
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use tracing::debug;

use crate::db::models::{
    CurrentConditions, DailyRow, NewQuery, QueryUpdate, SearchQuery, WeatherSnapshot,
};
use crate::time::{format_date, format_timestamp, now, parse_date, parse_timestamp};
use crate::Result;

const QUERY_COLUMNS: &str =
    "id, input_text, resolved_name, lat, lon, date_start, date_end, label, created_at";

const SNAPSHOT_COLUMNS: &str = "id, query_id, current_json, forecast_json, created_at";

/// Insert a query row and its first snapshot in one transaction
pub async fn create_query_with_snapshot(
    pool: &SqlitePool,
    new_query: &NewQuery,
    current: &CurrentConditions,
    forecast: &[DailyRow],
) -> Result<SearchQuery> {
    // Prepare all data BEFORE opening the transaction
    let created_at = now();
    let created_at_str = format_timestamp(&created_at);
    let current_json = serde_json::to_string(current)?;
    let forecast_json = serde_json::to_string(forecast)?;
    let (date_start, date_end) = split_range(new_query.date_range);

    let mut tx = pool.begin().await?;

    let id = sqlx::query(
        r#"
        INSERT INTO search_queries (
            input_text, resolved_name, lat, lon, date_start, date_end, label, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new_query.input_text)
    .bind(&new_query.resolved_name)
    .bind(new_query.lat)
    .bind(new_query.lon)
    .bind(&date_start)
    .bind(&date_end)
    .bind(&new_query.label)
    .bind(&created_at_str)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    insert_snapshot(&mut *tx, id, &current_json, &forecast_json, &created_at).await?;

    tx.commit().await?;

    debug!(query_id = id, "Stored query with initial snapshot");

    Ok(SearchQuery {
        id,
        input_text: new_query.input_text.clone(),
        resolved_name: new_query.resolved_name.clone(),
        lat: new_query.lat,
        lon: new_query.lon,
        date_start: new_query.date_range.map(|(start, _)| start),
        date_end: new_query.date_range.map(|(_, end)| end),
        label: new_query.label.clone(),
        created_at,
    })
}

/// Most recent queries first
pub async fn list_queries(pool: &SqlitePool, limit: i64) -> Result<Vec<SearchQuery>> {
    let sql = format!(
        "SELECT {} FROM search_queries ORDER BY created_at DESC, id DESC LIMIT ?",
        QUERY_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(limit).fetch_all(pool).await?;

    rows.iter().map(query_from_row).collect()
}

/// Load one query row
pub async fn get_query(pool: &SqlitePool, id: i64) -> Result<Option<SearchQuery>> {
    let sql = format!("SELECT {} FROM search_queries WHERE id = ?", QUERY_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    row.as_ref().map(query_from_row).transpose()
}

/// Newest snapshot of a query (ties on `created_at` go to the later insert)
pub async fn get_latest_snapshot(
    pool: &SqlitePool,
    query_id: i64,
) -> Result<Option<WeatherSnapshot>> {
    let sql = format!(
        "SELECT {} FROM weather_snapshots WHERE query_id = ? ORDER BY created_at DESC, id DESC LIMIT 1",
        SNAPSHOT_COLUMNS
    );
    let row = sqlx::query(&sql).bind(query_id).fetch_optional(pool).await?;

    row.as_ref().map(snapshot_from_row).transpose()
}

/// Number of snapshots recorded for a query
pub async fn count_snapshots(pool: &SqlitePool, query_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM weather_snapshots WHERE query_id = ?")
        .bind(query_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Decode a snapshot's payloads
///
/// A missing snapshot or empty payload decodes to no current conditions and
/// no daily rows.
pub fn unpack_snapshot(
    snapshot: Option<&WeatherSnapshot>,
) -> Result<(Option<CurrentConditions>, Vec<DailyRow>)> {
    let Some(snapshot) = snapshot else {
        return Ok((None, Vec::new()));
    };

    let current = if snapshot.current_json.trim().is_empty() {
        None
    } else {
        serde_json::from_str::<Option<CurrentConditions>>(&snapshot.current_json)?
    };

    let forecast = if snapshot.forecast_json.trim().is_empty() {
        Vec::new()
    } else {
        serde_json::from_str::<Option<Vec<DailyRow>>>(&snapshot.forecast_json)?
            .unwrap_or_default()
    };

    Ok((current, forecast))
}

/// Overwrite the editable fields of a query
///
/// Returns `None` when no row has this id.
pub async fn update_query_core(
    pool: &SqlitePool,
    id: i64,
    update: &QueryUpdate,
) -> Result<Option<SearchQuery>> {
    let affected = update_row(pool, id, update).await?;

    if affected == 0 {
        return Ok(None);
    }

    get_query(pool, id).await
}

/// Record a new weather result for an existing query
pub async fn append_snapshot(
    pool: &SqlitePool,
    query_id: i64,
    current: &CurrentConditions,
    forecast: &[DailyRow],
) -> Result<WeatherSnapshot> {
    let created_at = now();
    let current_json = serde_json::to_string(current)?;
    let forecast_json = serde_json::to_string(forecast)?;

    let id = insert_snapshot(pool, query_id, &current_json, &forecast_json, &created_at).await?;

    Ok(WeatherSnapshot {
        id,
        query_id,
        current_json,
        forecast_json,
        created_at,
    })
}

/// Overwrite a query and append its new snapshot in one transaction
///
/// Returns `None` (and writes nothing) when no row has this id.
pub async fn update_query_with_snapshot(
    pool: &SqlitePool,
    id: i64,
    update: &QueryUpdate,
    current: &CurrentConditions,
    forecast: &[DailyRow],
) -> Result<Option<SearchQuery>> {
    let created_at = now();
    let current_json = serde_json::to_string(current)?;
    let forecast_json = serde_json::to_string(forecast)?;

    let mut tx = pool.begin().await?;

    if update_row(&mut *tx, id, update).await? == 0 {
        // Dropping the transaction rolls it back
        return Ok(None);
    }
    let snapshot_id =
        insert_snapshot(&mut *tx, id, &current_json, &forecast_json, &created_at).await?;

    tx.commit().await?;

    debug!(query_id = id, snapshot_id, "Updated query with new snapshot");

    get_query(pool, id).await
}

async fn update_row<'e, E>(executor: E, id: i64, update: &QueryUpdate) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let (date_start, date_end) = split_range(update.date_range);

    let affected = sqlx::query(
        r#"
        UPDATE search_queries SET
            input_text = ?,
            resolved_name = ?,
            lat = ?,
            lon = ?,
            date_start = ?,
            date_end = ?,
            label = ?
        WHERE id = ?
        "#,
    )
    .bind(&update.input_text)
    .bind(&update.resolved_name)
    .bind(update.lat)
    .bind(update.lon)
    .bind(&date_start)
    .bind(&date_end)
    .bind(&update.label)
    .bind(id)
    .execute(executor)
    .await?
    .rows_affected();

    Ok(affected)
}

async fn insert_snapshot<'e, E>(
    executor: E,
    query_id: i64,
    current_json: &str,
    forecast_json: &str,
    created_at: &DateTime<Utc>,
) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = sqlx::query(
        r#"
        INSERT INTO weather_snapshots (query_id, current_json, forecast_json, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(query_id)
    .bind(current_json)
    .bind(forecast_json)
    .bind(format_timestamp(created_at))
    .execute(executor)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Delete a query; its snapshots go with it through the foreign key
///
/// Returns `false` when no row has this id.
pub async fn delete_query_cascade(pool: &SqlitePool, id: i64) -> Result<bool> {
    let affected = sqlx::query("DELETE FROM search_queries WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

fn split_range(
    range: Option<(chrono::NaiveDate, chrono::NaiveDate)>,
) -> (Option<String>, Option<String>) {
    match range {
        Some((start, end)) => (Some(format_date(start)), Some(format_date(end))),
        None => (None, None),
    }
}

fn query_from_row(row: &SqliteRow) -> Result<SearchQuery> {
    let date_start: Option<String> = row.try_get("date_start")?;
    let date_end: Option<String> = row.try_get("date_end")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(SearchQuery {
        id: row.try_get("id")?,
        input_text: row.try_get("input_text")?,
        resolved_name: row.try_get("resolved_name")?,
        lat: row.try_get("lat")?,
        lon: row.try_get("lon")?,
        date_start: date_start.as_deref().map(parse_date).transpose()?,
        date_end: date_end.as_deref().map(parse_date).transpose()?,
        label: row.try_get("label")?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn snapshot_from_row(row: &SqliteRow) -> Result<WeatherSnapshot> {
    let created_at: String = row.try_get("created_at")?;

    Ok(WeatherSnapshot {
        id: row.try_get("id")?,
        query_id: row.try_get("query_id")?,
        current_json: row.try_get("current_json")?,
        forecast_json: row.try_get("forecast_json")?,
        created_at: parse_timestamp(&created_at)?,
    })
}
