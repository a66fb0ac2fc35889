//! JSON and CSV downloads
//!
//! With `?id=N` one lookup is exported (JSON adds its latest snapshot);
//! without it, the newest lookups up to the export limit.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use skylog_common::db::{
    get_latest_snapshot, get_query, list_queries, unpack_snapshot, CurrentConditions, DailyRow,
    SearchQuery,
};
use skylog_common::time::{format_date, format_timestamp};
use thiserror::Error;
use tracing::error;

use crate::error::messages;
use crate::AppState;

/// Column order of the CSV export
pub const CSV_HEADER: &str = "id,input_text,resolved_name,lat,lon,date_start,date_end,label,created_at";

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub id: Option<i64>,
}

/// Download format, which decides how errors are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Export failures
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Record not found")]
    NotFound(ExportFormat),

    #[error("Export failed: {1}")]
    Failed(ExportFormat, skylog_common::Error),
}

impl IntoResponse for ExportError {
    fn into_response(self) -> Response {
        let (status, format, message) = match self {
            ExportError::NotFound(format) => (StatusCode::NOT_FOUND, format, messages::NOT_FOUND),
            ExportError::Failed(format, err) => {
                error!("Export failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, format, messages::INTERNAL)
            }
        };

        match format {
            ExportFormat::Json => (status, Json(json!({ "error": message }))).into_response(),
            ExportFormat::Csv => (
                status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                message,
            )
                .into_response(),
        }
    }
}

/// Single-lookup JSON document
#[derive(Debug, Serialize)]
pub struct QueryExport {
    pub query: SearchQuery,
    pub snapshot: SnapshotExport,
}

#[derive(Debug, Serialize)]
pub struct SnapshotExport {
    pub current: Option<CurrentConditions>,
    pub forecast: Vec<DailyRow>,
}

/// GET /export/json
pub async fn export_json(
    State(state): State<AppState>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, ExportError> {
    let fail = |e: skylog_common::Error| ExportError::Failed(ExportFormat::Json, e);

    match params.id {
        Some(id) => {
            let query = get_query(&state.db, id)
                .await
                .map_err(fail)?
                .ok_or(ExportError::NotFound(ExportFormat::Json))?;
            let snapshot = get_latest_snapshot(&state.db, id).await.map_err(fail)?;
            let (current, forecast) = unpack_snapshot(snapshot.as_ref()).map_err(fail)?;

            let body = QueryExport {
                query,
                snapshot: SnapshotExport { current, forecast },
            };
            Ok(attachment(&format!("weather_{}.json", id), Json(body)))
        }
        None => {
            let rows = list_queries(&state.db, state.limits.export_limit)
                .await
                .map_err(fail)?;
            Ok(attachment("weather_queries.json", Json(rows)))
        }
    }
}

/// GET /export/csv
pub async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, ExportError> {
    let fail = |e: skylog_common::Error| ExportError::Failed(ExportFormat::Csv, e);

    let (rows, filename) = match params.id {
        Some(id) => {
            let query = get_query(&state.db, id)
                .await
                .map_err(fail)?
                .ok_or(ExportError::NotFound(ExportFormat::Csv))?;
            (vec![query], format!("weather_{}.csv", id))
        }
        None => (
            list_queries(&state.db, state.limits.export_limit)
                .await
                .map_err(fail)?,
            "weather_queries.csv".to_string(),
        ),
    };

    let body = (
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        render_csv(&rows),
    );
    Ok(attachment(&filename, body))
}

fn attachment(filename: &str, body: impl IntoResponse) -> Response {
    (
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )],
        body,
    )
        .into_response()
}

/// Header plus one CRLF-terminated line per row
pub fn render_csv(rows: &[SearchQuery]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 2 + rows.len() * 96);
    out.push_str(CSV_HEADER);
    out.push_str("\r\n");

    for row in rows {
        let fields = [
            row.id.to_string(),
            csv_field(&row.input_text),
            csv_field(&row.resolved_name),
            row.lat.to_string(),
            row.lon.to_string(),
            row.date_start.map(format_date).unwrap_or_default(),
            row.date_end.map(format_date).unwrap_or_default(),
            csv_field(row.label.as_deref().unwrap_or("")),
            format_timestamp(&row.created_at),
        ];
        out.push_str(&fields.join(","));
        out.push_str("\r\n");
    }

    out
}

/// Quote a field containing a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn row(id: i64, input: &str, label: Option<&str>) -> SearchQuery {
        SearchQuery {
            id,
            input_text: input.to_string(),
            resolved_name: "Seattle, Washington, United States".to_string(),
            lat: 47.6062,
            lon: -122.3321,
            date_start: None,
            date_end: None,
            label: label.map(str::to_string),
            created_at: Utc.with_ymd_and_hms(2025, 9, 30, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_render_csv_rows() {
        let mut ranged = row(2, "Seattle", Some("Work"));
        ranged.date_start = NaiveDate::from_ymd_opt(2025, 9, 1);
        ranged.date_end = NaiveDate::from_ymd_opt(2025, 9, 3);

        let csv = render_csv(&[row(1, "Seattle", None), ranged]);
        let lines: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "1,Seattle,\"Seattle, Washington, United States\",47.6062,-122.3321,,,,2025-09-30T12:00:00.000000Z"
        );
        assert!(lines[2].contains(",2025-09-01,2025-09-03,Work,"));
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_render_csv_empty_is_header_only() {
        assert_eq!(render_csv(&[]), format!("{}\r\n", CSV_HEADER));
    }
}
