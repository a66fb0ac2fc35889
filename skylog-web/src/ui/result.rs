//! Weather result page

use chrono::{DateTime, NaiveDate, Utc};
use skylog_common::db::{CurrentConditions, DailyRow};

use super::{date_range_text, escape, layout, number, timestamp};

/// Everything shown on the result page
#[derive(Debug, Clone, Default)]
pub struct ResultView {
    /// Stored query id; `None` for a live lookup that was not saved
    pub id: Option<i64>,
    /// Text the user searched for
    pub query: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub label: Option<String>,
    pub current: Option<CurrentConditions>,
    /// Daily rows: the range when `is_range`, else the 5-day outlook
    pub rows: Vec<DailyRow>,
    pub is_range: bool,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub snapshot_count: Option<i64>,
    pub snapshot_at: Option<DateTime<Utc>>,
}

/// GET /result
pub fn render(view: &ResultView) -> String {
    let title = view.label.as_deref().unwrap_or(&view.name);

    let mut content = format!(
        r#"
        <h1>{name}</h1>
        <p class="muted">{label}Searched for <strong>{query}</strong> · {lat:.4}, {lon:.4}</p>
"#,
        name = escape(&view.name),
        label = view
            .label
            .as_deref()
            .map(|l| format!(r#"<span class="tag">{}</span> "#, escape(l)))
            .unwrap_or_default(),
        query = escape(if view.query.is_empty() { "—" } else { view.query.as_str() }),
        lat = view.lat,
        lon = view.lon,
    );

    content.push_str(&current_section(view.current.as_ref()));

    let heading = if view.is_range {
        match view.date_range {
            Some((start, end)) => format!("Daily values {}", escape(&date_range_text(Some(start), Some(end)))),
            None => "Daily values".to_string(),
        }
    } else {
        "5-day forecast".to_string()
    };
    content.push_str(&daily_section(&heading, &view.rows));

    content.push_str(&actions(view));

    layout(title, &content)
}

fn current_section(current: Option<&CurrentConditions>) -> String {
    let Some(c) = current else {
        return r#"
        <section class="card">
            <h2>Current conditions</h2>
            <p class="muted">Current conditions are unavailable.</p>
        </section>
"#
        .to_string();
    };

    format!(
        r#"
        <section class="card">
            <h2>Current conditions</h2>
            <p class="conditions">{desc}</p>
            <dl class="current">
                <dt>Temperature</dt><dd>{t_c} °C / {t_f} °F</dd>
                <dt>Feels like</dt><dd>{a_c} °C / {a_f} °F</dd>
                <dt>Wind</dt><dd>{w_kmh} km/h / {w_mph} mph</dd>
                <dt>Precipitation</dt><dd>{p_mm} mm / {p_in} in</dd>
            </dl>
        </section>
"#,
        desc = escape(&c.weather_desc),
        t_c = number(c.temperature_c, 1),
        t_f = number(c.temperature_f, 1),
        a_c = number(c.apparent_c, 1),
        a_f = number(c.apparent_f, 1),
        w_kmh = number(c.wind_speed_kmh, 1),
        w_mph = number(c.wind_speed_mph, 1),
        p_mm = number(c.precipitation_mm, 1),
        p_in = number(c.precipitation_in, 2),
    )
}

fn daily_section(heading: &str, rows: &[DailyRow]) -> String {
    if rows.is_empty() {
        return format!(
            r#"
        <section class="card">
            <h2>{heading}</h2>
            <p class="muted">No daily data available.</p>
        </section>
"#
        );
    }

    let body: String = rows
        .iter()
        .map(|row| {
            format!(
                r#"
                <tr>
                    <td>{date}</td>
                    <td>{desc}</td>
                    <td>{max_c} / {max_f}</td>
                    <td>{min_c} / {min_f}</td>
                    <td>{p_mm} / {p_in}</td>
                </tr>"#,
                date = escape(&row.date),
                desc = escape(&row.weather_desc),
                max_c = number(row.tmax_c, 1),
                max_f = number(row.tmax_f, 1),
                min_c = number(row.tmin_c, 1),
                min_f = number(row.tmin_f, 1),
                p_mm = number(row.precip_mm, 1),
                p_in = number(row.precip_in, 2),
            )
        })
        .collect();

    format!(
        r#"
        <section class="card">
            <h2>{heading}</h2>
            <table>
                <thead>
                    <tr>
                        <th>Date</th><th>Conditions</th>
                        <th>High °C / °F</th><th>Low °C / °F</th><th>Precip mm / in</th>
                    </tr>
                </thead>
                <tbody>{body}
                </tbody>
            </table>
        </section>
"#
    )
}

fn actions(view: &ResultView) -> String {
    let Some(id) = view.id else {
        return r#"
        <p class="muted">This lookup was not saved. <a href="/">Search again</a> to keep it in your history.</p>
"#
        .to_string();
    };

    let snapshots = match (view.snapshot_count, view.snapshot_at) {
        (Some(count), Some(at)) => format!(
            r#"<p class="muted">Snapshot from {} · {} stored for this lookup</p>"#,
            timestamp(&at),
            if count == 1 { "1 snapshot".to_string() } else { format!("{} snapshots", count) },
        ),
        _ => String::new(),
    };

    format!(
        r#"
        {snapshots}
        <div class="actions">
            <a class="button" href="/edit?id={id}">Edit</a>
            <a class="button secondary" href="/export/json?id={id}">Export JSON</a>
            <a class="button secondary" href="/export/csv?id={id}">Export CSV</a>
            <form method="post" action="/delete" class="inline">
                <input type="hidden" name="id" value="{id}">
                <button type="submit" class="danger">Delete</button>
            </form>
        </div>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str) -> DailyRow {
        DailyRow {
            date: date.to_string(),
            tmax_c: Some(21.0),
            tmax_f: Some(69.8),
            weather_desc: "Clear sky".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_stored_forecast() {
        let view = ResultView {
            id: Some(7),
            query: "Seattle".to_string(),
            name: "Seattle, Washington, United States".to_string(),
            lat: 47.6062,
            lon: -122.3321,
            current: Some(CurrentConditions {
                temperature_c: Some(12.0),
                temperature_f: Some(53.6),
                weather_desc: "Overcast".to_string(),
                ..Default::default()
            }),
            rows: vec![row("2025-10-01"), row("2025-10-02")],
            snapshot_count: Some(2),
            snapshot_at: Some(Utc::now()),
            ..Default::default()
        };

        let html = render(&view);
        assert!(html.contains("5-day forecast"));
        assert!(html.contains("2025-10-02"));
        assert!(html.contains("12.0 °C / 53.6 °F"));
        assert!(html.contains("— km/h"));
        assert!(html.contains("2 snapshots"));
        assert!(html.contains(r#"href="/edit?id=7""#));
    }

    #[test]
    fn test_render_live_range_without_data() {
        let view = ResultView {
            name: "My location".to_string(),
            is_range: true,
            date_range: Some((
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
            )),
            ..Default::default()
        };

        let html = render(&view);
        assert!(html.contains("Daily values 2025-01-01 → 2025-01-03"));
        assert!(html.contains("No daily data available."));
        assert!(html.contains("Current conditions are unavailable."));
        assert!(html.contains("was not saved"));
    }

    #[test]
    fn test_label_becomes_title() {
        let view = ResultView {
            id: Some(1),
            name: "Paris, Île-de-France, France".to_string(),
            label: Some("Trip <2025>".to_string()),
            ..Default::default()
        };

        let html = render(&view);
        assert!(html.contains("<title>Trip &lt;2025&gt; · SkyLog</title>"));
        assert!(html.contains(r#"<span class="tag">Trip &lt;2025&gt;</span>"#));
    }
}
