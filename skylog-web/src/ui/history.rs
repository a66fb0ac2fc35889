//! Saved lookups table

use skylog_common::db::SearchQuery;

use super::{date_range_text, escape, layout, timestamp};

/// GET /history
pub fn render(rows: &[SearchQuery]) -> String {
    if rows.is_empty() {
        return layout(
            "History",
            r#"
        <h1>History</h1>
        <p class="muted">No saved lookups yet. <a href="/">Search for a location</a> to start.</p>
"#,
        );
    }

    let body: String = rows
        .iter()
        .map(|row| {
            format!(
                r#"
                <tr>
                    <td><a href="/result?id={id}">{id}</a></td>
                    <td>{created}</td>
                    <td>{input}</td>
                    <td>{name}<br><small class="muted">{lat:.4}, {lon:.4}</small></td>
                    <td>{range}</td>
                    <td>{label}</td>
                    <td class="row-actions">
                        <a href="/result?id={id}">View</a>
                        <a href="/edit?id={id}">Edit</a>
                        <a href="/export/json?id={id}">JSON</a>
                        <a href="/export/csv?id={id}">CSV</a>
                        <form method="post" action="/delete" class="inline">
                            <input type="hidden" name="id" value="{id}">
                            <button type="submit" class="link danger">Delete</button>
                        </form>
                    </td>
                </tr>"#,
                id = row.id,
                created = timestamp(&row.created_at),
                input = escape(&row.input_text),
                name = escape(&row.resolved_name),
                lat = row.lat,
                lon = row.lon,
                range = escape(&date_range_text(row.date_start, row.date_end)),
                label = escape(row.label.as_deref().unwrap_or("")),
            )
        })
        .collect();

    let content = format!(
        r#"
        <h1>History</h1>
        <table>
            <thead>
                <tr>
                    <th>#</th><th>Saved</th><th>Searched for</th><th>Location</th>
                    <th>Dates</th><th>Label</th><th></th>
                </tr>
            </thead>
            <tbody>{body}
            </tbody>
        </table>
"#
    );

    layout("History", &content)
}
