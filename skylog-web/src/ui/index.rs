//! Search form page

use super::{error_banner, escape, layout, SearchFields};

/// GET / (and any search error)
pub fn render(fields: &SearchFields, error: Option<&str>) -> String {
    let content = format!(
        r#"
        <h1>Weather lookup</h1>
        {error}
        <form class="card" method="post" action="/search">
            <label for="q">Location</label>
            <input id="q" name="q" type="text" required
                   placeholder="City, ZIP, landmark or lat,lon" value="{q}">

            <div class="range">
                <div>
                    <label for="start">Start date <small>(optional)</small></label>
                    <input id="start" name="start" type="date" value="{start}">
                </div>
                <div>
                    <label for="end">End date <small>(optional)</small></label>
                    <input id="end" name="end" type="date" value="{end}">
                </div>
            </div>

            <div class="actions">
                <button type="submit">Search</button>
                <button type="button" id="use-location" class="secondary">Use my location</button>
                <span id="geo-status" class="muted" aria-live="polite"></span>
            </div>
        </form>
        <p class="muted">
            Without dates you get current conditions and a 5-day forecast.
            With dates you get daily values for that range (past days from the archive).
        </p>
        <script src="/static/geolocate.js"></script>
"#,
        error = error_banner(error),
        q = escape(&fields.q),
        start = escape(&fields.start),
        end = escape(&fields.end),
    );

    layout("Search", &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_keeps_submitted_values() {
        let fields = SearchFields {
            q: "Paris \"FR\"".to_string(),
            start: "2025-01-01".to_string(),
            end: "2025-01-05".to_string(),
        };
        let html = render(&fields, Some("Start date must be on or before end date."));

        assert!(html.contains(r#"value="Paris &quot;FR&quot;""#));
        assert!(html.contains(r#"value="2025-01-01""#));
        assert!(html.contains("Start date must be on or before end date."));
        assert!(html.contains(r#"id="use-location""#));
    }

    #[test]
    fn test_render_without_error_has_no_banner() {
        let html = render(&SearchFields::default(), None);
        assert!(!html.contains("role=\"alert\""));
    }
}
