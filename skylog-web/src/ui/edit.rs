//! Edit form for a saved lookup

use super::{error_banner, escape, layout, EditFields};

/// GET /edit (and any update error)
pub fn render(fields: &EditFields, error: Option<&str>) -> String {
    let content = format!(
        r#"
        <h1>Edit lookup #{id}</h1>
        {error}
        <form class="card" method="post" action="/update">
            <input type="hidden" name="id" value="{id}">

            <label for="input_text">Location</label>
            <input id="input_text" name="input_text" type="text" required value="{input_text}">

            <label for="label">Label <small>(optional)</small></label>
            <input id="label" name="label" type="text" value="{label}">

            <div class="range">
                <div>
                    <label for="start">Start date</label>
                    <input id="start" name="start" type="date" value="{start}">
                </div>
                <div>
                    <label for="end">End date</label>
                    <input id="end" name="end" type="date" value="{end}">
                </div>
            </div>

            <div class="actions">
                <button type="submit">Save and refresh weather</button>
                <a class="button secondary" href="/result?id={id}">Cancel</a>
            </div>
        </form>
        <p class="muted">Saving re-resolves the location and stores a new weather snapshot. Clear both dates to return to the 5-day forecast.</p>
"#,
        id = fields.id,
        error = error_banner(error),
        input_text = escape(&fields.input_text),
        label = escape(&fields.label),
        start = escape(&fields.start),
        end = escape(&fields.end),
    );

    layout("Edit", &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prefills_fields() {
        let fields = EditFields {
            id: 12,
            input_text: "Tokyo".to_string(),
            label: "Home & away".to_string(),
            start: String::new(),
            end: String::new(),
        };

        let html = render(&fields, None);
        assert!(html.contains("Edit lookup #12"));
        assert!(html.contains(r#"name="id" value="12""#));
        assert!(html.contains(r#"value="Tokyo""#));
        assert!(html.contains(r#"value="Home &amp; away""#));
    }

    #[test]
    fn test_render_shows_error() {
        let html = render(&EditFields::default(), Some("Weather lookup failed. Please try again."));
        assert!(html.contains("Weather lookup failed. Please try again."));
    }
}
