//! Output formatting for recovered text.

/// Format the recovered text for display.
///
/// With `pretty`, valid JSON is re-indented and anything else is printed as
/// is. `preview` truncates to that many characters and appends `...`.
pub fn render(text: &str, pretty: bool, preview: Option<usize>) -> String {
    let body = if pretty {
        serde_json::from_str::<serde_json::Value>(text)
            .and_then(|v| serde_json::to_string_pretty(&v))
            .unwrap_or_else(|_| text.to_string())
    } else {
        text.to_string()
    };

    match preview {
        Some(max) => truncate_chars(&body, max),
        None => body,
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
