//! Helpers for keeping secrets and oversized payloads out of logs and errors.

/// Upper bound for response bodies quoted in error messages.
pub const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Truncates a response body for inclusion in an error message.
///
/// Cuts on a character boundary so multi-byte text never panics.
pub fn truncate_body(body: &str) -> String {
    truncate_chars(body, MAX_ERROR_BODY_LENGTH)
}

/// Keeps at most `max` characters, appending a marker when text was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}... (truncated)", &text[..cut]),
        None => text.to_string(),
    }
}

/// Replaces a `key=` query parameter value with `****`.
///
/// Gemini takes its API key in the URL, and reqwest errors echo the URL.
pub fn redact_api_key(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("key=") {
        let (head, tail) = rest.split_at(pos + 4);
        out.push_str(head);
        out.push_str("****");
        let end = tail
            .find(|c: char| c == '&' || c == ' ' || c == ')' || c == '"')
            .unwrap_or(tail.len());
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}

/// Shortens a headline or idea for span attributes.
pub fn short_label(text: &str) -> String {
    truncate_chars(text.trim(), 60)
}
