//! Parsing of free-text model output into lists.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*```[A-Za-z0-9_-]*\s*$").expect("Invalid regex: CODE_FENCE")
});

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*+•]+|\d{1,2}[.)])\s*").expect("Invalid regex: LIST_MARKER")
});

/// Removes markdown code-fence lines such as ```` ```json ````.
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// Strips a leading bullet or `1.` marker and surrounding quotes.
pub fn clean_item(line: &str) -> String {
    let line = LIST_MARKER.replace(line.trim(), "");
    line.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}

/// One entry per non-blank line, list markers removed.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(clean_item)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Trims, drops empties and keeps the first of any repeated entry.
pub fn dedup_preserving_order(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty() && seen.insert(item.clone()))
        .collect()
}
