use crate::pipeline::text;

/// Parses the content selector's answer into distinct, non-empty ideas.
///
/// A JSON array of strings is tried first (non-string items are dropped).
/// Anything else is read one idea per line. Model output is never
/// evaluated.
pub fn parse_selected_ideas(raw: &str) -> Vec<String> {
    let cleaned = text::strip_code_fences(raw);
    if cleaned.is_empty() {
        return Vec::new();
    }

    let items = match serde_json::from_str::<Vec<serde_json::Value>>(&cleaned) {
        Ok(values) => values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Err(_) => text::parse_lines(&cleaned),
    };

    text::dedup_preserving_order(items)
}

/// Splits the scrape result into raw ideas, one per line.
pub fn parse_scraped_ideas(raw: &str) -> Vec<String> {
    text::dedup_preserving_order(text::parse_lines(&text::strip_code_fences(raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullets_are_stripped_and_deduplicated() {
        assert_eq!(parse_selected_ideas("- A\n- B\n- B"), vec!["A", "B"]);
    }

    #[test]
    fn test_json_array() {
        assert_eq!(
            parse_selected_ideas(r#"["Agents in Rust", "Vector DBs"]"#),
            vec!["Agents in Rust", "Vector DBs"]
        );
    }

    #[test]
    fn test_fenced_json_array() {
        let raw = "```json\n[\"One\", \"Two\", \"One\"]\n```";
        assert_eq!(parse_selected_ideas(raw), vec!["One", "Two"]);
    }

    #[test]
    fn test_non_string_items_dropped() {
        assert_eq!(
            parse_selected_ideas(r#"["Keep", 3, null, "  ", {"x": 1}]"#),
            vec!["Keep"]
        );
    }

    #[test]
    fn test_python_style_list_falls_back_to_lines() {
        // Single quotes are not JSON; the whole line becomes one idea.
        let ideas = parse_selected_ideas("['A', 'B']");
        assert_eq!(ideas.len(), 1);
        assert!(!ideas[0].is_empty());
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(parse_selected_ideas("").is_empty());
        assert!(parse_selected_ideas("   \n\n").is_empty());
        assert!(parse_selected_ideas("```\n```").is_empty());
        assert!(parse_selected_ideas("[]").is_empty());
    }

    #[test]
    fn test_code_is_never_evaluated() {
        let raw = "__import__('os').system('rm -rf /')";
        assert_eq!(parse_selected_ideas(raw), vec![raw]);
    }

    #[test]
    fn test_parse_scraped_ideas() {
        assert_eq!(
            parse_scraped_ideas("Title A\nTitle B\n\nTitle A"),
            vec!["Title A", "Title B"]
        );
    }
}
