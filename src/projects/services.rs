use crate::storage;

/// Normalize the technologies field: a JSON array string or a comma-separated
/// list both become the same trimmed `Vec<String>`.
pub fn parse_technologies(raw: &str) -> Vec<String> {
    let items: Vec<String> = match serde_json::from_str::<Vec<String>>(raw) {
        Ok(list) => list,
        Err(_) => raw.split(',').map(|p| p.to_string()).collect(),
    };
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// A screenshot column holds either an external URL or a local storage key.
pub fn is_external(screenshot: &str) -> bool {
    screenshot.starts_with("http://") || screenshot.starts_with("https://")
}

/// External URLs pass through untouched; local keys map to `/uploads/{key}`.
pub fn screenshot_url(screenshot: &str) -> String {
    if is_external(screenshot) {
        screenshot.to_string()
    } else {
        storage::public_url(screenshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_array() {
        assert_eq!(
            parse_technologies(r#"["Rust", "PostgreSQL"]"#),
            vec!["Rust", "PostgreSQL"]
        );
    }

    #[test]
    fn parses_csv_fallback() {
        assert_eq!(
            parse_technologies("Rust, PostgreSQL ,, axum"),
            vec!["Rust", "PostgreSQL", "axum"]
        );
    }

    #[test]
    fn empty_input_gives_empty_list() {
        assert!(parse_technologies("").is_empty());
        assert!(parse_technologies("[]").is_empty());
    }

    #[test]
    fn screenshot_url_distinguishes_external_and_local() {
        assert_eq!(
            screenshot_url("https://example.com/shot.png"),
            "https://example.com/shot.png"
        );
        assert_eq!(
            screenshot_url("projects/project-abc.png"),
            "/uploads/projects/project-abc.png"
        );
        assert!(is_external("http://x.com/a.png"));
        assert!(!is_external("projects/project-abc.png"));
    }
}
