//! Common display utilities and helpers

/// Truncate string to max length with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Placeholder for empty optional values
pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("https://a.test", 40), "https://a.test");
        assert_eq!(truncate_string("https://example.com/a/b", 12), "https://e...");
        assert_eq!(truncate_string("ünïcödé-target", 8), "ünïcö...");
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(None), "--");
        assert_eq!(or_dash(Some("")), "--");
        assert_eq!(or_dash(Some("x")), "x");
    }
}
