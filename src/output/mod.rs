// Output formatting: terminal display of sweeps, clusters, and keywords.

pub mod terminal;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Respects UTF-8 character boundaries, so CJK titles and URLs with
/// multi-byte characters never panic.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("洗錢防制法修正", 2), "洗錢...");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
