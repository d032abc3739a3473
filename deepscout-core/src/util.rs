//! Small formatting helpers shared by the adapter and its embedders.

/// Truncate a topic for logging and progress messages.
///
/// Cuts on a character boundary and appends an ellipsis when anything was
/// dropped.
pub fn topic_preview(topic: &str, max_chars: usize) -> String {
    let mut chars = topic.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{preview}...")
    } else {
        preview
    }
}

/// Format elapsed seconds in a human-readable form: `12.3s`, `2m 5.0s`,
/// `1h 4m 12.0s`.
pub fn format_elapsed(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.1}s")
    } else if seconds < 3600.0 {
        let minutes = (seconds / 60.0).floor() as u64;
        format!("{}m {:.1}s", minutes, seconds % 60.0)
    } else {
        let hours = (seconds / 3600.0).floor() as u64;
        let rest = seconds % 3600.0;
        let minutes = (rest / 60.0).floor() as u64;
        format!("{}h {}m {:.1}s", hours, minutes, rest % 60.0)
    }
}

/// Round to two decimal places, for the `execution_time` metadata field.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_topic_preview_short_topic_unchanged() {
        assert_eq!(topic_preview("quantum computing", 100), "quantum computing");
    }

    #[test]
    fn test_topic_preview_truncates_with_ellipsis() {
        let long = "a".repeat(150);
        let preview = topic_preview(&long, 100);
        assert_eq!(preview.len(), 103);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_topic_preview_exact_length_not_truncated() {
        let exact = "b".repeat(100);
        assert_eq!(topic_preview(&exact, 100), exact);
    }

    #[test]
    fn test_topic_preview_multibyte_boundary() {
        let topic = "é".repeat(120);
        let preview = topic_preview(&topic, 100);
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_format_elapsed_seconds() {
        assert_eq!(format_elapsed(12.34), "12.3s");
    }

    #[test]
    fn test_format_elapsed_minutes() {
        assert_eq!(format_elapsed(125.0), "2m 5.0s");
    }

    #[test]
    fn test_format_elapsed_hours() {
        assert_eq!(format_elapsed(3852.0), "1h 4m 12.0s");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.2345), 1.23);
        assert_eq!(round2(1.235), 1.24);
        assert_eq!(round2(0.0), 0.0);
    }
}
