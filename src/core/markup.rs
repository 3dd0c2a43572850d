// Tailview - core/markup.rs
//
// Escaping and badge annotation for stored log lines.
//
// Every appended line is stored in an HTML-safe markup form: entities are
// escaped before storage so the rendered-log export can never smuggle
// active content, and classified lines get a severity badge span inserted
// right at their `.<LEVEL>: ` marker.

use crate::core::model::Severity;

/// Escape the HTML-sensitive characters `& < > /` to entities.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '/' => escaped.push_str("&#x2F;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Badge markup for a severity level.
pub fn badge_markup(severity: Severity) -> String {
    format!(
        "<span class=\"badge badge-level-{}\">{}</span>",
        severity.css_class(),
        severity.label()
    )
}

/// Insert a severity badge at the line's level marker.
///
/// `.ERROR: disk full` becomes `.ERROR <badge>: disk full`, mirroring how
/// the marker text itself is kept visible next to the badge. Only the
/// first occurrence of the marker is annotated. Lines without a marker
/// are returned unchanged.
pub fn annotate_line(escaped: &str, severity: Option<Severity>) -> String {
    let Some(severity) = severity else {
        return escaped.to_string();
    };
    let marker = severity.marker();
    let annotated_marker = format!(
        ".{} {}: ",
        severity.label().to_uppercase(),
        badge_markup(severity)
    );
    escaped.replacen(marker, &annotated_marker, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html_sensitive_characters() {
        assert_eq!(escape_markup("<script>"), "&lt;script&gt;");
        assert_eq!(escape_markup("a&b"), "a&amp;b");
        assert_eq!(escape_markup("/var/log"), "&#x2F;var&#x2F;log");
        assert_eq!(escape_markup("plain"), "plain");
    }

    #[test]
    fn annotates_classified_lines_with_a_badge() {
        let line = "2024 app.ERROR: disk full";
        let annotated = annotate_line(line, Severity::classify(line));
        assert!(annotated.contains("badge-level-error"));
        assert!(annotated.contains(".ERROR <span"));
        assert!(annotated.ends_with(": disk full"));
    }

    #[test]
    fn unclassified_lines_are_unchanged() {
        assert_eq!(annotate_line("no marker here", None), "no marker here");
    }

    #[test]
    fn only_first_marker_occurrence_is_annotated() {
        let line = "a.ERROR: one b.ERROR: two";
        let annotated = annotate_line(line, Some(Severity::Error));
        assert_eq!(annotated.matches("badge-level-error").count(), 1);
        assert!(annotated.contains("b.ERROR: two"));
    }
}
