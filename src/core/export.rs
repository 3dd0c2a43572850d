// Tailview - core/export.rs
//
// Save the rendered buffer to disk: a standalone HTML document built from
// the stored markup form, or the raw lines as plain text.
// Writes to any Write trait object.

use crate::core::buffer::LogBuffer;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

const HTML_STYLE: &str = "\
    body { background: #111827; color: #d1d5db; }\n\
    .log-view { font-family: monospace; white-space: pre; }\n\
    .log-view-wrapped { white-space: pre-wrap; }\n\
    .log-entry { display: block; }\n\
    .log-entry-current { background: #1f2937; }\n\
    .badge { padding: 0 4px; border-radius: 3px; color: #f9fafb; }\n\
    .badge-level-emergency, .badge-level-alert, .badge-level-critical,\n\
    .badge-level-error { background: #b91c1c; }\n\
    .badge-level-warning { background: #d97706; }\n\
    .badge-level-notice, .badge-level-info { background: #2563eb; }\n\
    .badge-level-debug { background: #6b7280; }\n";

/// Write the buffer as a standalone HTML document.
///
/// Entry markup was escaped at append time, so lines go out verbatim.
/// Returns the number of entries written.
pub fn export_html<W: Write>(
    buffer: &LogBuffer,
    mut writer: W,
    title: &str,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let io_err = |source| ExportError::Io {
        path: export_path.to_path_buf(),
        source,
    };

    let view_class = if buffer.wrap() {
        "log-view log-view-wrapped"
    } else {
        "log-view"
    };

    writeln!(writer, "<!DOCTYPE html>").map_err(io_err)?;
    writeln!(writer, "<html><head><meta charset=\"utf-8\">").map_err(io_err)?;
    writeln!(
        writer,
        "<title>{}</title>",
        crate::core::markup::escape_markup(title)
    )
    .map_err(io_err)?;
    writeln!(writer, "<style>\n{HTML_STYLE}</style></head><body>").map_err(io_err)?;
    writeln!(writer, "<div class=\"{view_class}\">").map_err(io_err)?;

    let mut count = 0;
    for entry in buffer.iter() {
        let class = if entry.current {
            "log-entry log-entry-current"
        } else {
            "log-entry"
        };
        writeln!(writer, "<span class=\"{class}\">{}</span>", entry.markup).map_err(io_err)?;
        count += 1;
    }

    writeln!(writer, "</div></body></html>").map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    Ok(count)
}

/// Write the buffer's raw lines as plain text.
pub fn export_text<W: Write>(
    buffer: &LogBuffer,
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut count = 0;
    for entry in buffer.iter() {
        writeln!(writer, "{}", entry.raw).map_err(|source| ExportError::Io {
            path: export_path.to_path_buf(),
            source,
        })?;
        count += 1;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: export_path.to_path_buf(),
        source,
    })?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn filled_buffer() -> LogBuffer {
        let mut buffer = LogBuffer::new(10);
        buffer.append("plain line\n");
        buffer.append("app.WARNING: low disk\n");
        buffer.append("<script>\n");
        buffer
    }

    #[test]
    fn html_export_writes_markup_and_counts_entries() {
        let buffer = filled_buffer();
        let mut out = Vec::new();
        let count =
            export_html(&buffer, &mut out, "test log", &PathBuf::from("out.html")).unwrap();
        assert_eq!(count, 3);

        let html = String::from_utf8(out).unwrap();
        assert!(html.contains("badge-level-warning"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        // Only the newest entry carries the current class.
        assert_eq!(
            html.matches("class=\"log-entry log-entry-current\"").count(),
            1
        );
    }

    #[test]
    fn text_export_writes_raw_lines() {
        let buffer = filled_buffer();
        let mut out = Vec::new();
        let count = export_text(&buffer, &mut out, &PathBuf::from("out.txt")).unwrap();
        assert_eq!(count, 3);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("plain line\n"));
        assert!(text.contains("<script>\n"));
    }
}
