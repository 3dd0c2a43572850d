// Tailview - ui/panels/logview.rs
//
// The log view: every buffered line in arrival order, severity markers
// coloured, the current (most recent) entry tinted.
//
// Auto-scroll contract: the buffer records whether the view sat within the
// sticky threshold of the bottom when a line was appended; when it did, the
// buffer raises a one-shot scroll request that this panel consumes after
// laying out the rows. The scroll geometry observed this frame is written
// back so the next append sees up-to-date positions.

use crate::app::state::SessionState;
use crate::core::buffer::{LogEntry, ScrollState};
use crate::ui::theme;
use egui::text::{LayoutJob, TextFormat};

pub fn render(ui: &mut egui::Ui, state: &mut SessionState) {
    let wrap = state.buffer.wrap();
    let follow = state.buffer.take_scroll_request();
    let row_height = theme::LOG_FONT_SIZE + 4.0;

    let scroll_area = if wrap {
        egui::ScrollArea::vertical()
    } else {
        egui::ScrollArea::both()
    };

    let output = scroll_area.auto_shrink([false; 2]).show(ui, |ui| {
        ui.style_mut().spacing.item_spacing.y = 0.0;
        let max_width = if wrap {
            ui.available_width()
        } else {
            f32::INFINITY
        };
        for entry in state.buffer.iter() {
            if entry.current {
                let tint = egui::Rect::from_min_size(
                    ui.cursor().min,
                    egui::vec2(ui.available_width().max(max_width), row_height),
                );
                ui.painter().rect_filled(tint, 0.0, theme::CURRENT_ROW_BG);
            }
            ui.label(row_job(entry, max_width));
        }
        if follow {
            ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
        }
    });

    state.buffer.update_scroll(ScrollState {
        offset: output.state.offset.y,
        viewport: output.inner_rect.height(),
        content: output.content_size.y,
    });
}

/// Lay out one line, colouring the severity marker and leaving the rest in
/// the body colour.
fn row_job(entry: &LogEntry, max_width: f32) -> LayoutJob {
    let font = egui::FontId::monospace(theme::LOG_FONT_SIZE);
    let body = TextFormat {
        font_id: font.clone(),
        color: theme::ROW_TEXT,
        ..Default::default()
    };

    let mut job = LayoutJob::default();
    job.wrap.max_width = max_width;

    match entry.severity {
        Some(severity) => {
            let marker = severity.marker();
            match entry.raw.find(marker) {
                Some(at) => {
                    job.append(&entry.raw[..at], 0.0, body.clone());
                    job.append(
                        marker,
                        0.0,
                        TextFormat {
                            font_id: font,
                            color: theme::severity_colour(severity),
                            ..Default::default()
                        },
                    );
                    job.append(&entry.raw[at + marker.len()..], 0.0, body);
                }
                None => job.append(&entry.raw, 0.0, body),
            }
        }
        None => job.append(&entry.raw, 0.0, body),
    }
    job
}
