// Tailview - gui.rs
//
// Top-level eframe::App implementation.
// Wires together the toolbar and log view and drives the connection
// manager: events in, tail / listing requests out.

use crate::app::state::SessionState;
use crate::app::{ClientEvent, ConnectionManager};
use crate::ui;
use crate::util::constants::{MAX_CLIENT_EVENTS_PER_FRAME, STREAM_REPAINT_INTERVAL_MS};

/// The Tailview application.
pub struct TailviewApp {
    pub state: SessionState,
    pub conn: ConnectionManager,
}

impl TailviewApp {
    pub fn new(state: SessionState, conn: ConnectionManager) -> Self {
        Self { state, conn }
    }

    fn apply_events(&mut self) -> bool {
        let events = self.conn.poll_events(MAX_CLIENT_EVENTS_PER_FRAME);
        let had_events = !events.is_empty();
        for event in events {
            match event {
                ClientEvent::Connected => {
                    self.state.connected = true;
                    self.state.status_message = "Connected.".to_string();
                }
                ClientEvent::Disconnected => {
                    self.state.connected = false;
                    self.state.status_message = "Connection lost, retrying...".to_string();
                }
                ClientEvent::FileList(groups) => {
                    self.state.apply_file_list(groups);
                }
                ClientEvent::Line(line) => {
                    self.state.buffer.append(&line);
                }
                ClientEvent::ProtocolError(detail) => {
                    self.state.status_message = format!("Protocol error: {detail}");
                }
            }
        }
        had_events
    }

    fn flush_requests(&mut self) {
        if !self.state.connected {
            return;
        }
        if self.state.pending_refresh {
            self.state.pending_refresh = false;
            self.conn.request_listing();
        }
        if self.state.pending_tail {
            self.state.pending_tail = false;
            if let Some(request) = self.state.tail_request() {
                // Start from a clean view so the buffer only ever shows the
                // current selection's output.
                self.state.buffer.clear();
                self.state.status_message = format!("Tailing {}", request.entry.alias);
                self.conn.request_tail(request);
            }
        }
    }
}

impl eframe::App for TailviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let had_events = self.apply_events();
        self.flush_requests();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.heading(&self.state.ui_config.title);
            ui.add_space(4.0);
            ui::panels::toolbar::render(ui, &mut self.state);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    if self.state.connected {
                        ui.label(
                            egui::RichText::new(" \u{25cf} LIVE ")
                                .strong()
                                .color(egui::Color32::from_rgb(34, 197, 94)), // Green 500
                        );
                    } else {
                        ui.label(
                            egui::RichText::new(" \u{25cf} OFFLINE ")
                                .strong()
                                .color(ui::theme::STATUS_DISCONNECTED),
                        );
                    }
                    ui.separator();
                    ui.label(
                        egui::RichText::new(&self.state.status_message)
                            .color(ui::theme::STATUS_TEXT),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if !self.state.buffer.is_empty() {
                            ui.label(format!("{} lines", self.state.buffer.len()));
                        }
                    });
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui::panels::logview::render(ui, &mut self.state);
        });

        if !self.state.connected {
            egui::Area::new(egui::Id::new("disconnected_overlay"))
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(
                            egui::RichText::new("Waiting for the server...")
                                .heading()
                                .color(ui::theme::STATUS_DISCONNECTED),
                        );
                        ui.label("Reconnecting automatically.");
                    });
                });
        }

        // Stream output arrives between frames; keep polling while live,
        // back off while reconnecting.
        if had_events {
            ctx.request_repaint();
        } else if self.state.connected {
            ctx.request_repaint_after(std::time::Duration::from_millis(
                STREAM_REPAINT_INTERVAL_MS,
            ));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_secs(1));
        }
    }
}
