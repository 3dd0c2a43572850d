// Tailview - ui/panels/toolbar.rs
//
// Top toolbar: file selection, command selection, script input, line count,
// history limit, wrap toggle, and the clear / refresh / download / save
// controls.
//
// Selection changes only raise the `pending_tail` / `pending_refresh` flags
// on the session state; the top-level update loop turns them into requests
// once per frame so a frame with several changes sends a single request.

use crate::app::state::SessionState;
use crate::core::export;
use crate::core::model::ListEntry;
use crate::util::constants::{MAX_HISTORY_LINES, MAX_TAIL_LINES};
use crate::util::fmt::format_bytes;

/// Render the toolbar row.
pub fn render(ui: &mut egui::Ui, state: &mut SessionState) {
    ui.horizontal_wrapped(|ui| {
        file_selector(ui, state);
        command_selector(ui, state);
        script_input(ui, state);

        ui.label("Lines:");
        let mut nlines = state.lines_to_tail;
        if ui
            .add(egui::DragValue::new(&mut nlines).range(1..=MAX_TAIL_LINES))
            .changed()
        {
            state.lines_to_tail = nlines;
            state.pending_tail = true;
        }

        ui.separator();

        ui.label("History:");
        let mut capacity = state.buffer.capacity();
        if ui
            .add(egui::DragValue::new(&mut capacity).range(0..=MAX_HISTORY_LINES))
            .on_hover_text("Maximum lines kept in view; 0 keeps everything")
            .changed()
        {
            state.buffer.set_capacity(capacity);
        }

        let mut wrap = state.buffer.wrap();
        if ui.checkbox(&mut wrap, "Wrap").changed() {
            state.buffer.set_wrap(wrap);
        }

        ui.separator();

        if ui.button("Clear").clicked() {
            state.buffer.clear();
        }
        if ui
            .button("Refresh")
            .on_hover_text("Re-read the file list from the server")
            .clicked()
        {
            state.pending_refresh = true;
        }

        download_link_button(ui, state);
        save_menu(ui, state);
    });
}

// =============================================================================
// Individual controls
// =============================================================================

fn file_selector(ui: &mut egui::Ui, state: &mut SessionState) {
    let selected_label = state
        .selected
        .as_ref()
        .map(entry_label)
        .unwrap_or_else(|| "(no files)".to_string());

    let mut clicked: Option<ListEntry> = None;
    egui::ComboBox::from_id_salt("file-selector")
        .width(280.0)
        .selected_text(selected_label)
        .show_ui(ui, |ui| {
            for group in &state.file_groups {
                ui.label(egui::RichText::new(&group.label).small().weak());
                for file in &group.files {
                    let is_selected =
                        state.selected.as_ref().map(|s| s.path.as_str()) == Some(file.path.as_str());
                    if ui
                        .selectable_label(is_selected, entry_label(file))
                        .clicked()
                    {
                        clicked = Some(file.clone());
                    }
                }
            }
        });
    if let Some(entry) = clicked {
        state.select_file(entry);
    }
}

fn entry_label(entry: &ListEntry) -> String {
    if entry.exists {
        format!("{} ({})", entry.alias, format_bytes(entry.size))
    } else {
        format!("{} (missing)", entry.alias)
    }
}

fn command_selector(ui: &mut egui::Ui, state: &mut SessionState) {
    let mut clicked: Option<String> = None;
    egui::ComboBox::from_id_salt("command-selector")
        .selected_text(state.command.clone())
        .show_ui(ui, |ui| {
            for command in &state.ui_config.allow_commands {
                if ui
                    .selectable_label(state.command == *command, command)
                    .clicked()
                {
                    clicked = Some(command.clone());
                }
            }
        });
    if let Some(command) = clicked {
        state.select_command(command);
    }
}

fn script_input(ui: &mut egui::Ui, state: &mut SessionState) {
    let takes_script = state.command_takes_script();
    let hint = state.script_placeholder().to_string();
    let response = ui.add_enabled(
        takes_script,
        egui::TextEdit::singleline(&mut state.script)
            .hint_text(hint)
            .desired_width(160.0),
    );
    // The script applies on Enter, not per keystroke; restarting the
    // pipeline on every character would drop the accumulated output.
    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
        state.pending_tail = true;
    }
}

fn download_link_button(ui: &mut egui::Ui, state: &mut SessionState) {
    let url = state.download_url();
    if ui
        .add_enabled(url.is_some(), egui::Button::new("Copy link"))
        .on_hover_text("Copy the download URL of the selected file")
        .on_disabled_hover_text("Downloads are disabled on this server")
        .clicked()
    {
        if let Some(url) = url {
            ui.ctx().copy_text(url);
            state.status_message = "Download link copied.".to_string();
        }
    }
}

fn save_menu(ui: &mut egui::Ui, state: &mut SessionState) {
    ui.add_enabled_ui(!state.buffer.is_empty(), |ui| {
        ui.menu_button("Save", |ui| {
            if ui.button("Save as HTML...").clicked() {
                if let Some(dest) = rfd::FileDialog::new()
                    .add_filter("HTML", &["html"])
                    .set_file_name("tailview.html")
                    .save_file()
                {
                    let title = state
                        .selected
                        .as_ref()
                        .map(|s| s.alias.clone())
                        .unwrap_or_else(|| state.ui_config.title.clone());
                    match std::fs::File::create(&dest) {
                        Ok(file) => {
                            match export::export_html(&state.buffer, file, &title, &dest) {
                                Ok(n) => {
                                    state.status_message = format!("Saved {n} lines to HTML.");
                                }
                                Err(e) => {
                                    state.status_message = format!("HTML export failed: {e}");
                                }
                            }
                        }
                        Err(e) => {
                            state.status_message = format!("Cannot create file: {e}");
                        }
                    }
                }
                ui.close_menu();
            }
            if ui.button("Save as text...").clicked() {
                if let Some(dest) = rfd::FileDialog::new()
                    .add_filter("Text", &["log", "txt"])
                    .set_file_name("tailview.log")
                    .save_file()
                {
                    match std::fs::File::create(&dest) {
                        Ok(file) => match export::export_text(&state.buffer, file, &dest) {
                            Ok(n) => {
                                state.status_message = format!("Saved {n} lines.");
                            }
                            Err(e) => {
                                state.status_message = format!("Text export failed: {e}");
                            }
                        },
                        Err(e) => {
                            state.status_message = format!("Cannot create file: {e}");
                        }
                    }
                }
                ui.close_menu();
            }
        });
    });
}
