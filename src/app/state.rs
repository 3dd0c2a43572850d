// Tailview - app/state.rs
//
// Session state shared by the UI panels: what the backend told us, what the
// user selected, and the log buffer showing the current pipeline's output.

use crate::config::UiConfig;
use crate::core::buffer::LogBuffer;
use crate::core::model::{FileGroup, ListEntry, TailRequest};
use crate::util::constants::{DEFAULT_TAIL_LINES, DOWNLOAD_ROUTE};

pub struct SessionState {
    pub ui_config: UiConfig,

    /// Groups from the most recent listing, in display order.
    pub file_groups: Vec<FileGroup>,

    /// The currently tailed file, if any.
    pub selected: Option<ListEntry>,

    /// Active command name (must be a key of `ui_config.command_scripts`).
    pub command: String,

    /// Script text for commands that take one; empty means use the default.
    pub script: String,

    pub lines_to_tail: u64,

    pub buffer: LogBuffer,

    pub connected: bool,

    /// One-line status shown in the bottom bar.
    pub status_message: String,

    /// Set when the selection or command changed and a new tail request
    /// should be sent on the next frame.
    pub pending_tail: bool,

    /// Set when the user asked for a listing refresh.
    pub pending_refresh: bool,

    /// HTTP root derived from the websocket URL, for download links.
    /// Always ends with '/'. None when downloads are disabled.
    pub http_root: Option<String>,
}

impl SessionState {
    pub fn new(ui_config: UiConfig, http_root: Option<String>) -> Self {
        let command = ui_config
            .allow_commands
            .first()
            .cloned()
            .unwrap_or_else(|| "tail".to_string());
        Self {
            ui_config,
            file_groups: Vec::new(),
            selected: None,
            command,
            script: String::new(),
            lines_to_tail: DEFAULT_TAIL_LINES,
            buffer: LogBuffer::default(),
            connected: false,
            status_message: "Connecting...".to_string(),
            pending_tail: false,
            pending_refresh: false,
            http_root,
        }
    }

    /// Replace the file list, keeping the current selection when it still
    /// exists and falling back to the first listed file otherwise.
    pub fn apply_file_list(&mut self, groups: Vec<FileGroup>) {
        let still_listed = self.selected.as_ref().is_some_and(|selected| {
            groups
                .iter()
                .flat_map(|group| group.files.iter())
                .any(|file| file.path == selected.path)
        });
        self.file_groups = groups;

        if !still_listed {
            self.selected = self
                .file_groups
                .iter()
                .flat_map(|group| group.files.iter())
                .next()
                .cloned();
            if self.selected.is_some() {
                self.pending_tail = true;
            }
        }
    }

    pub fn select_file(&mut self, entry: ListEntry) {
        if self.selected.as_ref().map(|s| s.path.as_str()) != Some(entry.path.as_str()) {
            self.selected = Some(entry);
            self.pending_tail = true;
        }
    }

    pub fn select_command(&mut self, command: String) {
        if self.command != command {
            self.command = command;
            self.script = String::new();
            self.pending_tail = true;
        }
    }

    /// Does the active command take a script argument?
    pub fn command_takes_script(&self) -> bool {
        self.ui_config
            .command_scripts
            .get(&self.command)
            .is_some_and(|default| !default.is_empty())
    }

    /// Placeholder shown in the script box: the command's default script.
    pub fn script_placeholder(&self) -> &str {
        self.ui_config
            .command_scripts
            .get(&self.command)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Build the tail request for the current selection, or None when no
    /// file is selected.
    pub fn tail_request(&self) -> Option<TailRequest> {
        let entry = self.selected.clone()?;
        let script = if self.command_takes_script() {
            if self.script.is_empty() {
                Some(self.script_placeholder().to_string())
            } else {
                Some(self.script.clone())
            }
        } else {
            None
        };
        Some(TailRequest {
            command: self.command.clone(),
            script,
            entry,
            nlines: self.lines_to_tail,
        })
    }

    /// Download URL for the selected file, when the server allows downloads.
    pub fn download_url(&self) -> Option<String> {
        if !self.ui_config.allow_download {
            return None;
        }
        let root = self.http_root.as_deref()?;
        let entry = self.selected.as_ref()?;
        Some(format!("{root}{DOWNLOAD_ROUTE}/?path={}", entry.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn entry(path: &str) -> ListEntry {
        ListEntry {
            path: path.to_string(),
            alias: path.to_string(),
            size: 0,
            mtime: None,
            exists: true,
        }
    }

    fn state() -> SessionState {
        let mut command_scripts = BTreeMap::new();
        command_scripts.insert("tail".to_string(), String::new());
        command_scripts.insert("grep".to_string(), ".*".to_string());
        SessionState::new(
            UiConfig {
                title: "Tailview".to_string(),
                allow_download: true,
                allow_commands: vec!["tail".to_string(), "grep".to_string()],
                command_scripts,
            },
            Some("http://127.0.0.1:8080/".to_string()),
        )
    }

    #[test]
    fn first_listing_selects_the_first_file_and_queues_a_tail() {
        let mut state = state();
        state.apply_file_list(vec![FileGroup {
            label: "Ungrouped Files".to_string(),
            files: vec![entry("/var/log/a.log"), entry("/var/log/b.log")],
        }]);
        assert_eq!(state.selected.as_ref().unwrap().path, "/var/log/a.log");
        assert!(state.pending_tail);
    }

    #[test]
    fn listing_refresh_keeps_an_existing_selection() {
        let mut state = state();
        state.apply_file_list(vec![FileGroup {
            label: "Ungrouped Files".to_string(),
            files: vec![entry("/var/log/a.log"), entry("/var/log/b.log")],
        }]);
        state.pending_tail = false;
        state.select_file(entry("/var/log/b.log"));
        state.pending_tail = false;

        state.apply_file_list(vec![FileGroup {
            label: "Ungrouped Files".to_string(),
            files: vec![entry("/var/log/a.log"), entry("/var/log/b.log")],
        }]);
        assert_eq!(state.selected.as_ref().unwrap().path, "/var/log/b.log");
        assert!(!state.pending_tail);
    }

    #[test]
    fn changing_command_resets_the_script() {
        let mut state = state();
        state.script = "ERROR".to_string();
        state.select_command("grep".to_string());
        assert!(state.script.is_empty());
        assert!(state.pending_tail);
        assert!(state.command_takes_script());
        assert_eq!(state.script_placeholder(), ".*");
    }

    #[test]
    fn tail_request_falls_back_to_the_default_script() {
        let mut state = state();
        state.selected = Some(entry("/var/log/a.log"));
        state.select_command("grep".to_string());
        let request = state.tail_request().unwrap();
        assert_eq!(request.script.as_deref(), Some(".*"));

        state.script = "WARN".to_string();
        let request = state.tail_request().unwrap();
        assert_eq!(request.script.as_deref(), Some("WARN"));
    }

    #[test]
    fn tail_request_omits_the_script_for_plain_tail() {
        let mut state = state();
        state.selected = Some(entry("/var/log/a.log"));
        let request = state.tail_request().unwrap();
        assert_eq!(request.command, "tail");
        assert!(request.script.is_none());
    }

    #[test]
    fn download_url_uses_the_files_route() {
        let mut state = state();
        state.selected = Some(entry("/var/log/a.log"));
        assert_eq!(
            state.download_url().as_deref(),
            Some("http://127.0.0.1:8080/files/?path=/var/log/a.log")
        );

        state.ui_config.allow_download = false;
        assert!(state.download_url().is_none());
    }
}
