// Tailview - core/model.rs
//
// Core data model: severity taxonomy and the websocket wire types shared by
// the client and the server. Pure data and codec logic, no I/O and no UI.

use crate::util::constants::{DEFAULT_GROUP_KEY, DEFAULT_GROUP_LABEL, STREAM_TAG_STDOUT};
use crate::util::error::ProtocolError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Severity
// =============================================================================

/// Log line severity, ordered from most to least severe.
///
/// A line is classified by the `.<LEVEL>: ` marker embedded in it — the
/// convention used by syslog-style application loggers (`app.ERROR: ...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Severity {
    /// All variants in classification priority order (most severe first).
    pub fn all() -> &'static [Severity] {
        &[
            Severity::Emergency,
            Severity::Alert,
            Severity::Critical,
            Severity::Error,
            Severity::Warning,
            Severity::Notice,
            Severity::Info,
            Severity::Debug,
        ]
    }

    /// The exact marker substring that identifies this level in a log line.
    pub fn marker(&self) -> &'static str {
        match self {
            Severity::Emergency => ".EMERGENCY: ",
            Severity::Alert => ".ALERT: ",
            Severity::Critical => ".CRITICAL: ",
            Severity::Error => ".ERROR: ",
            Severity::Warning => ".WARNING: ",
            Severity::Notice => ".NOTICE: ",
            Severity::Info => ".INFO: ",
            Severity::Debug => ".DEBUG: ",
        }
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Emergency => "Emergency",
            Severity::Alert => "Alert",
            Severity::Critical => "Critical",
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Notice => "Notice",
            Severity::Info => "Info",
            Severity::Debug => "Debug",
        }
    }

    /// Short label for compact display (badge chips).
    pub fn short_label(&self) -> &'static str {
        match self {
            Severity::Emergency => "EMERG",
            Severity::Alert => "ALERT",
            Severity::Critical => "CRIT",
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    /// CSS class suffix used in the exported HTML badge markup.
    pub fn css_class(&self) -> &'static str {
        match self {
            Severity::Emergency => "emergency",
            Severity::Alert => "alert",
            Severity::Critical => "critical",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Notice => "notice",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }

    /// Classify a log line by scanning for level markers.
    ///
    /// Levels are checked in fixed priority order (most severe first) and
    /// the first level whose marker appears anywhere in the line wins —
    /// NOT the marker that occurs earliest in the text. A line containing
    /// both `.DEBUG: ` and `.ERROR: ` therefore classifies as Error.
    pub fn classify(line: &str) -> Option<Severity> {
        Severity::all()
            .iter()
            .copied()
            .find(|sev| line.contains(sev.marker()))
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// File listing
// =============================================================================

/// A single selectable file as shipped by the server in a listing update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    /// Path on the serving host. This is the identifier echoed back in
    /// tail requests and download URLs.
    pub path: String,

    /// Display name shown in the file selector.
    pub alias: String,

    /// File size in bytes (0 when the file does not exist yet).
    pub size: u64,

    /// Last modification time, if the file exists.
    pub mtime: Option<DateTime<Utc>>,

    /// Whether the file currently exists on disk. Filespecs may point at
    /// files that have not been created yet.
    pub exists: bool,
}

/// Raw listing payload: group key to entries, as serialised on the wire.
pub type Listing = BTreeMap<String, Vec<ListEntry>>;

/// A listing group as presented in the UI, with the reserved default key
/// replaced by a readable label.
#[derive(Debug, Clone, PartialEq)]
pub struct FileGroup {
    pub label: String,
    pub files: Vec<ListEntry>,
}

/// Convert a wire listing into display groups.
pub fn listing_to_groups(listing: Listing) -> Vec<FileGroup> {
    listing
        .into_iter()
        .map(|(key, files)| {
            let label = if key == DEFAULT_GROUP_KEY {
                DEFAULT_GROUP_LABEL.to_string()
            } else {
                key
            };
            FileGroup { label, files }
        })
        .collect()
}

// =============================================================================
// Tail request
// =============================================================================

/// The message a client sends when the selected file, command, or script
/// changes. Identifies the selection plus tail parameters; replaced
/// wholesale on each user selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailRequest {
    /// Name of the command to run (must be in the server's allow list).
    pub command: String,

    /// Script argument for commands that take one (grep pattern, sed/awk
    /// program). `None` for plain tailing.
    pub script: Option<String>,

    /// The file to tail.
    pub entry: ListEntry,

    /// Number of trailing lines to seed the stream with.
    pub nlines: u64,
}

// =============================================================================
// Inbound frame decoding
// =============================================================================

/// A decoded inbound websocket frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// A file-list update (JSON object payload).
    Listing(Vec<FileGroup>),

    /// A line of pipeline stdout (`["o", text]`).
    Stdout(String),

    /// A frame with a reserved/unhandled stream tag (`"e"` and friends).
    Ignored { tag: String },
}

/// Decode one inbound frame.
///
/// A JSON object is a listing update; a two-element `[tag, text]` array is
/// a stream frame, forwarded as output only for the stdout tag. Anything
/// else is a protocol error — surfaced, never silently swallowed.
pub fn decode_frame(raw: &str) -> Result<InboundFrame, ProtocolError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|source| ProtocolError::InvalidJson { source })?;

    match value {
        serde_json::Value::Object(_) => {
            let listing: Listing = serde_json::from_value(value)
                .map_err(|source| ProtocolError::InvalidJson { source })?;
            Ok(InboundFrame::Listing(listing_to_groups(listing)))
        }
        serde_json::Value::Array(items) => {
            if items.len() != 2 {
                return Err(ProtocolError::BadStreamFrame { len: items.len() });
            }
            let mut strings = items.into_iter().map(|item| match item {
                serde_json::Value::String(s) => Ok(s),
                other => Err(ProtocolError::UnexpectedShape {
                    detail: format!("stream frame element is {other}, expected a string"),
                }),
            });
            // len() == 2 checked above, so both yields are Some.
            let tag = strings.next().unwrap_or(Err(ProtocolError::BadStreamFrame { len: 0 }))?;
            let text = strings.next().unwrap_or(Err(ProtocolError::BadStreamFrame { len: 1 }))?;

            if tag == STREAM_TAG_STDOUT {
                Ok(InboundFrame::Stdout(text))
            } else {
                Ok(InboundFrame::Ignored { tag })
            }
        }
        other => Err(ProtocolError::UnexpectedShape {
            detail: format!("top-level frame is {other}, expected object or array"),
        }),
    }
}
