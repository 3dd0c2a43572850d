// Tailview - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all Tailview operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum TailviewError {
    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// The HTTP/websocket server failed to start or run.
    Serve(ServeError),

    /// A command pipeline could not be built or spawned.
    Pipeline(PipelineError),

    /// An inbound websocket payload did not match the wire protocol.
    Protocol(ProtocolError),

    /// Export of the rendered buffer failed.
    Export(ExportError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for TailviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Serve(e) => write!(f, "Server error: {e}"),
            Self::Pipeline(e) => write!(f, "Pipeline error: {e}"),
            Self::Protocol(e) => write!(f, "Protocol error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for TailviewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Serve(e) => Some(e),
            Self::Pipeline(e) => Some(e),
            Self::Protocol(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for TailviewError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ServeError> for TailviewError {
    fn from(e: ServeError) -> Self {
        Self::Serve(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating the TOML configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    TomlParse { source: toml::de::Error },

    /// The config file could not be read.
    Read { path: PathBuf, source: io::Error },

    /// `allow-commands` names a command with no `[commands.<name>]` table.
    UnknownCommand { name: String },

    /// A command's `stdin` field references an undefined command.
    UnknownStdinSource { command: String, stdin: String },

    /// A command has an empty `action` list and can never be spawned.
    EmptyAction { command: String },

    /// No filespecs were given on the command line or in the config file.
    NoFiles,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { source } => write!(f, "invalid TOML: {source}"),
            Self::Read { path, source } => {
                write!(f, "cannot read '{}': {source}", path.display())
            }
            Self::UnknownCommand { name } => {
                write!(f, "allow-commands entry '{name}' has no [commands.{name}] table")
            }
            Self::UnknownStdinSource { command, stdin } => write!(
                f,
                "command '{command}' uses stdin source '{stdin}', which is not defined"
            ),
            Self::EmptyAction { command } => {
                write!(f, "command '{command}' has an empty action list")
            }
            Self::NoFiles => write!(f, "no files specified on command-line or in config file"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source } => Some(source),
            Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Server errors
// ---------------------------------------------------------------------------

/// Errors raised while starting or running the streaming server.
#[derive(Debug)]
pub enum ServeError {
    /// Binding the listen address failed.
    Bind { addr: String, source: io::Error },

    /// The accept loop terminated with an I/O error.
    Accept { source: io::Error },
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { addr, source } => write!(f, "cannot bind '{addr}': {source}"),
            Self::Accept { source } => write!(f, "accept loop failed: {source}"),
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind { source, .. } => Some(source),
            Self::Accept { source } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline errors
// ---------------------------------------------------------------------------

/// Errors raised while building or spawning a command pipeline.
#[derive(Debug)]
pub enum PipelineError {
    /// The requested command name has no spec in the configuration.
    UnknownCommand { name: String },

    /// Spawning a child process failed.
    Spawn { program: String, source: io::Error },

    /// A child's stdio handle was missing despite being requested piped.
    MissingStdio {
        program: String,
        stream: &'static str,
    },

    /// Wiring one child's stdout into the next child's stdin failed.
    StdinWire { program: String, source: io::Error },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand { name } => write!(f, "unknown command '{name}'"),
            Self::Spawn { program, source } => {
                write!(f, "cannot spawn '{program}': {source}")
            }
            Self::MissingStdio { program, stream } => {
                write!(f, "'{program}' has no piped {stream} handle")
            }
            Self::StdinWire { program, source } => {
                write!(f, "cannot wire stdin for '{program}': {source}")
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } | Self::StdinWire { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

/// Errors raised while decoding an inbound websocket frame.
///
/// These are recoverable: the connection stays up and prior client state is
/// left intact. The UI surfaces them in the status bar.
#[derive(Debug)]
pub enum ProtocolError {
    /// The frame was not valid JSON.
    InvalidJson { source: serde_json::Error },

    /// The frame was valid JSON but not a listing map or a stream pair.
    UnexpectedShape { detail: String },

    /// A stream frame did not have exactly two string elements.
    BadStreamFrame { len: usize },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson { source } => write!(f, "malformed JSON frame: {source}"),
            Self::UnexpectedShape { detail } => {
                write!(f, "unexpected frame shape: {detail}")
            }
            Self::BadStreamFrame { len } => {
                write!(f, "stream frame must be [tag, text], got {len} element(s)")
            }
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidJson { source } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors raised while writing the rendered buffer to disk.
#[derive(Debug)]
pub enum ExportError {
    /// Writing the output failed.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot write '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}
