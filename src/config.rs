// Tailview - config.rs
//
// Server/session configuration: embedded TOML defaults, user config files,
// command pipeline specs, and filespec parsing.
//
// A filespec selects the files offered in the UI:
//
//   [alias=name,][group=name,]<source>
//
// where <source> is a single file, a shell glob, or a directory (listed
// recursively). Globs are re-evaluated on every listing refresh.

pub use crate::util::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The configuration Tailview loads at startup when no config file is
/// given. A user-supplied file (`-c`) replaces this document wholesale.
pub const DEFAULT_CONFIG_TOML: &str = r#"
title = "Tailview file viewer"
relative-root = "/"
listen-addr = ["127.0.0.1:8080"]
allow-download = true
allow-commands = ["tail", "grep", "sed", "awk"]

[commands.tail]
action = ["tail", "-n", "$lines", "-F", "$path"]

[commands.grep]
stdin = "tail"
action = ["grep", "--text", "--line-buffered", "--color=never", "-e", "$script"]
default = ".*"

[commands.sed]
stdin = "tail"
action = ["sed", "-u", "-e", "$script"]
default = "s/.*/&/"

[commands.awk]
stdin = "tail"
action = ["awk", "--sandbox", "$script"]
default = "{print $0; fflush()}"
"#;

// =============================================================================
// Command specs
// =============================================================================

/// A command the server can execute on behalf of a client.
///
/// `action` is the argv template; `$lines`, `$path`, and `$script` are
/// replaced from the tail request. `stdin` optionally names another
/// command whose stdout feeds this one (e.g. grep reads from tail).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandSpec {
    #[serde(default)]
    pub stdin: Option<String>,

    pub action: Vec<String>,

    /// Default script argument. Commands with a script slot show a script
    /// input in the UI; `None` means the command takes no script.
    #[serde(default, rename = "default")]
    pub default_script: Option<String>,
}

// =============================================================================
// Filespecs
// =============================================================================

/// How a filespec's source resolves to files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSpecKind {
    /// A single, possibly not-yet-existing file.
    File,
    /// A shell glob, re-evaluated on each listing refresh.
    Glob,
    /// A directory, listed recursively.
    Dir,
}

/// One file/glob/directory to serve, with optional display overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSpec {
    pub path: String,
    pub kind: FileSpecKind,
    pub alias: Option<String>,
    pub group: Option<String>,
}

/// Parse a filespec string. Example inputs:
///
///   alias=1,group=2,/var/log/messages
///   /var/log/
///   /var/log/*
pub fn parse_file_spec(spec: &str) -> FileSpec {
    let mut parts: Vec<&str> = spec.split(',').collect();
    // The last comma-separated part is always the path.
    let path = parts.pop().unwrap_or_default().to_string();

    let mut alias = None;
    let mut group = None;
    for part in parts {
        if let Some(value) = part.strip_prefix("group=") {
            group = Some(value.trim_matches(|c| c == '\'' || c == '"' || c == ' ').to_string());
        } else if let Some(value) = part.strip_prefix("alias=") {
            alias = Some(value.to_string());
        }
    }

    let kind = if path.contains(['*', '?', '[', ']']) {
        FileSpecKind::Glob
    } else {
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => FileSpecKind::Dir,
            // Missing files are still valid specs: they may appear later.
            _ => FileSpecKind::File,
        }
    };

    FileSpec {
        path,
        kind,
        alias,
        group,
    }
}

// =============================================================================
// Server configuration
// =============================================================================

/// Raw TOML shape. Missing fields fall back to the built-in defaults so a
/// partial user config stays usable.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ConfigDocument {
    #[serde(default = "default_title")]
    title: String,

    #[serde(default = "default_relative_root")]
    relative_root: String,

    #[serde(default = "default_listen_addr")]
    listen_addr: Vec<String>,

    #[serde(default = "default_allow_download")]
    allow_download: bool,

    #[serde(default)]
    allow_commands: Vec<String>,

    #[serde(default)]
    commands: BTreeMap<String, CommandSpec>,

    /// Filespec strings, same syntax as the command-line arguments.
    #[serde(default)]
    files: Vec<String>,
}

fn default_title() -> String {
    "Tailview file viewer".to_string()
}

fn default_relative_root() -> String {
    "/".to_string()
}

fn default_listen_addr() -> Vec<String> {
    vec![crate::util::constants::DEFAULT_BIND_ADDR.to_string()]
}

fn default_allow_download() -> bool {
    true
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub title: String,

    /// Web root, normalised to start and end with `/`.
    pub relative_root: String,

    pub listen_addrs: Vec<String>,
    pub allow_download: bool,

    /// Command names offered in the UI, in display order.
    pub allow_commands: Vec<String>,

    pub commands: BTreeMap<String, CommandSpec>,

    /// Files to serve. Populated from the config `files` list and/or the
    /// command-line filespec arguments.
    pub file_specs: Vec<FileSpec>,
}

impl ServerConfig {
    /// The built-in default configuration.
    pub fn built_in() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_CONFIG_TOML)
    }

    /// Parse and validate a TOML configuration document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let doc: ConfigDocument =
            toml::from_str(raw).map_err(|source| ConfigError::TomlParse { source })?;

        let config = Self {
            title: doc.title,
            relative_root: normalise_relative_root(&doc.relative_root),
            listen_addrs: doc.listen_addr,
            allow_download: doc.allow_download,
            allow_commands: doc.allow_commands,
            commands: doc.commands,
            file_specs: doc.files.iter().map(|s| parse_file_spec(s)).collect(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a user configuration file, replacing the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for name in &self.allow_commands {
            if !self.commands.contains_key(name) {
                return Err(ConfigError::UnknownCommand { name: name.clone() });
            }
        }
        for (name, spec) in &self.commands {
            if spec.action.is_empty() {
                return Err(ConfigError::EmptyAction {
                    command: name.clone(),
                });
            }
            if let Some(stdin) = &spec.stdin {
                if !self.commands.contains_key(stdin) {
                    return Err(ConfigError::UnknownStdinSource {
                        command: name.clone(),
                        stdin: stdin.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Map of command name to default script, empty string for commands
    /// without a script slot. Drives the UI script input.
    pub fn command_scripts(&self) -> BTreeMap<String, String> {
        self.commands
            .iter()
            .map(|(name, spec)| {
                (
                    name.clone(),
                    spec.default_script.clone().unwrap_or_default(),
                )
            })
            .collect()
    }
}

/// Ensure the relative root is always `/` or `/name/`.
pub fn normalise_relative_root(root: &str) -> String {
    let trimmed = root.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

// =============================================================================
// UI configuration
// =============================================================================

/// Read-only configuration the GUI session works from. In embedded mode it
/// is derived from the server config; in `--connect` mode it comes from
/// local config/defaults, since the wire protocol carries no config frame.
#[derive(Debug, Clone)]
pub struct UiConfig {
    pub title: String,
    pub allow_download: bool,
    pub allow_commands: Vec<String>,
    pub command_scripts: BTreeMap<String, String>,
}

impl UiConfig {
    pub fn from_server(config: &ServerConfig) -> Self {
        Self {
            title: config.title.clone(),
            allow_download: config.allow_download,
            allow_commands: config.allow_commands.clone(),
            command_scripts: config.command_scripts(),
        }
    }
}

/// Derive the HTTP root (for download links) from a websocket URL by
/// swapping the scheme and dropping the trailing ws route segment.
///
/// `ws://host:8080/logs/ws` -> `http://host:8080/logs/`
pub fn http_root_from_ws_url(ws_url: &str) -> Option<String> {
    let (scheme, rest) = if let Some(rest) = ws_url.strip_prefix("wss://") {
        ("https://", rest)
    } else if let Some(rest) = ws_url.strip_prefix("ws://") {
        ("http://", rest)
    } else {
        return None;
    };

    let rest = rest.strip_suffix('/').unwrap_or(rest);
    let rest = rest.strip_suffix(crate::util::constants::WS_ROUTE)?;
    Some(format!("{scheme}{rest}"))
}
