// Tailview - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing and merging into the configuration
// 2. Logging initialisation (debug mode support)
// 3. Mode selection: serve + view (default), --headless, --connect
// 4. eframe GUI launch

mod gui;

// Re-export modules from the library crate so that `gui.rs` can use
// `crate::app::...`, `crate::core::...` etc.
pub use tailview::app;
pub use tailview::config;
pub use tailview::core;
pub use tailview::server;
pub use tailview::ui;
pub use tailview::util;

use clap::Parser;
use config::{ConfigError, ServerConfig, UiConfig};
use std::path::PathBuf;
use std::sync::Arc;
use util::constants::{APP_NAME, APP_VERSION, DEFAULT_BIND_ADDR, DEFAULT_TAIL_LINES, WS_ROUTE};

/// Tailview - live log viewer for files, pipes, and command output.
///
/// Serves the named files over a websocket and opens a viewer on them.
/// Each FILESPEC is "[alias=name,][group=name,]path" where path may be a
/// file, a glob, or a directory.
#[derive(Parser, Debug)]
#[command(name = "tailview", version, about)]
struct Cli {
    /// Files to serve.
    #[arg(value_name = "FILESPEC")]
    filespecs: Vec<String>,

    /// Listen on this address (host:port); repeatable.
    #[arg(short = 'b', long = "bind")]
    bind: Vec<String>,

    /// Configuration file (TOML).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Serve the application under this URL path.
    #[arg(short = 'r', long = "relative-root")]
    relative_root: Option<String>,

    /// Disable downloading of the served files.
    #[arg(long = "no-download")]
    no_download: bool,

    /// Serve only; do not open the viewer window.
    #[arg(long = "headless", conflicts_with = "connect")]
    headless: bool,

    /// Attach the viewer to a running server instead of serving locally.
    #[arg(long = "connect", value_name = "WS_URL", conflicts_with = "bind")]
    connect: Option<String>,

    /// Initial number of lines to tail.
    #[arg(short = 'n', long = "lines", default_value_t = DEFAULT_TAIL_LINES)]
    lines: u64,

    /// Print the built-in configuration and exit.
    #[arg(long = "print-config")]
    print_config: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

/// Load the configuration and fold the CLI overrides into it.
fn resolve_config(cli: &Cli) -> Result<ServerConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::built_in()?,
    };

    config
        .file_specs
        .extend(cli.filespecs.iter().map(|s| config::parse_file_spec(s)));
    if !cli.bind.is_empty() {
        config.listen_addrs = cli.bind.clone();
    }
    if let Some(root) = &cli.relative_root {
        config.relative_root = config::normalise_relative_root(root);
    }
    if cli.no_download {
        config.allow_download = false;
    }

    if config.file_specs.is_empty() {
        return Err(ConfigError::NoFiles);
    }
    Ok(config)
}

fn main() {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", config::DEFAULT_CONFIG_TOML);
        return;
    }

    util::logging::init(cli.debug);
    tracing::info!(version = APP_VERSION, debug = cli.debug, "Tailview starting");

    // Viewer-only mode: no server, no file specs needed.
    if let Some(ws_url) = cli.connect.clone() {
        let ui_config = match &cli.config {
            Some(path) => match ServerConfig::load(path) {
                Ok(config) => UiConfig::from_server(&config),
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            },
            None => match ServerConfig::built_in() {
                Ok(config) => UiConfig::from_server(&config),
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            },
        };
        let http_root = config::http_root_from_ws_url(&ws_url);
        launch_gui(ui_config, ws_url, http_root, cli.lines);
        return;
    }

    let config = match resolve_config(&cli) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if cli.headless {
        run_headless(config);
        return;
    }

    // Embedded mode: server on a background thread, viewer on this one.
    let (addr_tx, addr_rx) = std::sync::mpsc::channel();
    let server_config = Arc::clone(&config);
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::error!(error = %e, "Cannot build server runtime");
                let _ = addr_tx.send(None);
                return;
            }
        };
        runtime.block_on(async move {
            let state = server::ServerState::new(Arc::clone(&server_config));
            let addr = server_config
                .listen_addrs
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
            match server::bind(&addr).await {
                Ok(listener) => {
                    let _ = addr_tx.send(listener.local_addr().ok());
                    if let Err(e) = server::run(listener, state).await {
                        tracing::error!(error = %e, "Server stopped");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Cannot bind listen address");
                    let _ = addr_tx.send(None);
                }
            }
        });
    });

    let Some(addr) = addr_rx.recv().ok().flatten() else {
        eprintln!("Error: cannot start the local server (see log for details)");
        std::process::exit(1);
    };

    let root = config.relative_root.clone();
    let ws_url = format!("ws://{addr}{root}{WS_ROUTE}");
    let http_root = format!("http://{addr}{root}");
    launch_gui(
        UiConfig::from_server(&config),
        ws_url,
        Some(http_root),
        cli.lines,
    );
}

/// Serve on every configured address until killed.
fn run_headless(config: Arc<ServerConfig>) {
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: cannot build server runtime: {e}");
            std::process::exit(1);
        }
    };
    let result = runtime.block_on(async move {
        let state = server::ServerState::new(Arc::clone(&config));
        let mut listeners = Vec::new();
        for addr in &config.listen_addrs {
            listeners.push(server::bind(addr).await?);
        }
        let servers = listeners
            .into_iter()
            .map(|listener| server::run(listener, state.clone()));
        futures_util::future::try_join_all(servers).await.map(|_| ())
    });
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn launch_gui(ui_config: UiConfig, ws_url: String, http_root: Option<String>, lines: u64) {
    tracing::info!(url = %ws_url, "Launching viewer");

    let title = ui_config.title.clone();
    let mut state = app::SessionState::new(ui_config, http_root);
    state.lines_to_tail = lines;
    let conn = app::ConnectionManager::connect(ws_url);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("{title} - {APP_NAME} v{APP_VERSION}"))
            .with_inner_size([1100.0, 700.0])
            .with_min_inner_size([700.0, 400.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(move |_cc| Ok(Box::new(gui::TailviewApp::new(state, conn)))),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch the viewer: {e}");
        std::process::exit(1);
    }
}
