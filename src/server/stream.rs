// Tailview - server/stream.rs
//
// Command pipelines: spawn the (optionally chained) processes behind a
// tail request and stream their output to the session as wire frames.
//
// A pipeline is at most two processes: an optional stdin source (e.g.
// `tail -n 10 -F file`) feeding the requested command (e.g. `grep -e
// pattern`). Stdout lines become `["o", line]` frames, stderr lines
// `["e", line]`. A new request or session shutdown kills the previous
// pipeline before the next one starts.

use crate::config::{CommandSpec, ServerConfig};
use crate::core::model::TailRequest;
use crate::util::constants::{STREAM_TAG_STDERR, STREAM_TAG_STDOUT};
use crate::util::error::PipelineError;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Expand the `$lines`, `$path`, and `$script` placeholders in an action
/// template with the values from a tail request.
///
///   ["tail", "-n", "$lines", "-F", "$path"] -> ["tail", "-n", "10", "-F", "f1.txt"]
pub fn expand_action(action: &[String], request: &TailRequest) -> Vec<String> {
    action
        .iter()
        .map(|arg| match arg.as_str() {
            "$lines" => request.nlines.to_string(),
            "$path" => request.entry.path.clone(),
            "$script" => request.script.clone().unwrap_or_default(),
            _ => arg.clone(),
        })
        .collect()
}

/// A running pipeline: its child processes plus the reader tasks that pump
/// output frames into the session channel.
pub struct Pipeline {
    children: Vec<Child>,
    readers: Vec<JoinHandle<()>>,
}

impl Pipeline {
    /// Spawn the pipeline for a tail request.
    ///
    /// `frame_tx` receives encoded wire frames; the receiving side forwards
    /// them to the websocket.
    pub fn spawn(
        config: &ServerConfig,
        request: &TailRequest,
        frame_tx: UnboundedSender<String>,
    ) -> Result<Self, PipelineError> {
        let spec = config
            .commands
            .get(&request.command)
            .ok_or_else(|| PipelineError::UnknownCommand {
                name: request.command.clone(),
            })?;

        let mut children = Vec::new();

        // Optional stdin source: its stdout is wired into the main command.
        let source_stdout = match &spec.stdin {
            Some(source_name) => {
                let source_spec = config.commands.get(source_name).ok_or_else(|| {
                    PipelineError::UnknownCommand {
                        name: source_name.clone(),
                    }
                })?;
                let action = expand_action(&source_spec.action, request);
                tracing::info!(command = ?action, "Running stdin source");

                // Source stderr is inherited, not piped: nothing reads it,
                // and a full pipe buffer would stall the stream.
                let mut child = spawn_child(&action, Stdio::null(), Stdio::piped(), Stdio::inherit())?;
                let stdout = child.stdout.take().ok_or(PipelineError::MissingStdio {
                    program: action[0].clone(),
                    stream: "stdout",
                })?;
                children.push(child);
                Some((stdout, action[0].clone()))
            }
            None => None,
        };

        let action = expand_action(&spec.action, request);
        tracing::info!(command = ?action, "Running command");

        let stdin = match source_stdout {
            Some((stdout, program)) => stdout
                .try_into()
                .map_err(|source| PipelineError::StdinWire { program, source })?,
            None => Stdio::null(),
        };
        let mut main = spawn_child(&action, stdin, Stdio::piped(), Stdio::piped())?;

        let stdout = main.stdout.take().ok_or(PipelineError::MissingStdio {
            program: action[0].clone(),
            stream: "stdout",
        })?;
        let stderr = main.stderr.take().ok_or(PipelineError::MissingStdio {
            program: action[0].clone(),
            stream: "stderr",
        })?;
        children.push(main);

        let readers = vec![
            spawn_reader(stdout, STREAM_TAG_STDOUT, frame_tx.clone()),
            spawn_reader(stderr, STREAM_TAG_STDERR, frame_tx),
        ];

        Ok(Self { children, readers })
    }

    /// Kill every process in the pipeline and reap it.
    pub async fn shutdown(mut self) {
        for reader in &self.readers {
            reader.abort();
        }
        for child in &mut self.children {
            if let Some(pid) = child.id() {
                tracing::info!(pid, "Stopping pipeline process");
            }
            if let Err(e) = child.start_kill() {
                tracing::warn!(error = %e, "Failed to kill pipeline process");
            }
            let _ = child.wait().await;
        }
    }
}

fn spawn_child(
    action: &[String],
    stdin: Stdio,
    stdout: Stdio,
    stderr: Stdio,
) -> Result<Child, PipelineError> {
    Command::new(&action[0])
        .args(&action[1..])
        .stdin(stdin)
        .stdout(stdout)
        .stderr(stderr)
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| PipelineError::Spawn {
            program: action[0].clone(),
            source,
        })
}

/// Pump one output stream line-by-line into the session channel.
fn spawn_reader<R>(stream: R, tag: &'static str, frame_tx: UnboundedSender<String>) -> JoinHandle<()>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let frame = match serde_json::to_string(&(tag, line.as_str())) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to encode stream frame");
                            continue;
                        }
                    };
                    if frame_tx.send(frame).is_err() {
                        // Session gone.
                        return;
                    }
                }
                Ok(None) => return,
                Err(e) => {
                    tracing::debug!(tag, error = %e, "Stream reader finished with error");
                    return;
                }
            }
        }
    })
}
