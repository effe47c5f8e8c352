//! Subprocess management and JSON IPC for a backend process.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use serde_json::Value;
use sheet_relay_protocol::{Request, Response};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

use super::Transport;
use crate::error::{Result, SheetsError};

/// Environment variable that overrides the backend executable location.
pub const BRIDGE_ENV: &str = "SHEET_RELAY_BRIDGE";

const BRIDGE_EXE: &str = "sheet-relay-bridge";

/// Configuration for spawning the backend process.
#[derive(Debug, Clone, Default)]
pub struct ProcessTransportConfig {
    /// Path to the backend executable.
    /// If None, uses `$SHEET_RELAY_BRIDGE` or searches common locations.
    pub program: Option<PathBuf>,

    /// Extra arguments passed to the backend.
    pub args: Vec<OsString>,

    /// Extra environment variables set for the backend.
    pub envs: Vec<(OsString, OsString)>,
}

impl ProcessTransportConfig {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

struct Pipes {
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Transport that talks newline-delimited JSON to a child process.
///
/// Round trips are serialized over the single pipe pair: concurrent callers
/// queue on an async lock, so each request is answered before the next one
/// is written. The child is killed if the transport is dropped without
/// [`shutdown`](Self::shutdown).
pub struct ProcessTransport {
    child: StdMutex<Child>,
    pipes: Mutex<Pipes>,
    next_id: AtomicU64,
}

impl ProcessTransport {
    /// Start the backend process. Must be called from within a tokio runtime.
    pub fn spawn(config: ProcessTransportConfig) -> Result<Self> {
        let program = match config.program {
            Some(path) => path,
            None => find_bridge_exe(),
        };

        if program.components().count() > 1 && !program.exists() {
            return Err(SheetsError::BridgeExeNotFound(program.display().to_string()));
        }

        let mut cmd = Command::new(&program);
        cmd.args(&config.args);
        cmd.envs(config.envs);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::inherit()); // backend diagnostics go to our stderr
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SheetsError::BridgeExeNotFound(program.display().to_string())
            } else {
                SheetsError::SpawnFailed(e)
            }
        })?;

        let stdin = child.stdin.take().ok_or(SheetsError::NotRunning)?;
        let stdout = child.stdout.take().ok_or(SheetsError::NotRunning)?;

        tracing::info!("Started backend process: {}", program.display());

        Ok(Self {
            child: StdMutex::new(child),
            pipes: Mutex::new(Pipes {
                stdin,
                stdout: BufReader::new(stdout),
            }),
            next_id: AtomicU64::new(1),
        })
    }

    /// OS process id of the backend, while it is running.
    pub fn id(&self) -> Option<u32> {
        self.child
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .id()
    }

    /// Close the backend's stdin and wait for it to exit.
    pub async fn shutdown(self) -> Result<()> {
        let Pipes { stdin, stdout } = self.pipes.into_inner();
        drop(stdin);
        drop(stdout);

        let mut child = self
            .child
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let status = child.wait().await.map_err(SheetsError::SpawnFailed)?;
        tracing::info!("Backend process exited: {status}");
        Ok(())
    }

    async fn round_trip(&self, request: &Request) -> Result<Response> {
        let json = serde_json::to_string(request)?;

        let mut pipes = self.pipes.lock().await;

        pipes
            .stdin
            .write_all(json.as_bytes())
            .await
            .map_err(|e| SheetsError::SendFailed(e.to_string()))?;
        pipes
            .stdin
            .write_all(b"\n")
            .await
            .map_err(|e| SheetsError::SendFailed(e.to_string()))?;
        pipes
            .stdin
            .flush()
            .await
            .map_err(|e| SheetsError::SendFailed(e.to_string()))?;

        // Replies to abandoned calls may still be queued ahead of ours.
        let mut line = String::new();
        loop {
            line.clear();
            let read = pipes
                .stdout
                .read_line(&mut line)
                .await
                .map_err(|e| SheetsError::ReadFailed(e.to_string()))?;
            if read == 0 {
                return Err(SheetsError::NotRunning);
            }

            let response: Response = serde_json::from_str(line.trim_end())?;
            if response.id == request.id {
                return Ok(response);
            }
            if response.id > request.id {
                return Err(SheetsError::MismatchedResponse {
                    expected: request.id,
                    got: response.id,
                });
            }
            tracing::debug!("Discarding stale response #{}", response.id);
        }
    }
}

#[async_trait]
impl Transport for ProcessTransport {
    async fn invoke(&self, operation: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = Request::new(id, operation, params);

        let response = self.round_trip(&request).await?;
        tracing::trace!("{operation} #{id} -> {:?}", response.result);

        response.result.into_result().map_err(SheetsError::Remote)
    }
}

/// Attempt to locate the backend executable.
///
/// Checks `$SHEET_RELAY_BRIDGE`, then next to the current executable, then the
/// cargo target directory, and finally falls back to a `PATH` lookup.
fn find_bridge_exe() -> PathBuf {
    if let Some(path) = std::env::var_os(BRIDGE_ENV) {
        return PathBuf::from(path);
    }

    let file_name = format!("{BRIDGE_EXE}{}", std::env::consts::EXE_SUFFIX);

    if let Ok(mut exe) = std::env::current_exe() {
        exe.pop();
        let candidate = exe.join(&file_name);
        if candidate.exists() {
            return candidate;
        }
        // Test binaries live one level down, in target/<profile>/deps.
        if exe.ends_with("deps") {
            exe.pop();
            let candidate = exe.join(&file_name);
            if candidate.exists() {
                return candidate;
            }
        }
    }

    for profile in ["release", "debug"] {
        let candidate = PathBuf::from("target").join(profile).join(&file_name);
        if candidate.exists() {
            return candidate;
        }
    }

    PathBuf::from(file_name)
}
