//! sheet-relay bridge: a backend process that owns workbook state and is
//! controlled by JSON commands over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! - Reads `Request` objects from stdin
//! - Writes `Response` objects to stdout
//! - Diagnostic/log messages go to stderr (never stdout)

use std::io::{self, BufRead, Write};

use sheet_relay_bridge::{handle_line, Engine};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    tracing::info!("Starting up");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!("stdin read error: {e}");
                break;
            }
        };

        let Some(response) = handle_line(&mut engine, &line) else {
            continue;
        };

        let json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("failed to encode response #{}: {e}", response.id);
                continue;
            }
        };
        if writeln!(out, "{json}").and_then(|_| out.flush()).is_err() {
            tracing::error!("stdout closed, exiting");
            break;
        }
    }

    tracing::info!("stdin closed, exiting with {} workbook(s) open", engine.list_xlsx().len());
}
