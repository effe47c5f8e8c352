//! Reference spreadsheet backend for sheet-relay.
//!
//! Holds workbooks in memory, keyed by path, and executes protocol commands
//! against them using `umya-spreadsheet` for xlsx reading and writing. The
//! `sheet-relay-bridge` binary serves this engine over stdin/stdout.

mod dispatch;
pub mod engine;
pub mod error;

pub use dispatch::{execute, handle_line, handle_request};
pub use engine::Engine;
pub use error::{EngineError, Result};
