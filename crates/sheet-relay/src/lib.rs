//! Async client binding for a spreadsheet backend running in another process.
//!
//! Every operation on a [`Spreadsheet`] handle is forwarded, one call at a
//! time, to a backend that owns the real workbook state and file I/O. The
//! binding keeps no copy of spreadsheet content: a handle is just a file path
//! and a sheet name, and the backend decides success or failure.
//!
//! # Architecture
//!
//! ```text
//! Your Rust code
//!     └── Spreadsheet / SheetsClient (this crate)
//!           └── dyn Transport
//!                 └── ProcessTransport: spawns sheet-relay-bridge, JSON over stdio
//! ```
//!
//! The [`Transport`] trait is the only seam: swap in [`MockTransport`] to
//! record calls, or implement it over any other channel.
//!
//! # Example
//!
//! ```rust,no_run
//! use sheet_relay::{ProcessTransportConfig, SheetsClient};
//!
//! # async fn example() -> sheet_relay::Result<()> {
//! let client = SheetsClient::spawn(ProcessTransportConfig::default())?;
//!
//! let mut sheet = client.spreadsheet("/tmp/report.xlsx", "Sheet1");
//! sheet.create().await?;
//! sheet.new_sheet("Data").await?;
//! sheet.sheet_name = "Data".to_string();
//! sheet.set_value([1, 1], "hello").await?;
//! assert_eq!(sheet.get_value([1, 1]).await?, "hello");
//! sheet.write().await?;
//!
//! client.close_all().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod column;
pub mod error;
mod spreadsheet;
pub mod transport;

pub use client::SheetsClient;
pub use column::ColumnRef;
pub use error::{Result, SheetsError};
pub use sheet_relay_protocol::{column_label, Coordinate, SheetRange, Table};
pub use spreadsheet::Spreadsheet;
pub use transport::{MockTransport, ProcessTransport, ProcessTransportConfig, Transport};
