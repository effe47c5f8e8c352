//! sheet-relay CLI - drive a spreadsheet backend from the shell

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sheet_relay::{column_label, ColumnRef, ProcessTransportConfig, SheetsClient, Spreadsheet};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheet-relay")]
#[command(author, version, about = "Read and edit xlsx files through a sheet-relay backend")]
struct Cli {
    /// Backend executable (default: $SHEET_RELAY_BRIDGE or a sheet-relay-bridge
    /// next to this binary)
    #[arg(long, global = true)]
    bridge: Option<PathBuf>,

    /// Sheet to operate on
    #[arg(short, long, global = true, default_value = "Sheet1")]
    sheet: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new, empty xlsx file
    New {
        file: String,

        /// Extra sheets to add after the default one
        #[arg(long = "add-sheet")]
        add_sheets: Vec<String>,
    },

    /// Print the value of one cell
    Get {
        file: String,
        /// Column index (1-based) or letter label
        #[arg(value_parser = str::parse::<ColumnRef>)]
        column: ColumnRef,
        /// Row index (1-based)
        row: u32,
    },

    /// Set the value of one cell
    Set {
        file: String,
        #[arg(value_parser = str::parse::<ColumnRef>)]
        column: ColumnRef,
        row: u32,
        value: String,
    },

    /// Show the highest populated column and row
    Range { file: String },

    /// Print every populated row
    Dump {
        file: String,

        /// Field delimiter
        #[arg(short, long, default_value = "\t")]
        delimiter: String,
    },

    /// Append one row of values after the last populated row
    AppendRow {
        file: String,
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Remove rows, shifting later rows up
    RemoveRow {
        file: String,
        row: u32,
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,
    },

    /// Insert blank columns, shifting later columns right
    InsertColumn {
        file: String,
        #[arg(value_parser = str::parse::<ColumnRef>)]
        column: ColumnRef,
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,
    },

    /// Remove columns, shifting later columns left
    RemoveColumn {
        file: String,
        #[arg(value_parser = str::parse::<ColumnRef>)]
        column: ColumnRef,
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.bridge {
        Some(program) => ProcessTransportConfig::with_program(program),
        None => ProcessTransportConfig::default(),
    };
    let client = SheetsClient::spawn(config).context("Failed to start the spreadsheet backend")?;

    let result = run(&client, &cli.sheet, cli.command).await;
    client
        .close_all()
        .await
        .context("Failed to release open files")?;
    result
}

async fn run(client: &SheetsClient, sheet_name: &str, command: Commands) -> Result<()> {
    match command {
        Commands::New { file, add_sheets } => {
            let sheet = client.spreadsheet(file, sheet_name);
            sheet
                .create()
                .await
                .with_context(|| format!("Failed to create '{}'", sheet.path))?;
            for name in &add_sheets {
                sheet
                    .new_sheet(name.as_str())
                    .await
                    .with_context(|| format!("Failed to add sheet '{name}'"))?;
            }
            save(&sheet).await?;
            eprintln!("Created '{}'", sheet.path);
        }
        Commands::Get { file, column, row } => {
            let sheet = open(client, file, sheet_name).await?;
            let column = cell_column(&column)?;
            let value = sheet
                .get_value([column, row])
                .await
                .with_context(|| format!("Failed to read cell {}", cell_name(column, row)))?;
            println!("{value}");
        }
        Commands::Set {
            file,
            column,
            row,
            value,
        } => {
            let sheet = open(client, file, sheet_name).await?;
            let column = cell_column(&column)?;
            sheet
                .set_value([column, row], value)
                .await
                .with_context(|| format!("Failed to write cell {}", cell_name(column, row)))?;
            save(&sheet).await?;
        }
        Commands::Range { file } => {
            let sheet = open(client, file, sheet_name).await?;
            let range = sheet
                .get_sheet_range()
                .await
                .context("Failed to read sheet extent")?;
            if range.highest_row == 0 {
                println!("empty");
            } else {
                println!(
                    "A1:{} ({} column(s), {} row(s))",
                    cell_name(range.highest_column, range.highest_row),
                    range.highest_column,
                    range.highest_row
                );
            }
        }
        Commands::Dump { file, delimiter } => {
            let sheet = open(client, file, sheet_name).await?;
            dump(&sheet, &delimiter).await?;
        }
        Commands::AppendRow { file, values } => {
            let sheet = open(client, file, sheet_name).await?;
            sheet
                .append_row(vec![values])
                .await
                .context("Failed to append row")?;
            save(&sheet).await?;
        }
        Commands::RemoveRow { file, row, count } => {
            let sheet = open(client, file, sheet_name).await?;
            sheet
                .remove_row(row, count)
                .await
                .with_context(|| format!("Failed to remove {count} row(s) at {row}"))?;
            save(&sheet).await?;
        }
        Commands::InsertColumn {
            file,
            column,
            count,
        } => {
            let sheet = open(client, file, sheet_name).await?;
            sheet
                .insert_new_column(column.clone(), count)
                .await
                .with_context(|| format!("Failed to insert {count} column(s) at {column}"))?;
            save(&sheet).await?;
        }
        Commands::RemoveColumn {
            file,
            column,
            count,
        } => {
            let sheet = open(client, file, sheet_name).await?;
            sheet
                .remove_column(column.clone(), count)
                .await
                .with_context(|| format!("Failed to remove {count} column(s) at {column}"))?;
            save(&sheet).await?;
        }
    }
    Ok(())
}

async fn open(client: &SheetsClient, file: String, sheet_name: &str) -> Result<Spreadsheet> {
    let sheet = client.spreadsheet(file, sheet_name);
    sheet
        .read()
        .await
        .with_context(|| format!("Failed to open '{}'", sheet.path))?;
    Ok(sheet)
}

async fn save(sheet: &Spreadsheet) -> Result<()> {
    sheet
        .write()
        .await
        .with_context(|| format!("Failed to write '{}'", sheet.path))
}

fn cell_column(column: &ColumnRef) -> Result<u32> {
    match column.to_index() {
        Some(index) if index > 0 => Ok(index),
        _ => bail!("'{column}' is not a usable column"),
    }
}

/// A1-style name for a cell, falling back to `(column, row)`.
fn cell_name(column: u32, row: u32) -> String {
    match column_label(column) {
        Some(label) => format!("{label}{row}"),
        None => format!("({column}, {row})"),
    }
}

async fn dump(sheet: &Spreadsheet, delimiter: &str) -> Result<()> {
    let highest_row = sheet
        .get_sheet_row()
        .await
        .context("Failed to read sheet extent")?;
    if highest_row == 0 {
        eprintln!("Warning: Sheet appears to be empty");
        return Ok(());
    }

    let rows = sheet
        .get_rows(1, highest_row + 1)
        .await
        .context("Failed to read rows")?;

    let mut out = io::stdout().lock();
    for row in rows {
        writeln!(out, "{}", row.join(delimiter)).context("Failed to write to stdout")?;
    }
    Ok(())
}
