//! Command line front-end: load a spreadsheet, then list, preview or export
//! labeled QR codes for its rows.

mod args;
mod commands;

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::{Cli, Commands};
use qr_labels::{QrLabeler, Table};
use sheet_loader::load_table;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.render.config();
    // Font is resolved once, before any row is rendered.
    let labeler = QrLabeler::from_config(&config);
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::List { workbook, sheet } => {
            let table = load(&workbook, sheet.as_deref())?;
            commands::list(&table, &labeler, &mut stdout)?;
        }
        Commands::Preview {
            workbook,
            sheet,
            row,
            out,
        } => {
            let table = load(&workbook, sheet.as_deref())?;
            commands::preview(&table, &labeler, row, &out)?;
        }
        Commands::Export {
            workbook,
            sheet,
            out,
            on_error,
            collisions,
            json,
        } => {
            let table = load(&workbook, sheet.as_deref())?;
            let report =
                commands::export(&table, &labeler, on_error, collisions, &out)?;
            if json {
                serde_json::to_writer_pretty(&mut stdout, &report)?;
                writeln!(stdout)?;
            } else {
                commands::print_report(&report, &mut stdout)?;
            }
        }
    }

    Ok(())
}

fn load(workbook: &Path, sheet: Option<&str>) -> anyhow::Result<Table> {
    load_table(workbook, sheet).with_context(|| format!("failed to load {}", workbook.display()))
}
