//! Import, export and clear command handlers

use crate::cli::load_service;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::service::{ExchangeService, ImportReport};
use clap::Args;
use std::fs::File;
use std::path::PathBuf;

/// Import command arguments
#[derive(Args)]
pub struct ImportArgs {
    /// `;`-delimited file with the Destination, Aktivitet, Kurs/besökande
    /// skola and Enhet columns followed by an unnamed category column
    pub file: PathBuf,
}

/// Export command arguments
#[derive(Args)]
pub struct ExportArgs {
    /// Write to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Clear command arguments
#[derive(Args)]
pub struct ClearArgs {
    /// Confirm removal of all data
    #[arg(long)]
    pub yes: bool,
}

/// Run the import command
pub async fn import(args: ImportArgs) -> Result<()> {
    let config = Config::load()?;
    let mut service = load_service(&config).await?;

    let file = File::open(&args.file)?;
    let report = service.import_csv(file).await?;
    print!("{}", render_report(&report));

    Ok(())
}

/// Run the export command
pub async fn export(args: ExportArgs) -> Result<()> {
    let config = Config::load()?;
    let service = load_service(&config).await?;
    let csv = service.export_csv()?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, csv)?;
            eprintln!("{} exchanges written to {}", service.store().len(), path.display());
        }
        None => print!("{}", csv),
    }

    Ok(())
}

/// Run the clear command
pub fn clear(args: ClearArgs) -> Result<()> {
    if !args.yes {
        return Err(Error::Validation(
            "this removes every exchange and coordinate; pass --yes to confirm".to_string(),
        ));
    }

    let config = Config::load()?;
    let mut service = ExchangeService::from_config(&config)?;
    service.clear();
    println!("All exchange data removed");

    Ok(())
}

fn render_report(report: &ImportReport) -> String {
    let mut out = format!("Imported {} exchanges\n", report.imported);
    if report.skipped > 0 {
        out.push_str(&format!("Skipped {} rows without destination\n", report.skipped));
    }
    for row in &report.rejected {
        out.push_str(&format!("Rejected line {}: {}\n", row.line, row.reason));
    }
    if report.resolved > 0 {
        out.push_str(&format!(
            "Looked up {} new destinations ({} not found)\n",
            report.resolved, report.unlocated
        ));
    }
    out
}
