//! Markers command handler
//!
//! Prints the markers the map would show for a filter.

use crate::cli::{load_service, FilterArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use clap::Args;

/// Markers command arguments
#[derive(Args)]
pub struct MarkersArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output format
    #[arg(long, short = 'f', default_value = "json")]
    pub format: String,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Run the markers command
pub async fn run(args: MarkersArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    let formatter = get_formatter(&args.format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", args.format)))?;

    let config = Config::load()?;
    let service = load_service(&config).await?;
    let markers = service.markers(&args.filter.to_filter());
    let output = formatter.format(&markers)?;

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("{} markers written to {}", markers.len(), path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:8} - {}", format.name, format.description);
    }
}
