//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod data;
pub mod list;
pub mod markers;
pub mod resolve;
pub mod serve;

use crate::config::Config;
use crate::error::Result;
use crate::exchange::Category;
use crate::geo::nominatim::NominatimBackend;
use crate::service::ExchangeService;
use crate::store::FilterState;
use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Map of international student and staff exchanges
#[derive(Parser)]
#[command(name = "exchange-map")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Look up coordinates for destinations
    Resolve(resolve::ResolveArgs),

    /// List exchanges
    List(list::ListArgs),

    /// Print map markers
    Markers(markers::MarkersArgs),

    /// Append exchanges from a CSV file
    Import(data::ImportArgs),

    /// Write all exchanges as CSV
    Export(data::ExportArgs),

    /// Remove all stored exchanges and coordinates
    Clear(data::ClearArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Filter options shared by the listing commands
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Categories to include, comma-separated (default: the four programs)
    #[arg(
        long,
        short = 'c',
        value_delimiter = ',',
        value_parser = |s: &str| s.parse::<Category>()
    )]
    pub category: Vec<Category>,

    /// Include every category, unlabeled exchanges too
    #[arg(long, conflicts_with = "category")]
    pub all: bool,

    /// Only this activity
    #[arg(long)]
    pub activity: Option<String>,

    /// Only this school
    #[arg(long)]
    pub school: Option<String>,

    /// Free-text search over destination, activity, course and school
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> FilterState {
        let mut filter = if self.all {
            FilterState::all()
        } else if self.category.is_empty() {
            FilterState::default()
        } else {
            FilterState::default().with_categories(self.category.iter().copied())
        };

        if let Some(activity) = &self.activity {
            filter = filter.with_activity(activity.clone());
        }
        if let Some(school) = &self.school {
            filter = filter.with_school(school.clone());
        }
        if let Some(search) = &self.search {
            filter = filter.with_search(search.clone());
        }
        filter
    }
}

/// Initialize logging, honoring `RUST_LOG` over the given default
fn init_logging(default: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

/// Open the configured data, starting empty if there is none yet
pub(crate) async fn load_service(config: &Config) -> Result<ExchangeService<NominatimBackend>> {
    let mut service = ExchangeService::from_config(config)?;
    if let Err(e) = service.initialize().await {
        warn!("No exchange data loaded: {}", e);
    }
    Ok(service)
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve(_) => init_logging("info"),
        _ => init_logging("warn"),
    }

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Resolve(args) => resolve::run(args).await,
        Commands::List(args) => list::run(args).await,
        Commands::Markers(args) => markers::run(args).await,
        Commands::Import(args) => data::import(args).await,
        Commands::Export(args) => data::export(args).await,
        Commands::Clear(args) => data::clear(args),
        Commands::Config(args) => config::run(args),
    }
}
