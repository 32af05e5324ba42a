//! Resolve command handler
//!
//! Looks up destinations the same way the map does, with the same pacing.

use crate::config::Config;
use crate::error::Result;
use crate::geo::{get_geocoder, BatchResolver, CoordinateCache, CoordinateResolver, Resolution};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Resolve command arguments
#[derive(Args)]
pub struct ResolveArgs {
    /// Destinations, e.g. "Porto, Portugal"
    #[arg(required = true)]
    pub destinations: Vec<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ResolvedDestination<'a> {
    destination: &'a str,
    #[serde(flatten)]
    resolution: &'a Resolution,
    located: bool,
}

/// Run the resolve command
pub async fn run(args: ResolveArgs) -> Result<()> {
    let config = Config::load()?;
    let resolver = CoordinateResolver::new(get_geocoder(&config)?, Arc::new(CoordinateCache::new()));
    let batch = BatchResolver::new(&resolver).with_interval(config.geocode_interval());

    let results = batch.resolve_each(&args.destinations).await;

    if args.json {
        let rows: Vec<ResolvedDestination> = results
            .iter()
            .map(|(destination, resolution)| ResolvedDestination {
                destination,
                resolution,
                located: resolution.is_located(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", render_text(&results));
    }

    Ok(())
}

fn render_text(results: &[(String, Resolution)]) -> String {
    let mut out = String::new();
    for (destination, resolution) in results {
        let note = if resolution.is_located() { "" } else { " not found" };
        out.push_str(&format!(
            "{}: {} [{:?}]{}\n",
            destination, resolution.coords, resolution.source, note
        ));
    }
    out
}
