//! exchange-map CLI entry point
//!
//! International exchange map - CLI + web app

use exchange_map::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
