//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "geocoding.interval_ms")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            print!("{}", render_config(&config));
        }

        // Key only: show that value
        (Some(key), None) => match config.get(key) {
            Some(value) => println!("{}", value),
            None => {
                let keys = Config::available_keys().join("\n  ");
                return Err(Error::Config(format!(
                    "Unknown config key: {}\n\nAvailable keys:\n  {}",
                    key, keys
                )));
            }
        },

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            return Err(Error::Config("Must specify a key to set a value".to_string()));
        }
    }

    Ok(())
}

/// Render all configuration values, with the password masked
fn render_config(config: &Config) -> String {
    let mut out = String::new();

    out.push_str("[geocoding]\n");
    out.push_str(&format!("endpoint = \"{}\"\n", config.geocoding.endpoint));
    out.push_str(&format!("user_agent = \"{}\"\n", config.geocoding.user_agent));
    out.push_str(&format!("interval_ms = {}\n\n", config.geocoding.interval_ms));

    out.push_str("[server]\n");
    out.push_str(&format!("host = \"{}\"\n", config.server.host));
    out.push_str(&format!("port = {}\n", config.server.port));
    out.push_str(&format!("static_dir = \"{}\"\n\n", config.server.static_dir));

    out.push_str("[data]\n");
    out.push_str(&format!("csv_path = \"{}\"\n", config.data.csv_path));
    if config.data.store_path.is_empty() {
        out.push_str("store_path = \"\" # default data directory\n\n");
    } else {
        out.push_str(&format!("store_path = \"{}\"\n\n", config.data.store_path));
    }

    out.push_str("[admin]\n");
    out.push_str("password = \"***\"\n");
    out.push_str(&format!(
        "session_timeout_secs = {}\n",
        config.admin.session_timeout_secs
    ));

    out
}
