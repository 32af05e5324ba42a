//! List command handler

use crate::cli::{load_service, FilterArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::exchange::ExchangeRecord;
use clap::Args;

/// List command arguments
#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output format: text or json
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,
}

/// Run the list command
pub async fn run(args: ListArgs) -> Result<()> {
    let config = Config::load()?;
    let service = load_service(&config).await?;
    let records = service.filter(&args.filter.to_filter());

    let output = match args.format.to_lowercase().as_str() {
        "text" => render_table(&records),
        "json" => serde_json::to_string_pretty(&records)?,
        other => return Err(Error::Config(format!("Unknown format: {}", other))),
    };
    println!("{}", output);

    Ok(())
}

fn render_table(records: &[&ExchangeRecord]) -> String {
    if records.is_empty() {
        return "No exchanges match.".to_string();
    }

    let width = records
        .iter()
        .map(|r| r.destination.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for record in records {
        let pad = width - record.destination.chars().count();
        out.push_str(&format!(
            "{:>4}  {}{}  {:<9} {} ({})",
            record.id,
            record.destination,
            " ".repeat(pad),
            record.category.label(),
            record.activity,
            record.school
        ));
        if !record.course.is_empty() {
            out.push_str(&format!(" - {}", record.course));
        }
        out.push('\n');
    }
    out.push_str(&format!("\n{} exchanges", records.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{Category, NewExchange};

    #[test]
    fn test_render_table() {
        let porto = ExchangeRecord::new(
            1,
            NewExchange::new("Porto, Portugal", "Praktik", "Gymnasiet", Category::Erasmus)
                .with_course("Vård"),
        );
        let wien = ExchangeRecord::new(
            2,
            NewExchange::new("Wien, Österrike", "Studiebesök", "Grundskolan", Category::Tca),
        );

        let table = render_table(&[&porto, &wien]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "   1  Porto, Portugal  Erasmus   Praktik (Gymnasiet) - Vård");
        assert_eq!(lines[1], "   2  Wien, Österrike  TCA       Studiebesök (Grundskolan)");
        assert!(table.ends_with("2 exchanges"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_table(&[]), "No exchanges match.");
    }
}
