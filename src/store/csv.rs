//! CSV import and export
//!
//! The exchange file is `;`-delimited with the header
//! `Destination;Aktivitet;Kurs/besökande skola;Enhet;` where the last,
//! unnamed column holds the category.

use crate::constants::csv::{ACTIVITY, CATEGORY, COURSE, DELIMITER, DESTINATION, SCHOOL};
use crate::error::{Error, Result};
use crate::exchange::{Category, ExchangeRecord, NewExchange};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tracing::{debug, info};

/// A row that could not be decoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    /// 1-based line number in the file
    pub line: u64,
    pub reason: String,
}

/// Parsed content of an exchange file
#[derive(Debug, Default, Clone)]
pub struct CsvImport {
    /// Rows with a destination, trimmed, in file order
    pub rows: Vec<NewExchange>,
    /// Rows the reader could not decode, such as invalid UTF-8
    pub rejected: Vec<RejectedRow>,
    /// Rows without a destination, skipped silently
    pub skipped: usize,
}

/// Column positions resolved from the header row
struct Columns {
    destination: usize,
    activity: Option<usize>,
    course: Option<usize>,
    school: Option<usize>,
    category: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };

        let destination = find(DESTINATION).ok_or_else(|| {
            Error::Validation(format!("CSV is missing the {} column", DESTINATION))
        })?;

        Ok(Self {
            destination,
            activity: find(ACTIVITY),
            course: find(COURSE),
            school: find(SCHOOL),
            category: find(CATEGORY),
        })
    }
}

fn field(record: &StringRecord, index: Option<usize>) -> String {
    index
        .and_then(|i| record.get(i))
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Read exchanges from a `;`-delimited file
///
/// Only the destination is required. Blank activity, course or school
/// values stay empty and a blank or unknown category becomes `Okänd`.
pub fn read_exchanges<R: Read>(reader: R) -> Result<CsvImport> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(DELIMITER)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = Columns::from_headers(&headers)?;
    let mut import = CsvImport::default();

    for result in csv_reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                debug!("Rejected CSV line {}: {}", line, e);
                import.rejected.push(RejectedRow {
                    line,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let destination = field(&record, Some(columns.destination));
        if destination.is_empty() {
            import.skipped += 1;
            continue;
        }

        import.rows.push(NewExchange {
            destination,
            activity: field(&record, columns.activity),
            course: field(&record, columns.course),
            school: field(&record, columns.school),
            category: Category::from_label(&field(&record, columns.category)),
        });
    }

    info!(
        "Read {} exchanges from CSV ({} rejected, {} without destination)",
        import.rows.len(),
        import.rejected.len(),
        import.skipped
    );

    Ok(import)
}

/// Write exchanges in the same layout they are read in
pub fn write_exchanges<'a, W, I>(writer: W, records: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a ExchangeRecord>,
{
    let mut csv_writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(writer);

    csv_writer.write_record([DESTINATION, ACTIVITY, COURSE, SCHOOL, CATEGORY])?;
    for record in records {
        csv_writer.write_record([
            record.destination.as_str(),
            record.activity.as_str(),
            record.course.as_str(),
            record.school.as_str(),
            record.category.label(),
        ])?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Export exchanges to a CSV string
pub fn to_csv_string<'a, I>(records: I) -> Result<String>
where
    I: IntoIterator<Item = &'a ExchangeRecord>,
{
    let mut buffer = Vec::new();
    write_exchanges(&mut buffer, records)?;
    String::from_utf8(buffer).map_err(|e| Error::Persistence(format!("CSV is not UTF-8: {}", e)))
}
