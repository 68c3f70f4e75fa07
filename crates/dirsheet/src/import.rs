//! CSV row import
//!
//! Feeds CSV records into an open [`OdsWriter`], one record per data row.
//! Fields map to columns by position. In columns marked `multivalue`, a
//! field containing the separator becomes a multivalue cell.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use dirsheet_ods::{OdsError, OdsWriter};
use thiserror::Error;

/// Result type for CSV import
pub type ImportResult<T> = std::result::Result<T, ImportError>;

/// Errors that can occur while importing rows
#[derive(Debug, Error)]
pub enum ImportError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Output error
    #[error("ODS error: {0}")]
    Ods(#[from] OdsError),
}

/// Options for reading CSV rows
#[derive(Debug, Clone)]
pub struct CsvImportOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Whether the first record is a header to skip
    pub has_header: bool,
    /// Separator splitting multivalue fields (None disables splitting)
    pub multivalue_separator: Option<char>,
}

impl Default for CsvImportOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            has_header: true,
            multivalue_separator: Some(';'),
        }
    }
}

/// CSV row importer
pub struct CsvImporter;

impl CsvImporter {
    /// Import a CSV file into the current sheet; returns the number of rows
    pub fn import_file<P: AsRef<Path>>(
        writer: &mut OdsWriter,
        path: P,
        options: &CsvImportOptions,
    ) -> ImportResult<usize> {
        let file = File::open(path)?;
        Self::import(writer, file, options)
    }

    /// Import CSV from a reader into the current sheet; returns the number of rows
    pub fn import<R: Read>(
        writer: &mut OdsWriter,
        reader: R,
        options: &CsvImportOptions,
    ) -> ImportResult<usize> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(options.has_header)
            .flexible(true)
            .from_reader(reader);

        let multivalue: Vec<bool> = writer
            .columns()
            .columns()
            .iter()
            .map(|c| c.multivalue)
            .collect();

        let mut rows = 0;
        for result in csv_reader.records() {
            let record = result?;
            if record.len() > multivalue.len() {
                log::warn!(
                    "record {} has {} fields; only {} columns are configured",
                    rows + 1,
                    record.len(),
                    multivalue.len()
                );
            }

            for (field, &is_multivalue) in record.iter().zip(&multivalue) {
                match options.multivalue_separator {
                    Some(sep) if is_multivalue && field.contains(sep) => {
                        let values: Vec<&str> = field
                            .split(sep)
                            .map(str::trim)
                            .filter(|v| !v.is_empty())
                            .collect();
                        if values.is_empty() {
                            writer.add_empty()?;
                        } else {
                            writer.add_values(values)?;
                        }
                    }
                    _ => writer.add_value(field)?,
                }
            }

            writer.render_row(false)?;
            rows += 1;
        }

        log::debug!("imported {} row(s)", rows);
        Ok(rows)
    }
}
