use crate::error::Result;
use crate::models::value::format_float;
use crate::models::{Table, Value};
use crate::utils::constants::{OUTPUT_DATETIME_FORMAT, OUTPUT_DATE_FORMAT};
use chrono::Timelike;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    /// Header row plus one line per row, no index column.
    ///
    /// A failed write may leave a partial file behind.
    pub fn write_table(&self, table: &Table, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(BufWriter::new(file));

        writer.write_record(table.columns())?;

        let date_only: Vec<bool> = (0..table.num_columns())
            .map(|idx| is_date_only(table.rows().iter().map(|row| &row[idx])))
            .collect();

        for row in table.rows() {
            writer.write_record(
                row.iter()
                    .zip(&date_only)
                    .map(|(value, &date_only)| format_cell(value, date_only)),
            )?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn get_file_info(&self, path: &Path) -> Result<CsvFileInfo> {
        let file_size = fs::metadata(path)?.len();
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)?;

        let total_columns = reader.headers()?.len();
        let mut total_rows = 0;
        for record in reader.records() {
            record?;
            total_rows += 1;
        }

        Ok(CsvFileInfo {
            total_rows,
            total_columns,
            file_size,
        })
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Datetime columns whose values all fall on midnight are written as dates.
fn is_date_only<'a>(values: impl Iterator<Item = &'a Value>) -> bool {
    let mut saw_datetime = false;
    for value in values {
        if let Value::DateTime(dt) = value {
            if dt.num_seconds_from_midnight() != 0 || dt.nanosecond() != 0 {
                return false;
            }
            saw_datetime = true;
        }
    }
    saw_datetime
}

fn format_cell(value: &Value, date_only: bool) -> String {
    match value {
        Value::Null | Value::NullDateTime => String::new(),
        Value::Text(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Boolean(true) => "True".to_string(),
        Value::Boolean(false) => "False".to_string(),
        Value::DateTime(dt) if date_only => dt.format(OUTPUT_DATE_FORMAT).to_string(),
        Value::DateTime(dt) => dt.format(OUTPUT_DATETIME_FORMAT).to_string(),
    }
}

#[derive(Debug)]
pub struct CsvFileInfo {
    pub total_rows: usize,
    pub total_columns: usize,
    pub file_size: u64,
}

impl CsvFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "CSV File Summary:\n\
            - Total rows: {}\n\
            - Columns: {}\n\
            - File size: {:.2} KB",
            self.total_rows,
            self.total_columns,
            self.file_size as f64 / 1024.0
        )
    }
}
