use crate::error::{ProcessingError, Result};
use crate::models::{ColumnKind, PipelineStage, StepDetail, StepReport, Table, Value};
use crate::utils::constants::NA_VALUES;
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, error, info};

pub struct TableReader {
    delimiter: u8,
}

impl TableReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Load a delimited file, returning `None` if the file does not exist.
    ///
    /// Any other I/O failure, or content the CSV parser rejects, is an error.
    pub fn load(&self, path: &Path) -> Result<Option<(Table, StepReport)>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!("Input file not found: {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let (content, encoding) = decode(&bytes);
        let (table, padded_rows) = self.parse_content(&content)?;

        info!("Data loaded successfully from {}", path.display());
        info!("Shape: ({}, {})", table.num_rows(), table.num_columns());
        info!("Columns: {:?}", table.columns());

        let mut report = StepReport::new(
            PipelineStage::Loaded,
            table.shape(),
            StepDetail::Loaded {
                path: path.to_path_buf(),
                column_names: table.columns().to_vec(),
                encoding: encoding.to_string(),
            },
        );
        if padded_rows > 0 {
            report = report.with_warning(format!(
                "{} short rows padded with nulls",
                padded_rows
            ));
        }

        Ok(Some((table, report)))
    }

    /// Parse delimited text (header row first) into a table
    pub fn parse_str(&self, content: &str) -> Result<Table> {
        self.parse_content(content).map(|(table, _)| table)
    }

    fn parse_content(&self, content: &str) -> Result<(Table, usize)> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let columns = disambiguate_headers(reader.headers()?.iter());
        let width = columns.len();
        let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
        let mut padded_rows = 0;

        for (line, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > width {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Data row {}: expected {} fields, saw {}",
                    line + 1,
                    width,
                    record.len()
                )));
            }

            let mut row: Vec<Option<String>> = record
                .iter()
                .map(|cell| (!is_na(cell)).then(|| cell.to_string()))
                .collect();
            if row.len() < width {
                padded_rows += 1;
                row.resize(width, None);
            }
            raw_rows.push(row);
        }

        let kinds: Vec<ColumnKind> = (0..width)
            .map(|idx| infer_kind(raw_rows.iter().map(|row| row[idx].as_deref())))
            .collect();
        debug!("Inferred column kinds: {:?}", kinds);

        let mut table = Table::new(columns);
        for row in raw_rows {
            let values = row
                .into_iter()
                .zip(&kinds)
                .map(|(cell, kind)| convert_cell(cell, *kind))
                .collect();
            table.push_row(values)?;
        }

        Ok((table, padded_rows))
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}

/// UTF-8 (BOM stripped) first, Windows-1252 for legacy exports.
fn decode(bytes: &[u8]) -> (Cow<'_, str>, &'static str) {
    let (text, encoding, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return (text, encoding.name());
    }
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    (text, WINDOWS_1252.name())
}

fn is_na(cell: &str) -> bool {
    NA_VALUES.contains(&cell.trim())
}

/// Repeated header names become `name.1`, `name.2`, ...
fn disambiguate_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut columns: Vec<String> = Vec::new();

    for header in headers {
        let mut name = header.to_string();
        while columns.contains(&name) {
            let counter = seen.entry(header.to_string()).or_insert(0);
            *counter += 1;
            name = format!("{}.{}", header, counter);
        }
        columns.push(name);
    }

    columns
}

fn infer_kind<'a>(cells: impl Iterator<Item = Option<&'a str>>) -> ColumnKind {
    let mut kind = ColumnKind::Empty;

    for cell in cells.flatten() {
        let trimmed = cell.trim();
        let cell_kind = if trimmed.parse::<i64>().is_ok() {
            ColumnKind::Integer
        } else if let Ok(f) = trimmed.parse::<f64>() {
            // `NAN`, `+nan` and friends are missing readings
            if f.is_nan() {
                continue;
            }
            ColumnKind::Float
        } else if parse_bool(trimmed).is_some() {
            ColumnKind::Boolean
        } else {
            return ColumnKind::Text;
        };

        kind = match (kind, cell_kind) {
            (ColumnKind::Empty, k) => k,
            (a, b) if a == b => a,
            (ColumnKind::Integer, ColumnKind::Float) | (ColumnKind::Float, ColumnKind::Integer) => {
                ColumnKind::Float
            }
            _ => return ColumnKind::Text,
        };
    }

    kind
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn convert_cell(cell: Option<String>, kind: ColumnKind) -> Value {
    let Some(cell) = cell else {
        return Value::Null;
    };
    let trimmed = cell.trim();

    match kind {
        ColumnKind::Integer => trimmed.parse().map(Value::Integer).unwrap_or(Value::Null),
        ColumnKind::Float => trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| !f.is_nan())
            .map(Value::Float)
            .unwrap_or(Value::Null),
        ColumnKind::Boolean => parse_bool(trimmed).map(Value::Boolean).unwrap_or(Value::Null),
        _ => Value::Text(cell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_infers_column_kinds() -> Result<()> {
        let reader = TableReader::new();
        let table = reader.parse_str(
            "Site_Name,Max_PM10,Avg_PM10_24Hour,Active\n\
             Alpha,120,80.5,true\n\
             Beta,NA,81,False\n",
        )?;

        assert_eq!(table.shape(), (2, 4));
        assert_eq!(table.value(0, "Site_Name"), Some(&Value::from("Alpha")));
        assert_eq!(table.value(0, "Max_PM10"), Some(&Value::Integer(120)));
        assert_eq!(table.value(1, "Max_PM10"), Some(&Value::Null));
        assert_eq!(table.value(1, "Avg_PM10_24Hour"), Some(&Value::Float(81.0)));
        assert_eq!(table.value(1, "Active"), Some(&Value::Boolean(false)));

        Ok(())
    }

    #[test]
    fn test_nan_spellings_read_as_null() -> Result<()> {
        let reader = TableReader::new();
        let table = reader.parse_str(
            "Max_PM10,Avg_PM10_24Hour\n\
             NAN,80\n\
             120,+nan\n\
             50,81.5\n",
        )?;

        assert_eq!(table.value(0, "Max_PM10"), Some(&Value::Null));
        assert_eq!(table.value(1, "Max_PM10"), Some(&Value::Integer(120)));
        assert_eq!(table.value(1, "Avg_PM10_24Hour"), Some(&Value::Null));
        assert_eq!(table.value(2, "Avg_PM10_24Hour"), Some(&Value::Float(81.5)));

        Ok(())
    }

    #[test]
    fn test_mixed_column_stays_text() -> Result<()> {
        let reader = TableReader::new();
        let table = reader.parse_str("Code\n007\nabc\n")?;

        assert_eq!(table.value(0, "Code"), Some(&Value::from("007")));
        assert_eq!(table.column_kind("Code"), Some(ColumnKind::Text));

        Ok(())
    }

    #[test]
    fn test_short_rows_padded_long_rows_rejected() {
        let reader = TableReader::new();

        let table = reader.parse_str("a,b,c\n1,2\n").unwrap();
        assert_eq!(table.value(0, "c"), Some(&Value::Null));

        assert!(matches!(
            reader.parse_str("a,b\n1,2,3\n"),
            Err(ProcessingError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_duplicate_headers_disambiguated() {
        let columns = disambiguate_headers(["Date", "Date", "Value", "Date"].into_iter());
        assert_eq!(columns, vec!["Date", "Date.1", "Value", "Date.2"]);
    }

    #[test]
    fn test_load_missing_file_returns_none() -> Result<()> {
        let reader = TableReader::new();
        let loaded = reader.load(Path::new("definitely/not/here.csv"))?;
        assert!(loaded.is_none());
        Ok(())
    }

    #[test]
    fn test_load_file_with_report() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "Site_Name,Max_PM10")?;
        writeln!(temp_file, "Alpha,120")?;
        writeln!(temp_file, "Beta,99")?;

        let reader = TableReader::new();
        let (table, report) = reader.load(temp_file.path())?.expect("file exists");

        assert_eq!(table.shape(), (2, 2));
        assert_eq!(report.stage, PipelineStage::Loaded);
        assert_eq!((report.rows, report.columns), (2, 2));
        match report.detail {
            StepDetail::Loaded {
                column_names,
                encoding,
                ..
            } => {
                assert_eq!(column_names, vec!["Site_Name", "Max_PM10"]);
                assert_eq!(encoding, "UTF-8");
            }
            other => panic!("unexpected detail: {other:?}"),
        }

        Ok(())
    }

    #[test]
    fn test_load_windows_1252_file() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        // "Sa\xf4ne" is Saône in Windows-1252 and invalid UTF-8
        temp_file.write_all(b"Site_Name,Max_PM10\nSa\xf4ne,42\n")?;

        let reader = TableReader::new();
        let (table, _) = reader.load(temp_file.path())?.expect("file exists");

        assert_eq!(table.value(0, "Site_Name"), Some(&Value::from("Saône")));

        Ok(())
    }

    #[test]
    fn test_semicolon_delimiter() -> Result<()> {
        let reader = TableReader::with_delimiter(b';');
        let table = reader.parse_str("a;b\n1;x\n")?;
        assert_eq!(table.shape(), (1, 2));
        Ok(())
    }
}
