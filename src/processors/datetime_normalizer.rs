use crate::error::Result;
use crate::models::{PipelineConfig, PipelineStage, StepDetail, StepReport, Table, Value};
use crate::utils::constants::{DATETIME_FORMATS, DATE_FORMATS};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{info, warn};

/// Converts designated columns to datetimes, coercing anything unparseable to
/// [`Value::NullDateTime`].
pub struct DatetimeNormalizer {
    columns: Vec<String>,
    formats: Vec<String>,
}

impl DatetimeNormalizer {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            formats: DATETIME_FORMATS
                .iter()
                .chain(DATE_FORMATS.iter())
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn with_formats(mut self, formats: Vec<String>) -> Self {
        self.formats = formats;
        self
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.datetime_columns.clone()).with_formats(config.datetime_formats.clone())
    }

    pub fn normalize(&self, mut table: Table) -> Result<(Table, StepReport)> {
        // Every column must exist before any is touched
        table.require_columns(&self.columns, PipelineStage::Normalized)?;

        let mut coerced_cells = 0;
        let mut warnings = Vec::new();

        for column in &self.columns {
            let mut coerced = 0;
            table.map_column(column, PipelineStage::Normalized, |cell| {
                let converted = self.convert(cell);
                if converted == Value::NullDateTime && !cell.is_null() {
                    coerced += 1;
                }
                *cell = converted;
            })?;

            if coerced > 0 {
                warn!("{}: {} values could not be parsed as datetimes", column, coerced);
                warnings.push(format!(
                    "{}: {} values could not be parsed as datetimes",
                    column, coerced
                ));
            }
            coerced_cells += coerced;
        }

        info!("Converted {} columns to datetime", self.columns.len());

        let mut report = StepReport::new(
            PipelineStage::Normalized,
            table.shape(),
            StepDetail::Normalized {
                columns_converted: self.columns.len(),
                coerced_cells,
            },
        );
        report.warnings = warnings;

        Ok((table, report))
    }

    /// Datetime for one cell; never fails.
    pub fn convert(&self, cell: &Value) -> Value {
        let parsed = match cell {
            Value::DateTime(dt) => Some(*dt),
            Value::Text(s) => self.parse_text(s),
            Value::Integer(i) => self.parse_text(&i.to_string()),
            _ => None,
        };

        parsed.map_or(Value::NullDateTime, Value::DateTime)
    }

    fn parse_text(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.naive_utc());
        }

        self.formats.iter().find_map(|format| {
            NaiveDateTime::parse_from_str(text, format).ok().or_else(|| {
                NaiveDate::parse_from_str(text, format)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
        })
    }
}
