use crate::error::Result;
use crate::models::{PipelineConfig, PipelineStage, StepDetail, StepReport, Table, Value};
use crate::utils::constants::HIGH_IMPACT_COLUMN;
use tracing::{info, warn};

/// Adds the `High Impact` column: `pollutant > threshold`, with null or
/// non-numeric readings counted as not high impact.
pub struct EventFlagger {
    pollutant_column: String,
    threshold: f64,
}

impl EventFlagger {
    pub fn new(pollutant_column: impl Into<String>, threshold: f64) -> Self {
        Self {
            pollutant_column: pollutant_column.into(),
            threshold,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.pollutant_column.clone(), config.threshold)
    }

    pub fn is_high_impact(&self, value: &Value) -> bool {
        value
            .as_f64()
            .map(|reading| reading > self.threshold)
            .unwrap_or(false)
    }

    pub fn flag(&self, mut table: Table) -> Result<(Table, StepReport)> {
        let mut null_rows = 0;
        let mut unparseable = 0;

        let flags: Vec<Value> = table
            .column_values(&self.pollutant_column, PipelineStage::Flagged)?
            .map(|value| {
                if value.is_null() {
                    null_rows += 1;
                } else if value.as_f64().is_none() {
                    unparseable += 1;
                }
                Value::Boolean(self.is_high_impact(value))
            })
            .collect();

        let high_impact_rows = flags
            .iter()
            .filter(|f| matches!(f, Value::Boolean(true)))
            .count();
        table.set_column(HIGH_IMPACT_COLUMN, flags)?;

        info!("High impact events detected: {}", high_impact_rows);

        let mut report = StepReport::new(
            PipelineStage::Flagged,
            table.shape(),
            StepDetail::Flagged {
                pollutant_column: self.pollutant_column.clone(),
                threshold: self.threshold,
                high_impact_rows,
                null_rows,
            },
        );
        if unparseable > 0 {
            warn!(
                "{} values in {} are not numeric and were not flagged",
                unparseable, self.pollutant_column
            );
            report = report.with_warning(format!(
                "{}: {} non-numeric values treated as not high impact",
                self.pollutant_column, unparseable
            ));
        }

        Ok((table, report))
    }
}
