use crate::error::Result;
use crate::models::{PipelineConfig, PipelineStage, StepDetail, StepReport, Table};
use tracing::info;

pub struct ColumnProjector {
    columns: Vec<String>,
}

impl ColumnProjector {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.projection_columns())
    }

    /// Keep exactly the configured columns, in configured order.
    pub fn project(&self, table: Table) -> Result<(Table, StepReport)> {
        let projected = table.select(&self.columns, PipelineStage::Projected)?;
        let dropped_columns: Vec<String> = table
            .columns()
            .iter()
            .filter(|c| !self.columns.contains(*c))
            .cloned()
            .collect();

        info!(
            "Selected {} columns, dropped {}",
            projected.num_columns(),
            dropped_columns.len()
        );

        let report = StepReport::new(
            PipelineStage::Projected,
            projected.shape(),
            StepDetail::Projected { dropped_columns },
        );

        Ok((projected, report))
    }
}
