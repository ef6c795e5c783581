use crate::error::Result;
use crate::models::{PipelineConfig, PipelineStage, StepDetail, StepReport, Table};
use std::collections::HashSet;
use tracing::info;

/// Drops rows missing a critical value, then exact duplicate rows.
pub struct Cleaner {
    critical_columns: Vec<String>,
}

impl Cleaner {
    pub fn new(critical_columns: Vec<String>) -> Self {
        Self { critical_columns }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.critical_columns.clone())
    }

    pub fn clean(&self, mut table: Table) -> Result<(Table, StepReport)> {
        let critical = table.require_columns(&self.critical_columns, PipelineStage::Cleaned)?;
        let loaded_rows = table.num_rows();

        table.retain_rows(|row| critical.iter().all(|&idx| !row[idx].is_null()));
        let dropped_missing = loaded_rows - table.num_rows();

        // First occurrence wins
        let mut seen: HashSet<Vec<u8>> = HashSet::with_capacity(table.num_rows());
        let before_dedup = table.num_rows();
        table.retain_rows(|row| {
            let mut key = Vec::new();
            for value in row {
                value.write_dedup_key(&mut key);
            }
            seen.insert(key)
        });
        let dropped_duplicates = before_dedup - table.num_rows();

        info!(
            "Cleaned data shape: ({}, {}); dropped {} rows with missing critical values and {} duplicates",
            table.num_rows(),
            table.num_columns(),
            dropped_missing,
            dropped_duplicates
        );

        let report = StepReport::new(
            PipelineStage::Cleaned,
            table.shape(),
            StepDetail::Cleaned {
                dropped_missing,
                dropped_duplicates,
            },
        );

        Ok((table, report))
    }
}
