use crate::error::Result;
use crate::models::{
    PipelineConfig, PipelineReport, PipelineStage, PipelineStatus, StepDetail, StepReport, Table,
};
use crate::processors::{Cleaner, ColumnProjector, DatetimeNormalizer, EventFlagger};
use crate::readers::TableReader;
use crate::utils::progress::ProgressReporter;
use crate::writers::CsvWriter;
use tracing::{error, info};

/// Final table (absent when the input was missing) plus what each step did.
#[derive(Debug)]
pub struct PipelineOutput {
    pub table: Option<Table>,
    pub report: PipelineReport,
}

/// Load -> clean -> normalize -> project -> flag -> save.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage against the configured input and output paths.
    ///
    /// A missing input file halts the run with [`PipelineStatus::InputMissing`];
    /// a failed write is recorded as [`PipelineStatus::SaveFailed`]. Missing
    /// columns and unreadable input are returned as errors.
    pub fn run(&self, progress: Option<&ProgressReporter>) -> Result<PipelineOutput> {
        if let Some(p) = progress {
            p.set_message(&format!("Loading {}", self.config.input_path.display()));
        }

        let reader = TableReader::new();
        let Some((table, load_report)) = reader.load(&self.config.input_path)? else {
            return Ok(PipelineOutput {
                table: None,
                report: PipelineReport {
                    status: PipelineStatus::InputMissing,
                    steps: Vec::new(),
                },
            });
        };
        if let Some(p) = progress {
            p.increment(1);
        }

        let (table, mut steps) = self.process(table, progress)?;
        steps.insert(0, load_report);

        if let Some(p) = progress {
            p.set_message(&format!("Saving {}", self.config.output_path.display()));
        }
        let save_report = self.save(&table);
        if let Some(p) = progress {
            p.increment(1);
        }

        let status = match save_report.detail {
            StepDetail::SaveFailed { .. } => PipelineStatus::SaveFailed,
            _ => PipelineStatus::Completed,
        };
        steps.push(save_report);

        Ok(PipelineOutput {
            table: Some(table),
            report: PipelineReport { status, steps },
        })
    }

    /// The in-memory stages, on an already loaded table.
    pub fn process(
        &self,
        table: Table,
        progress: Option<&ProgressReporter>,
    ) -> Result<(Table, Vec<StepReport>)> {
        let mut steps = Vec::with_capacity(4);

        let advance = |stage: PipelineStage| {
            if let Some(p) = progress {
                p.set_message(&format!("Running {}", stage));
                p.increment(1);
            }
        };

        let (table, report) = Cleaner::from_config(&self.config).clean(table)?;
        steps.push(report);
        advance(PipelineStage::Cleaned);

        let (table, report) = DatetimeNormalizer::from_config(&self.config).normalize(table)?;
        steps.push(report);
        advance(PipelineStage::Normalized);

        let (table, report) = ColumnProjector::from_config(&self.config).project(table)?;
        steps.push(report);
        advance(PipelineStage::Projected);

        let (table, report) = EventFlagger::from_config(&self.config).flag(table)?;
        steps.push(report);
        advance(PipelineStage::Flagged);

        Ok((table, steps))
    }

    /// Write the table to the configured output; failures are reported, not raised.
    pub fn save(&self, table: &Table) -> StepReport {
        let path = &self.config.output_path;
        let writer = CsvWriter::new();

        match writer.write_table(table, path) {
            Ok(()) => {
                info!("Data saved to {}", path.display());
                StepReport::new(
                    PipelineStage::Saved,
                    table.shape(),
                    StepDetail::Saved {
                        path: path.to_path_buf(),
                    },
                )
            }
            Err(e) => {
                error!("Error saving data to {}: {}", path.display(), e);
                StepReport::new(
                    PipelineStage::Saved,
                    table.shape(),
                    StepDetail::SaveFailed {
                        path: path.to_path_buf(),
                        error: e.to_string(),
                    },
                )
                .with_warning(format!("output not written: {}", e))
            }
        }
    }

    /// Required input columns the loaded table lacks.
    pub fn check_schema(&self, table: &Table) -> Vec<String> {
        table.missing_columns(&self.config.required_input_columns())
    }
}
