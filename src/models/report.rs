use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Loaded,
    Cleaned,
    Normalized,
    Projected,
    Flagged,
    Saved,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 6] = [
        PipelineStage::Loaded,
        PipelineStage::Cleaned,
        PipelineStage::Normalized,
        PipelineStage::Projected,
        PipelineStage::Flagged,
        PipelineStage::Saved,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            PipelineStage::Loaded => "load",
            PipelineStage::Cleaned => "clean",
            PipelineStage::Normalized => "datetime normalization",
            PipelineStage::Projected => "column projection",
            PipelineStage::Flagged => "event flagging",
            PipelineStage::Saved => "save",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepDetail {
    Loaded {
        path: PathBuf,
        column_names: Vec<String>,
        encoding: String,
    },
    Cleaned {
        dropped_missing: usize,
        dropped_duplicates: usize,
    },
    Normalized {
        columns_converted: usize,
        coerced_cells: usize,
    },
    Projected {
        dropped_columns: Vec<String>,
    },
    Flagged {
        pollutant_column: String,
        threshold: f64,
        high_impact_rows: usize,
        null_rows: usize,
    },
    Saved {
        path: PathBuf,
    },
    SaveFailed {
        path: PathBuf,
        error: String,
    },
}

/// What one pipeline step did to the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub stage: PipelineStage,
    pub rows: usize,
    pub columns: usize,
    pub detail: StepDetail,
    pub warnings: Vec<String>,
}

impl StepReport {
    pub fn new(stage: PipelineStage, shape: (usize, usize), detail: StepDetail) -> Self {
        Self {
            stage,
            rows: shape.0,
            columns: shape.1,
            detail,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn line(&self) -> String {
        let detail = match &self.detail {
            StepDetail::Loaded {
                path,
                column_names,
                encoding,
            } => format!(
                "loaded {} ({}), columns: [{}]",
                path.display(),
                encoding,
                column_names.join(", ")
            ),
            StepDetail::Cleaned {
                dropped_missing,
                dropped_duplicates,
            } => format!(
                "dropped {} rows with missing critical values, {} duplicates",
                dropped_missing, dropped_duplicates
            ),
            StepDetail::Normalized {
                columns_converted,
                coerced_cells,
            } => format!(
                "converted {} columns to datetime, {} cells coerced to NaT",
                columns_converted, coerced_cells
            ),
            StepDetail::Projected { dropped_columns } => {
                format!("dropped {} columns", dropped_columns.len())
            }
            StepDetail::Flagged {
                pollutant_column,
                threshold,
                high_impact_rows,
                ..
            } => format!(
                "{} rows with {} > {}",
                high_impact_rows, pollutant_column, threshold
            ),
            StepDetail::Saved { path } => format!("saved to {}", path.display()),
            StepDetail::SaveFailed { path, error } => {
                format!("failed to save {}: {}", path.display(), error)
            }
        };

        format!(
            "{:<24} {:>7} rows x {:>3} cols  {}",
            self.stage.display_name(),
            self.rows,
            self.columns,
            detail
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Completed,
    InputMissing,
    SaveFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub status: PipelineStatus,
    pub steps: Vec<StepReport>,
}

impl PipelineReport {
    pub fn step(&self, stage: PipelineStage) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.stage == stage)
    }

    pub fn is_saved(&self) -> bool {
        self.status == PipelineStatus::Completed
    }

    pub fn high_impact_rows(&self) -> Option<usize> {
        self.steps.iter().find_map(|s| match s.detail {
            StepDetail::Flagged {
                high_impact_rows, ..
            } => Some(high_impact_rows),
            _ => None,
        })
    }

    pub fn warning_count(&self) -> usize {
        self.steps.iter().map(|s| s.warnings.len()).sum()
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Pipeline Report ===\n");
        for step in &self.steps {
            summary.push_str(&format!("{}\n", step.line()));
        }

        let status = match self.status {
            PipelineStatus::Completed => "completed",
            PipelineStatus::InputMissing => "halted: input file not found",
            PipelineStatus::SaveFailed => "finished without writing output",
        };
        summary.push_str(&format!("\nStatus: {}\n", status));

        let warnings = self.warning_count();
        if warnings > 0 {
            summary.push_str(&format!("Warnings: {}\n", warnings));
            for (i, warning) in self
                .steps
                .iter()
                .flat_map(|s| s.warnings.iter())
                .take(10)
                .enumerate()
            {
                summary.push_str(&format!("  {}. {}\n", i + 1, warning));
            }
        }

        summary
    }
}
