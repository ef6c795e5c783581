pub mod config;
pub mod report;
pub mod table;
pub mod value;

pub use self::config::PipelineConfig;
pub use report::{PipelineReport, PipelineStage, PipelineStatus, StepDetail, StepReport};
pub use table::Table;
pub use value::{ColumnKind, Value};
