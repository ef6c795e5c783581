pub mod cleaner;
pub mod column_projector;
pub mod datetime_normalizer;
pub mod event_flagger;
pub mod pipeline;

pub use cleaner::Cleaner;
pub use column_projector::ColumnProjector;
pub use datetime_normalizer::DatetimeNormalizer;
pub use event_flagger::EventFlagger;
pub use pipeline::{Pipeline, PipelineOutput};
