pub mod columns;
pub mod crosscheck;
pub mod export;
pub mod forces;
pub mod summary;

pub use columns::{ColumnSchema, SU2_DEFAULT_COLUMNS};
pub use crosscheck::{
    CrossCheckEntry, CrossCheckReport, CrossCheckStatus, CrossCheckTarget, crosscheck,
};
pub use export::{normalize_text_artifact, write_delimited, write_delimited_file};
pub use forces::{ForcesBreakdown, find_labeled_value};
pub use summary::{
    ConvergenceSummary, IterationSample, LiftDragColumns, LiftDragRatio, NamedColumnStats,
    ResidualReduction, SummaryRequest,
};
