//! Batch processing on top of the render orchestrator: summaries, per-file passes and bundles.

pub mod bundle;
pub mod process;
pub mod summary;

pub use bundle::{bundle_filename, write_bundle, write_bundle_file};
pub use process::{
    BatchFile, BatchProcessor, BatchReport, BatchRequest, FileError, FileResult,
    parse_base_overrides, validate_batch,
};
pub use summary::{BatchSummary, FsSummaryStore, SummaryEntry, SummaryStore};
