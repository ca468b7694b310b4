//! Multi-ratio render passes and job progress.

pub mod orchestrator;
pub mod progress;

pub use orchestrator::{NamingState, RenderOrchestrator, RenderOutput};
pub use progress::{InMemoryProgressStore, ProgressEntry, ProgressStatus, ProgressStore};
