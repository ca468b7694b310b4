use std::collections::HashMap;
use std::sync::RwLock;

/// Lifecycle state of a job's render pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Processing,
    Done,
    Error,
}

/// Progress of one job, in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProgressEntry {
    pub progress: f64,
    pub status: ProgressStatus,
}

/// Shared job progress, keyed by job id.
///
/// Implementations must be safe to use from several render threads working on different jobs.
pub trait ProgressStore: Send + Sync {
    fn set(&self, job_id: &str, entry: ProgressEntry);
    /// `None` when the job has no entry.
    fn get(&self, job_id: &str) -> Option<ProgressEntry>;
    fn clear(&self, job_id: &str);
}

/// Process-local [`ProgressStore`].
#[derive(Debug, Default)]
pub struct InMemoryProgressStore {
    entries: RwLock<HashMap<String, ProgressEntry>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn set(&self, job_id: &str, entry: ProgressEntry) {
        match self.entries.write() {
            Ok(mut map) => {
                map.insert(job_id.to_string(), entry);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(job_id.to_string(), entry);
            }
        }
    }

    fn get(&self, job_id: &str) -> Option<ProgressEntry> {
        match self.entries.read() {
            Ok(map) => map.get(job_id).copied(),
            Err(poisoned) => poisoned.into_inner().get(job_id).copied(),
        }
    }

    fn clear(&self, job_id: &str) {
        match self.entries.write() {
            Ok(mut map) => {
                map.remove(job_id);
            }
            Err(poisoned) => {
                poisoned.into_inner().remove(job_id);
            }
        }
    }
}

/// Record progress for `job_id`, clamping `fraction` into `[0, 1]`.
pub fn update_job_progress(
    store: &dyn ProgressStore,
    job_id: &str,
    fraction: f64,
    status: ProgressStatus,
) {
    let progress = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    store.set(job_id, ProgressEntry { progress, status });
}

pub fn clear_job_progress(store: &dyn ProgressStore, job_id: &str) {
    store.clear(job_id);
}

/// Maps per-frame encode callbacks of a multi-ratio pass onto one overall fraction:
/// `(ratio_index + frames_written / frames_total) / ratio_count`.
#[derive(Clone, Copy, Debug)]
pub struct RatioProgress {
    pub ratio_index: usize,
    pub ratio_count: usize,
}

impl RatioProgress {
    pub fn new(ratio_index: usize, ratio_count: usize) -> Self {
        Self {
            ratio_index,
            ratio_count,
        }
    }

    pub fn overall(&self, frames_written: u64, frames_total: u64) -> f64 {
        let count = self.ratio_count.max(1) as f64;
        let within = if frames_total == 0 {
            1.0
        } else {
            (frames_written.min(frames_total) as f64) / (frames_total as f64)
        };
        (self.ratio_index as f64 + within) / count
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/progress.rs"]
mod tests;
