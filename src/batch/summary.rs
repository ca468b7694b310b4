use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::foundation::error::AutoframeResult;
use crate::naming::policy::NamingPolicy;

/// File name of the per-job summary inside the job's output directory.
pub const SUMMARY_FILENAME: &str = "batch_summary.json";

/// What one source file contributed to a batch.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SummaryEntry {
    pub original_name: String,
    pub display_name: String,
    /// Friendly style label.
    pub style: String,
    /// Ratio keys as requested.
    pub ratios: Vec<String>,
    pub ratio_labels: Vec<String>,
    /// Output filenames, in render order.
    pub outputs: Vec<String>,
}

/// Persisted state of one batch.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BatchSummary {
    #[serde(default)]
    pub videos: Vec<SummaryEntry>,
    /// Naming policy fixed by the first file of the batch.
    #[serde(default, deserialize_with = "lenient_policy")]
    pub config: Option<NamingPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl BatchSummary {
    /// Outputs recorded so far across every file; the next file's sequence numbers continue
    /// from here.
    pub fn output_count(&self) -> usize {
        self.videos.iter().map(|v| v.outputs.len()).sum()
    }

    pub fn policy(&self) -> Option<&NamingPolicy> {
        self.config.as_ref()
    }
}

// An empty or outdated `config` object reads as "no policy yet" instead of failing the load.
fn lenient_policy<'de, D>(deserializer: D) -> Result<Option<NamingPolicy>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Append-only store of batch summaries, keyed by job id.
pub trait SummaryStore: Send + Sync {
    /// Current summary; a job with nothing recorded yields an empty summary.
    fn load(&self, job_id: &str) -> AutoframeResult<BatchSummary>;

    /// Record `entry`, replacing the stored policy when one is given.
    fn append(
        &self,
        job_id: &str,
        entry: SummaryEntry,
        policy: Option<&NamingPolicy>,
    ) -> AutoframeResult<BatchSummary>;
}

/// [`SummaryStore`] writing `<root>/<job_id>/batch_summary.json`.
#[derive(Clone, Debug)]
pub struct FsSummaryStore {
    root: PathBuf,
}

impl FsSummaryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn job_dir(&self, job_id: &str) -> PathBuf {
        self.root.join(job_id)
    }

    pub fn summary_path(&self, job_id: &str) -> PathBuf {
        self.job_dir(job_id).join(SUMMARY_FILENAME)
    }
}

impl SummaryStore for FsSummaryStore {
    fn load(&self, job_id: &str) -> AutoframeResult<BatchSummary> {
        let path = self.summary_path(job_id);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BatchSummary::default());
            }
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&text) {
            Ok(summary) => Ok(summary),
            Err(e) => {
                tracing::warn!(job_id, error = %e, "failed to parse batch summary, starting fresh");
                Ok(BatchSummary::default())
            }
        }
    }

    fn append(
        &self,
        job_id: &str,
        entry: SummaryEntry,
        policy: Option<&NamingPolicy>,
    ) -> AutoframeResult<BatchSummary> {
        let mut summary = self.load(job_id)?;
        summary.videos.push(entry);
        if let Some(policy) = policy {
            summary.config = Some(policy.clone());
        }
        summary.updated_at = Some(Utc::now());

        let dir = self.job_dir(job_id);
        std::fs::create_dir_all(&dir)?;
        write_atomically(&self.summary_path(job_id), &serde_json::to_vec_pretty(&summary)?)?;
        Ok(summary)
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> AutoframeResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/batch/summary.rs"]
mod tests;
