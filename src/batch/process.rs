use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::batch::summary::{SummaryEntry, SummaryStore};
use crate::catalog::{AspectKey, StyleKind};
use crate::foundation::error::{AutoframeError, AutoframeResult};
use crate::naming::filename::prepare_base_info;
use crate::naming::policy::{NamingForm, NamingPolicy, build_naming_config, today_stamp};
use crate::naming::sanitize::{is_video_extension, secure_original_name, split_extension};
use crate::render::orchestrator::{NamingState, RenderOrchestrator, RenderOutput};
use crate::render::progress::{ProgressStatus, clear_job_progress, update_job_progress};

/// A source file to process: where it lives and the name the user gave it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchFile {
    pub path: PathBuf,
    pub original_name: String,
}

impl BatchFile {
    /// Use the file's own name as its original name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let original_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            original_name,
        }
    }
}

/// Everything a caller submits for one batch.
#[derive(Clone, Debug, Default)]
pub struct BatchRequest {
    /// Existing batch to extend; a fresh id is generated when `None`.
    pub job_id: Option<String>,
    pub files: Vec<BatchFile>,
    pub style: String,
    pub ratios: Vec<String>,
    pub naming: NamingForm,
    /// Base-name overrides keyed by original (or secured) filename.
    pub base_overrides: HashMap<String, String>,
}

/// Per-file result of a successful render pass.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FileResult {
    pub original_name: String,
    pub display_name: String,
    pub style_label: String,
    pub selected_ratios: Vec<String>,
    pub ratio_labels: Vec<String>,
    pub outputs: Vec<RenderOutput>,
}

/// A file that failed without aborting its siblings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileError {
    pub file: String,
    pub message: String,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct BatchReport {
    pub job_id: String,
    pub style: StyleKind,
    pub ratios: Vec<String>,
    pub policy: NamingPolicy,
    pub results: Vec<FileResult>,
    pub errors: Vec<FileError>,
    /// Files rejected for exceeding the duration limit.
    pub too_long: Vec<String>,
}

impl BatchReport {
    pub fn output_count(&self) -> usize {
        self.results.iter().map(|r| r.outputs.len()).sum()
    }
}

/// Generate an id for a new batch.
pub fn new_job_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Job ids name output directories, so only `[A-Za-z0-9_-]` is accepted.
pub fn validate_job_id(job_id: &str) -> AutoframeResult<()> {
    let ok = !job_id.is_empty()
        && job_id.len() <= 64
        && job_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));
    if ok {
        Ok(())
    } else {
        Err(AutoframeError::validation(format!(
            "invalid job id '{job_id}'"
        )))
    }
}

/// Parse a JSON object of `original filename -> base name`.
///
/// Anything that is not such an object yields an empty map; blank names are dropped.
pub fn parse_base_overrides(raw: Option<&str>) -> HashMap<String, String> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return HashMap::new();
    };
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unparseable base overrides");
            return HashMap::new();
        }
    };
    let Some(map) = value.as_object() else {
        tracing::warn!("ignoring base overrides that are not a JSON object");
        return HashMap::new();
    };
    map.iter()
        .filter_map(|(k, v)| {
            let name = v.as_str()?.trim();
            (!name.is_empty()).then(|| (k.clone(), name.to_string()))
        })
        .collect()
}

/// Whether `name` carries one of the accepted video extensions.
pub fn allowed_file(name: &str) -> bool {
    let (_, ext) = split_extension(name);
    is_video_extension(ext)
}

/// Validated, normalized batch parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedBatch {
    pub job_id: String,
    pub style: StyleKind,
    /// Known ratio keys, at most the configured maximum.
    pub ratios: Vec<String>,
    pub files: Vec<BatchFile>,
}

/// Check a request against the batch limits before any work starts.
pub fn validate_batch(
    request: &BatchRequest,
    max_batch_size: usize,
    max_ratios: usize,
) -> AutoframeResult<ValidatedBatch> {
    let files: Vec<BatchFile> = request
        .files
        .iter()
        .filter(|f| !f.original_name.trim().is_empty())
        .cloned()
        .collect();
    if files.is_empty() {
        return Err(AutoframeError::validation(
            "select at least one video before submitting",
        ));
    }
    if files.len() > max_batch_size {
        return Err(AutoframeError::validation(format!(
            "you can upload up to {max_batch_size} videos per batch"
        )));
    }
    let unsupported: Vec<&str> = files
        .iter()
        .filter(|f| !allowed_file(&f.original_name))
        .map(|f| f.original_name.as_str())
        .collect();
    if !unsupported.is_empty() {
        return Err(AutoframeError::validation(format!(
            "unsupported formats detected: {}",
            unsupported.join(", ")
        )));
    }

    let mut ratios: Vec<String> = request
        .ratios
        .iter()
        .map(|r| r.trim())
        .filter(|r| AspectKey::parse(r).is_some())
        .map(str::to_string)
        .collect();
    if ratios.is_empty() {
        return Err(AutoframeError::validation(
            "select at least one output aspect ratio",
        ));
    }
    if ratios.len() > max_ratios {
        tracing::warn!(requested = ratios.len(), max = max_ratios, "truncating ratio list");
        ratios.truncate(max_ratios);
    }

    let job_id = match request.job_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => {
            validate_job_id(id)?;
            id.to_string()
        }
        _ => new_job_id(),
    };

    Ok(ValidatedBatch {
        job_id,
        style: StyleKind::parse_or_default(&request.style),
        ratios,
        files,
    })
}

/// Runs whole batches: naming resolution, per-file render passes and summary bookkeeping.
#[derive(Clone)]
pub struct BatchProcessor {
    orchestrator: RenderOrchestrator,
    summaries: Arc<dyn SummaryStore>,
}

impl BatchProcessor {
    pub fn new(orchestrator: RenderOrchestrator, summaries: Arc<dyn SummaryStore>) -> Self {
        Self {
            orchestrator,
            summaries,
        }
    }

    pub fn orchestrator(&self) -> &RenderOrchestrator {
        &self.orchestrator
    }

    /// Resolve the batch's naming policy, inheriting whatever an earlier submission fixed.
    pub fn resolve_naming_policy(
        &self,
        job_id: &str,
        form: Option<&NamingForm>,
    ) -> AutoframeResult<NamingPolicy> {
        let summary = self.summaries.load(job_id)?;
        Ok(build_naming_config(
            summary.policy(),
            form,
            &today_stamp(),
        ))
    }

    /// Render one file for every ratio and record it in the batch summary.
    #[tracing::instrument(skip(self, ratios, policy, base_override), fields(file = %file.original_name))]
    pub fn process_video_file(
        &self,
        file: &BatchFile,
        style: StyleKind,
        job_id: &str,
        ratios: &[String],
        policy: &NamingPolicy,
        base_override: Option<&str>,
    ) -> AutoframeResult<FileResult> {
        let original_name =
            secure_original_name(&file.original_name).ok_or(AutoframeError::MissingFilename)?;

        let summary = self.summaries.load(job_id)?;
        let base_info = prepare_base_info(&file.original_name, base_override, policy);
        let naming = NamingState {
            policy,
            base_info: &base_info,
            sequence_start: summary.output_count() as u32,
        };

        // Duration rejections are reported to the caller only, never as a failed render.
        let progress = self.orchestrator.progress();
        let info = match self.orchestrator.probe_source(&file.path) {
            Ok(info) => info,
            Err(e) => {
                if !matches!(e, AutoframeError::ClipTooLong { .. }) {
                    update_job_progress(progress, job_id, 1.0, ProgressStatus::Error);
                }
                return Err(e);
            }
        };
        update_job_progress(progress, job_id, 0.0, ProgressStatus::Processing);

        // The orchestrator marks the job as errored when a ratio fails.
        let output_dir = self.orchestrator.config().output_dir.join(job_id);
        let outputs = self.orchestrator.render_probed(
            &info,
            &output_dir,
            style,
            job_id,
            ratios,
            &naming,
        )?;

        let mut ratio_labels: Vec<String> = Vec::new();
        for output in &outputs {
            if !output.ratio_label.is_empty() && !ratio_labels.contains(&output.ratio_label) {
                ratio_labels.push(output.ratio_label.clone());
            }
        }
        if ratio_labels.is_empty() {
            ratio_labels = ratios
                .iter()
                .filter_map(|r| AspectKey::parse(r))
                .map(|k| k.target().short.to_string())
                .collect();
        }

        let entry = SummaryEntry {
            original_name: original_name.clone(),
            display_name: base_info.base_clean.clone(),
            style: style.label().to_string(),
            ratios: ratios.to_vec(),
            ratio_labels: ratio_labels.clone(),
            outputs: outputs.iter().map(|o| o.filename.clone()).collect(),
        };
        self.summaries.append(job_id, entry, Some(policy))?;
        clear_job_progress(progress, job_id);

        Ok(FileResult {
            original_name,
            display_name: base_info.base_clean,
            style_label: style.label().to_string(),
            selected_ratios: ratios.to_vec(),
            ratio_labels,
            outputs,
        })
    }

    /// Validate and process a batch. Per-file failures are collected, never propagated.
    #[tracing::instrument(skip_all, fields(files = request.files.len()))]
    pub fn process_batch(&self, request: &BatchRequest) -> AutoframeResult<BatchReport> {
        let config = self.orchestrator.config();
        let batch = validate_batch(request, config.max_batch_size, config.max_ratios_per_batch)?;
        let policy = self.resolve_naming_policy(&batch.job_id, Some(&request.naming))?;
        tracing::info!(job_id = %batch.job_id, style = %batch.style, "processing batch");

        let mut report = BatchReport {
            job_id: batch.job_id.clone(),
            style: batch.style,
            ratios: batch.ratios.clone(),
            policy: policy.clone(),
            results: Vec::new(),
            errors: Vec::new(),
            too_long: Vec::new(),
        };

        for file in &batch.files {
            let override_name = request
                .base_overrides
                .get(&file.original_name)
                .or_else(|| {
                    secure_original_name(&file.original_name)
                        .and_then(|secured| request.base_overrides.get(&secured))
                })
                .map(String::as_str);

            match self.process_video_file(
                file,
                batch.style,
                &batch.job_id,
                &batch.ratios,
                &policy,
                override_name,
            ) {
                Ok(result) => report.results.push(result),
                Err(e @ AutoframeError::ClipTooLong { .. }) => {
                    tracing::warn!(file = %file.original_name, error = %e, "clip rejected");
                    report.too_long.push(file.original_name.clone());
                }
                Err(e) => {
                    tracing::warn!(file = %file.original_name, error = %e, "video rendering failed");
                    report.errors.push(FileError {
                        file: file.original_name.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        if report.results.is_empty() && report.errors.is_empty() {
            tracing::warn!(job_id = %report.job_id, "nothing was rendered");
        }
        Ok(report)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/process.rs"]
mod tests;
