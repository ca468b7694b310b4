use std::path::Path;
use std::sync::Arc;

use crate::catalog::{AspectKey, StyleKind};
use crate::config::AutoframeConfig;
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::Fps;
use crate::foundation::error::{AutoframeError, AutoframeResult};
use crate::media::probe::ClipInfo;
use crate::media::toolkit::MediaToolkit;
use crate::naming::filename::{BaseNameInfo, generate_output_filename};
use crate::naming::policy::NamingPolicy;
use crate::render::progress::{ProgressStatus, ProgressStore, RatioProgress, update_job_progress};
use crate::transform::engine::ReframedClip;

/// Extension of every rendered output.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Naming inputs for one source file's render pass.
#[derive(Clone, Copy, Debug)]
pub struct NamingState<'a> {
    pub policy: &'a NamingPolicy,
    pub base_info: &'a BaseNameInfo,
    /// Outputs already produced earlier in the batch; the first output here gets
    /// `sequence_start + 1`.
    pub sequence_start: u32,
}

/// One rendered variant.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderOutput {
    pub aspect_key: AspectKey,
    pub style: StyleKind,
    pub filename: String,
    /// Ratio label as rendered into the filename.
    pub ratio_label: String,
    /// Human-readable label, e.g. `9:16 Portrait • Fill & crop`.
    pub label: String,
    pub sequence: u32,
    /// Location of the file relative to the output root (`<job_id>/<filename>`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_ref: Option<String>,
}

/// Push every frame of `clip` into `sink`, reporting `(frames_written, frames_total)` after each.
///
/// Returns the number of frames written. On error the sink is left for the caller to abort.
pub fn encode_clip(
    clip: &mut ReframedClip,
    sink: &mut dyn FrameSink,
    audio: Option<AudioInputConfig>,
    on_frame: &mut dyn FnMut(u64, u64),
) -> AutoframeResult<u64> {
    let size = clip.size();
    sink.begin(SinkConfig {
        width: size.width,
        height: size.height,
        fps: clip.fps(),
        audio,
        duration_sec: Some(clip.duration_sec()),
    })?;

    let total = clip.frame_total();
    let mut written = 0u64;
    while let Some(frame) = clip.next_frame()? {
        sink.push_frame(written, &frame)?;
        written += 1;
        on_frame(written, total);
    }
    sink.end()?;
    Ok(written)
}

/// Renders every requested ratio of one source clip.
///
/// Cheap to clone; the toolkit and progress store are shared.
#[derive(Clone)]
pub struct RenderOrchestrator {
    toolkit: Arc<dyn MediaToolkit>,
    progress: Arc<dyn ProgressStore>,
    config: AutoframeConfig,
}

impl RenderOrchestrator {
    pub fn new(
        toolkit: Arc<dyn MediaToolkit>,
        progress: Arc<dyn ProgressStore>,
        config: AutoframeConfig,
    ) -> Self {
        Self {
            toolkit,
            progress,
            config,
        }
    }

    pub fn config(&self) -> &AutoframeConfig {
        &self.config
    }

    pub fn toolkit(&self) -> &dyn MediaToolkit {
        self.toolkit.as_ref()
    }

    pub fn progress(&self) -> &dyn ProgressStore {
        self.progress.as_ref()
    }

    /// Fail with [`AutoframeError::ClipTooLong`] when `info` exceeds the configured maximum.
    pub fn check_duration(&self, info: &ClipInfo) -> AutoframeResult<()> {
        if info.duration_sec > f64::from(self.config.max_duration_sec) {
            return Err(AutoframeError::clip_too_long(
                info.duration_sec,
                self.config.max_duration_sec,
            ));
        }
        Ok(())
    }

    /// Probe `input` and reject it when it is over the duration limit.
    ///
    /// Touches no progress state, so a rejected clip never shows up as a failed render.
    pub fn probe_source(&self, input: &Path) -> AutoframeResult<ClipInfo> {
        let info = self.toolkit.probe(input)?;
        self.check_duration(&info)?;
        Ok(info)
    }

    /// Render `input` once per known key in `ratios`, in order, into `output_dir`.
    ///
    /// Unknown ratio keys are skipped. The first failing ratio marks the job as errored and aborts
    /// the remaining ones; outputs already written stay on disk.
    #[tracing::instrument(skip(self, ratios, naming), fields(input = %input.display(), style = %style))]
    pub fn render_variants(
        &self,
        input: &Path,
        output_dir: &Path,
        style: StyleKind,
        job_id: &str,
        ratios: &[String],
        naming: &NamingState<'_>,
    ) -> AutoframeResult<Vec<RenderOutput>> {
        let info = self.probe_source(input)?;
        self.render_probed(&info, output_dir, style, job_id, ratios, naming)
    }

    /// [`Self::render_variants`] for a clip already accepted by [`Self::probe_source`].
    pub fn render_probed(
        &self,
        info: &ClipInfo,
        output_dir: &Path,
        style: StyleKind,
        job_id: &str,
        ratios: &[String],
        naming: &NamingState<'_>,
    ) -> AutoframeResult<Vec<RenderOutput>> {
        let keys: Vec<AspectKey> = ratios
            .iter()
            .filter_map(|r| {
                let key = AspectKey::parse(r);
                if key.is_none() {
                    tracing::warn!(ratio = %r, "skipping unknown ratio key");
                }
                key
            })
            .collect();

        let result = self.source_fps(info).and_then(|fps| {
            self.render_keys(info, fps, output_dir, style, job_id, &keys, naming)
        });
        match result {
            Ok(outputs) => {
                update_job_progress(self.progress(), job_id, 1.0, ProgressStatus::Done);
                tracing::info!(outputs = outputs.len(), "render pass finished");
                Ok(outputs)
            }
            Err(e) => {
                update_job_progress(self.progress(), job_id, 1.0, ProgressStatus::Error);
                Err(e)
            }
        }
    }

    fn source_fps(&self, info: &ClipInfo) -> AutoframeResult<Fps> {
        match info.fps {
            Some(fps) => Ok(fps),
            None => {
                tracing::debug!("source reports no frame rate, using fallback");
                self.config.fallback_fps()
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_keys(
        &self,
        info: &ClipInfo,
        fps: Fps,
        output_dir: &Path,
        style: StyleKind,
        job_id: &str,
        keys: &[AspectKey],
        naming: &NamingState<'_>,
    ) -> AutoframeResult<Vec<RenderOutput>> {
        std::fs::create_dir_all(output_dir)?;

        // Held until the pass ends; the temp file is removed on drop on every path.
        let audio_file = if info.has_audio {
            let tmp = tempfile::Builder::new()
                .prefix("autoframe-audio-")
                .suffix(".f32")
                .tempfile()?;
            let cfg = self.toolkit.extract_audio(info, tmp.path())?;
            Some((tmp, cfg))
        } else {
            None
        };
        let audio = audio_file.as_ref().map(|(_, cfg)| cfg);

        let mut outputs: Vec<RenderOutput> = Vec::with_capacity(keys.len());
        for (idx, &key) in keys.iter().enumerate() {
            let sequence = naming.sequence_start + outputs.len() as u32 + 1;
            let name = generate_output_filename(
                naming.base_info,
                key,
                style,
                naming.policy,
                Some(sequence),
                OUTPUT_EXTENSION,
                output_dir,
            );
            let out_path = output_dir.join(&name.filename);

            let ratio_progress = RatioProgress::new(idx, keys.len());
            update_job_progress(
                self.progress(),
                job_id,
                ratio_progress.overall(0, 1),
                ProgressStatus::Processing,
            );
            let mut on_frame = |written: u64, total: u64| {
                update_job_progress(
                    self.progress(),
                    job_id,
                    ratio_progress.overall(written, total),
                    ProgressStatus::Processing,
                );
            };

            self.write_variant(info, fps, key, style, &out_path, audio, &mut on_frame)?;
            tracing::info!(file = %name.filename, ratio = %key, "wrote variant");

            let target = key.target();
            outputs.push(RenderOutput {
                aspect_key: key,
                style,
                ratio_label: name.ratio_token().to_string(),
                label: format!("{} • {}", target.label, style.label()),
                sequence,
                download_ref: Some(format!("{job_id}/{}", name.filename)),
                filename: name.filename,
            });
        }
        Ok(outputs)
    }

    #[allow(clippy::too_many_arguments)]
    fn write_variant(
        &self,
        info: &ClipInfo,
        fps: Fps,
        key: AspectKey,
        style: StyleKind,
        out_path: &Path,
        audio: Option<&AudioInputConfig>,
        on_frame: &mut dyn FnMut(u64, u64),
    ) -> AutoframeResult<()> {
        let source = self.toolkit.open_clip(info, fps)?;
        let mut clip = ReframedClip::new(source, key.target().size, style, fps, self.config.blur);
        let mut sink = match self.toolkit.clip_writer(out_path, &self.config.encoder) {
            Ok(sink) => sink,
            Err(e) => {
                let _ = clip.close();
                return Err(e);
            }
        };

        let encoded = encode_clip(&mut clip, sink.as_mut(), audio.cloned(), on_frame);
        let closed = clip.close();
        match encoded {
            Ok(_) => closed,
            Err(e) => {
                sink.abort();
                remove_partial_output(out_path);
                Err(e)
            }
        }
    }
}

fn remove_partial_output(path: &Path) {
    if path.exists()
        && let Err(e) = std::fs::remove_file(path)
    {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove partial output");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/orchestrator.rs"]
mod tests;
