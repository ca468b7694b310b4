use std::path::Path;

use crate::config::EncoderSettings;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{AudioInputConfig, FrameSink};
use crate::foundation::core::Fps;
use crate::foundation::error::AutoframeResult;
use crate::media::audio::extract_audio_pcm;
use crate::media::decode::{ClipSource, FfmpegClipSource};
use crate::media::probe::{ClipInfo, probe_clip};

/// Everything the render pipeline needs from a media backend.
///
/// The ffmpeg implementation is the production one; tests substitute synthetic toolkits.
pub trait MediaToolkit: Send + Sync {
    /// Read metadata for the clip at `path`.
    fn probe(&self, path: &Path) -> AutoframeResult<ClipInfo>;

    /// Open a decoder that yields frames in stored orientation at `fps`.
    fn open_clip(&self, info: &ClipInfo, fps: Fps) -> AutoframeResult<Box<dyn ClipSource>>;

    /// Extract the source audio track to raw PCM at `dest`.
    fn extract_audio(&self, info: &ClipInfo, dest: &Path) -> AutoframeResult<AudioInputConfig>;

    /// Create a sink writing an encoded clip to `out_path`.
    fn clip_writer(
        &self,
        out_path: &Path,
        encoder: &EncoderSettings,
    ) -> AutoframeResult<Box<dyn FrameSink>>;
}

/// [`MediaToolkit`] backed by the system `ffmpeg`/`ffprobe` binaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegToolkit;

impl MediaToolkit for FfmpegToolkit {
    fn probe(&self, path: &Path) -> AutoframeResult<ClipInfo> {
        probe_clip(path)
    }

    fn open_clip(&self, info: &ClipInfo, fps: Fps) -> AutoframeResult<Box<dyn ClipSource>> {
        Ok(Box::new(FfmpegClipSource::open(info, fps)?))
    }

    fn extract_audio(&self, info: &ClipInfo, dest: &Path) -> AutoframeResult<AudioInputConfig> {
        extract_audio_pcm(&info.source_path, dest)
    }

    fn clip_writer(
        &self,
        out_path: &Path,
        encoder: &EncoderSettings,
    ) -> AutoframeResult<Box<dyn FrameSink>> {
        Ok(Box::new(FfmpegSink::new(FfmpegSinkOpts::new(
            out_path, encoder,
        ))))
    }
}
