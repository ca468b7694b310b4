use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameRGBA};
use crate::foundation::error::{AutoframeError, AutoframeResult};

/// Sample rate used for the intermediate PCM audio track.
pub const AUDIO_SAMPLE_RATE: u32 = 48_000;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Optional external raw PCM audio file input.
    pub audio: Option<AudioInputConfig>,
    /// Exact output duration; longer inputs are cut to it.
    pub duration_sec: Option<f64>,
}

impl SinkConfig {
    pub fn validate(&self) -> AutoframeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(AutoframeError::validation(
                "sink width/height must be non-zero",
            ));
        }
        if let Some(d) = self.duration_sec
            && !(d.is_finite() && d > 0.0)
        {
            return Err(AutoframeError::validation("sink duration must be > 0"));
        }
        if let Some(audio) = self.audio.as_ref() {
            if audio.sample_rate == 0 {
                return Err(AutoframeError::validation(
                    "audio sample_rate must be non-zero when audio is enabled",
                ));
            }
            if audio.channels == 0 {
                return Err(AutoframeError::validation(
                    "audio channels must be non-zero when audio is enabled",
                ));
            }
        }
        Ok(())
    }
}

/// Raw PCM audio input configuration for sinks that support audio encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Sink contract for consuming reframed frames in presentation order.
///
/// `push_frame` is called with strictly increasing indices. After a failure the caller invokes
/// `abort` instead of `end`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> AutoframeResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> AutoframeResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> AutoframeResult<()>;
    /// Discard any partially written output.
    fn abort(&mut self) {}
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(u64, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    pub fn frames(&self) -> &[(u64, FrameRGBA)] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> AutoframeResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> AutoframeResult<()> {
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(AutoframeError::validation(
                "sink received out-of-order frame index",
            ));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> AutoframeResult<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
