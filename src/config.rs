//! Runtime configuration.
//!
//! Every value has a default and can be overridden through the environment (a `.env` file is
//! honoured by the CLI through `dotenvy`).

use std::path::PathBuf;

use crate::foundation::core::Fps;
use crate::foundation::error::{AutoframeError, AutoframeResult};

/// Settings handed to the output encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    pub video_codec: String,
    pub audio_codec: String,
    /// Speed/quality preset (`veryfast` favours throughput).
    pub preset: String,
    /// Encoder threads; `0` leaves the choice to the encoder.
    pub threads: usize,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "veryfast".to_string(),
            threads: default_threads(),
        }
    }
}

/// Gaussian parameters for the letterbox background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurSettings {
    /// Kernel half-width; about `3 * sigma` keeps the tails.
    pub radius_px: u32,
    /// Standard deviation in pixels.
    pub sigma: f32,
}

impl Default for BlurSettings {
    fn default() -> Self {
        Self {
            radius_px: 48,
            sigma: 16.0,
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AutoframeConfig {
    /// Root directory for per-job output folders.
    pub output_dir: PathBuf,
    /// Longest accepted source clip, in seconds.
    pub max_duration_sec: u32,
    /// Most files accepted in one batch.
    pub max_batch_size: usize,
    /// Most ratios rendered per file.
    pub max_ratios_per_batch: usize,
    /// Frame rate used when a source reports none.
    pub fallback_fps: u32,
    pub encoder: EncoderSettings,
    pub blur: BlurSettings,
}

impl Default for AutoframeConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            max_duration_sec: 180,
            max_batch_size: 10,
            max_ratios_per_batch: 3,
            fallback_fps: 30,
            encoder: EncoderSettings::default(),
            blur: BlurSettings::default(),
        }
    }
}

impl AutoframeConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            output_dir: text("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            max_duration_sec: parse_var(&lookup, "MAX_SERVER_DURATION_SECONDS")
                .unwrap_or(defaults.max_duration_sec),
            max_batch_size: parse_var(&lookup, "MAX_BATCH_SIZE").unwrap_or(defaults.max_batch_size),
            max_ratios_per_batch: parse_var(&lookup, "MAX_RATIOS_PER_BATCH")
                .unwrap_or(defaults.max_ratios_per_batch),
            fallback_fps: parse_var(&lookup, "FALLBACK_FPS").unwrap_or(defaults.fallback_fps),
            encoder: EncoderSettings {
                video_codec: text("VIDEO_CODEC").unwrap_or(defaults.encoder.video_codec),
                audio_codec: text("AUDIO_CODEC").unwrap_or(defaults.encoder.audio_codec),
                preset: lookup("ENCODER_PRESET")
                    .map(|s| s.trim().to_string())
                    .unwrap_or(defaults.encoder.preset),
                threads: parse_var(&lookup, "ENCODER_THREADS").unwrap_or(defaults.encoder.threads),
            },
            blur: BlurSettings {
                radius_px: parse_var(&lookup, "BLUR_RADIUS_PX").unwrap_or(defaults.blur.radius_px),
                sigma: parse_var(&lookup, "BLUR_SIGMA").unwrap_or(defaults.blur.sigma),
            },
        }
    }

    pub fn validate(&self) -> AutoframeResult<()> {
        if self.max_duration_sec == 0 {
            return Err(AutoframeError::validation(
                "MAX_SERVER_DURATION_SECONDS must be > 0",
            ));
        }
        if self.max_batch_size == 0 {
            return Err(AutoframeError::validation("MAX_BATCH_SIZE must be > 0"));
        }
        if self.max_ratios_per_batch == 0 {
            return Err(AutoframeError::validation(
                "MAX_RATIOS_PER_BATCH must be > 0",
            ));
        }
        if self.fallback_fps == 0 {
            return Err(AutoframeError::validation("FALLBACK_FPS must be > 0"));
        }
        if !self.blur.sigma.is_finite() || self.blur.sigma <= 0.0 {
            return Err(AutoframeError::validation("BLUR_SIGMA must be > 0"));
        }
        if self.encoder.video_codec.is_empty() || self.encoder.audio_codec.is_empty() {
            return Err(AutoframeError::validation("codec names must not be empty"));
        }
        Ok(())
    }

    pub fn fallback_fps(&self) -> AutoframeResult<Fps> {
        Fps::from_whole(self.fallback_fps)
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|s| s.trim().parse().ok())
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
