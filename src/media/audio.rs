use std::path::Path;

use crate::encode::sink::{AUDIO_SAMPLE_RATE, AudioInputConfig};
use crate::foundation::error::{AutoframeError, AutoframeResult};

/// Channel count of the intermediate PCM track.
pub const AUDIO_CHANNELS: u16 = 2;

pub(crate) fn extract_args(source: &Path, dest: &Path) -> Vec<String> {
    let mut args: Vec<String> = ["-v", "error", "-nostdin", "-y", "-i"]
        .map(String::from)
        .to_vec();
    args.push(source.to_string_lossy().into_owned());
    args.extend(
        [
            "-vn",
            "-map",
            "0:a:0",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
        ]
        .map(String::from),
    );
    args.push(AUDIO_CHANNELS.to_string());
    args.push("-ar".to_string());
    args.push(AUDIO_SAMPLE_RATE.to_string());
    args.push(dest.to_string_lossy().into_owned());
    args
}

/// Decode the first audio stream of `source` to interleaved stereo `f32le` PCM at `dest`.
#[tracing::instrument(skip_all, fields(source = %source.display()))]
pub fn extract_audio_pcm(source: &Path, dest: &Path) -> AutoframeResult<AudioInputConfig> {
    let out = std::process::Command::new("ffmpeg")
        .args(extract_args(source, dest))
        .output()
        .map_err(|e| {
            AutoframeError::media(format!("failed to run ffmpeg for audio decode: {e}"))
        })?;

    if !out.status.success() {
        return Err(AutoframeError::media(format!(
            "ffmpeg audio decode failed for '{}': {}",
            source.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let len = std::fs::metadata(dest)?.len();
    if !len.is_multiple_of(4) {
        return Err(AutoframeError::media(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }

    Ok(AudioInputConfig {
        path: dest.to_path_buf(),
        sample_rate: AUDIO_SAMPLE_RATE,
        channels: AUDIO_CHANNELS,
    })
}
