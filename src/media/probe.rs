use std::path::{Path, PathBuf};

use crate::foundation::core::{Fps, PixelSize};
use crate::foundation::error::{AutoframeError, AutoframeResult};

/// Clockwise rotation a player applies when displaying the stored frames.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Normalize clockwise degrees (any sign) to a quarter turn; other angles map to `None`.
    pub fn from_degrees_cw(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            90 => Self::Cw90,
            180 => Self::Cw180,
            270 => Self::Cw270,
            _ => Self::None,
        }
    }

    pub fn degrees_cw(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Cw90 => 90,
            Self::Cw180 => 180,
            Self::Cw270 => 270,
        }
    }

    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Cw90 | Self::Cw270)
    }

    /// Size of a frame of `size` once rotated.
    pub fn apply_to_size(self, size: PixelSize) -> PixelSize {
        if self.swaps_dimensions() {
            size.transposed()
        } else {
            size
        }
    }
}

/// Metadata about a source clip.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipInfo {
    pub source_path: PathBuf,
    /// Stored (pre-rotation) width in pixels.
    pub width: u32,
    /// Stored (pre-rotation) height in pixels.
    pub height: u32,
    pub duration_sec: f64,
    /// Native frame rate, when the container reports a usable one.
    pub fps: Option<Fps>,
    pub has_audio: bool,
    pub rotation: Rotation,
}

impl ClipInfo {
    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    /// Size of the frames as they should be displayed.
    pub fn display_size(&self) -> PixelSize {
        self.rotation.apply_to_size(self.size())
    }

    pub fn fps_or(&self, fallback: Fps) -> Fps {
        self.fps.unwrap_or(fallback)
    }
}

#[derive(serde::Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

#[derive(serde::Deserialize, Default)]
struct ProbeTags {
    rotate: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    tags: ProbeTags,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
}

#[derive(serde::Deserialize, Default)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: ProbeFormat,
}

/// Parse `ffprobe -print_format json -show_streams -show_format` output.
pub fn parse_probe_json(json: &[u8], source_path: &Path) -> AutoframeResult<ClipInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| AutoframeError::media(format!("ffprobe json parse failed: {e}")))?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| AutoframeError::media("no video stream found"))?;
    let width = video
        .width
        .filter(|w| *w > 0)
        .ok_or_else(|| AutoframeError::media("missing video width from ffprobe"))?;
    let height = video
        .height
        .filter(|h| *h > 0)
        .ok_or_else(|| AutoframeError::media("missing video height from ffprobe"))?;

    let duration_sec = parse_secs(parsed.format.duration.as_deref())
        .or_else(|| parse_secs(video.duration.as_deref()))
        .ok_or_else(|| AutoframeError::media("ffprobe reported no duration"))?;

    let fps = video
        .avg_frame_rate
        .as_deref()
        .and_then(Fps::parse_rational)
        .or_else(|| video.r_frame_rate.as_deref().and_then(Fps::parse_rational));

    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(ClipInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        duration_sec,
        fps,
        has_audio,
        rotation: stream_rotation(video),
    })
}

fn parse_secs(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
}

// Legacy `rotate` tags are clockwise; display-matrix side data is counter-clockwise.
fn stream_rotation(stream: &ProbeStream) -> Rotation {
    if let Some(tag) = stream.tags.rotate.as_deref()
        && let Ok(deg) = tag.trim().parse::<i64>()
        && deg != 0
    {
        return Rotation::from_degrees_cw(deg);
    }
    stream
        .side_data_list
        .iter()
        .filter_map(|sd| sd.rotation)
        .find(|r| r.is_finite() && *r != 0.0)
        .map(|r| Rotation::from_degrees_cw(-(r.round() as i64)))
        .unwrap_or_default()
}

/// Probe source clip metadata through `ffprobe`.
#[tracing::instrument]
pub fn probe_clip(source_path: &Path) -> AutoframeResult<ClipInfo> {
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| AutoframeError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(AutoframeError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    parse_probe_json(&out.stdout, source_path)
}

/// Return `true` when both `ffmpeg` and `ffprobe` can be invoked from `PATH`.
pub fn ffmpeg_tools_available() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        std::process::Command::new(tool)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
