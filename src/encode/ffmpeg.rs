use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::config::EncoderSettings;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameRGBA, PixelSize};
use crate::foundation::error::{AutoframeError, AutoframeResult};

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    pub video_codec: String,
    pub audio_codec: String,
    /// Encoder speed preset; empty to leave the codec default.
    pub preset: String,
    /// Encoder thread count; `0` lets ffmpeg decide.
    pub threads: usize,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>, encoder: &EncoderSettings) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            video_codec: encoder.video_codec.clone(),
            audio_codec: encoder.audio_codec.clone(),
            preset: encoder.preset.clone(),
            threads: encoder.threads,
        }
    }

    /// Full ffmpeg argument list for `cfg`, excluding the program name.
    pub fn command_args(&self, cfg: &SinkConfig) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();
        args.push(if self.overwrite { "-y" } else { "-n" }.to_string());
        args.extend(
            [
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-s",
            ]
            .map(String::from),
        );
        args.push(format!("{}x{}", cfg.width, cfg.height));
        args.extend(input_fps_args(cfg.fps));
        args.extend(["-i", "pipe:0"].map(String::from));

        if let Some(audio) = cfg.audio.as_ref() {
            args.extend(["-f", "f32le", "-ar"].map(String::from));
            args.push(audio.sample_rate.to_string());
            args.push("-ac".to_string());
            args.push(audio.channels.to_string());
            args.push("-i".to_string());
            args.push(audio.path.to_string_lossy().into_owned());
            args.extend(["-map", "0:v:0", "-map", "1:a:0"].map(String::from));
        } else {
            args.extend(["-map", "0:v:0", "-an"].map(String::from));
        }

        args.push("-c:v".to_string());
        args.push(self.video_codec.clone());
        if !self.preset.is_empty() {
            args.push("-preset".to_string());
            args.push(self.preset.clone());
        }
        if self.threads > 0 {
            args.push("-threads".to_string());
            args.push(self.threads.to_string());
        }
        // yuv420p for broad player compatibility.
        args.extend(["-pix_fmt", "yuv420p"].map(String::from));
        if cfg.audio.is_some() {
            args.push("-c:a".to_string());
            args.push(self.audio_codec.clone());
        }

        match cfg.duration_sec {
            Some(d) => {
                args.push("-t".to_string());
                args.push(format!("{d:.6}"));
            }
            None if cfg.audio.is_some() => args.push("-shortest".to_string()),
            None => {}
        }
        args.extend(["-movflags", "+faststart"].map(String::from));
        args.push(self.out_path.to_string_lossy().into_owned());
        args
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin.
///
/// Audio is optional and provided through `SinkConfig.audio`. Dropping an unfinished sink kills
/// the encoder and removes the partial file.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<u64>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> AutoframeResult<()> {
        cfg.validate()?;
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(AutoframeError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(AutoframeError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.args(self.opts.command_args(&cfg))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            "spawning ffmpeg encoder"
        );

        let mut child = cmd.spawn().map_err(|e| {
            AutoframeError::media(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| AutoframeError::media("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| AutoframeError::media("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; PixelSize::new(cfg.width, cfg.height).rgba_len()?];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &FrameRGBA) -> AutoframeResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| AutoframeError::media("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(AutoframeError::media(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(AutoframeError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(AutoframeError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_over_black(&mut self.scratch, &frame.data)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(AutoframeError::media("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            AutoframeError::media(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> AutoframeResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| AutoframeError::media("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            AutoframeError::media(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| AutoframeError::media("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| AutoframeError::media(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            remove_partial(&self.opts.out_path);
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(AutoframeError::media(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        if self.cfg.take().is_some() {
            remove_partial(&self.opts.out_path);
        }
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

fn input_fps_args(fps: Fps) -> [String; 2] {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    ["-r".to_string(), format!("{}/{}", fps.num, fps.den)]
}

fn remove_partial(path: &Path) {
    if path.exists()
        && let Err(e) = std::fs::remove_file(path)
    {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove partial output");
    }
}

/// Composite straight-alpha RGBA8 over opaque black.
fn flatten_over_black(dst: &mut [u8], src: &[u8]) -> AutoframeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(AutoframeError::validation(
            "flatten_over_black expects equal-length rgba8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        d[0] = mul_div255(u16::from(s[0]), a) as u8;
        d[1] = mul_div255(u16::from(s[1]), a) as u8;
        d[2] = mul_div255(u16::from(s[2]), a) as u8;
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> AutoframeResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
