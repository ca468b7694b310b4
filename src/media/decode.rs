use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::foundation::core::{Fps, FrameRGBA};
use crate::foundation::error::{AutoframeError, AutoframeResult};
use crate::media::probe::ClipInfo;

/// A sequential source of decoded frames.
///
/// Frames come out in stored orientation, at `info().width x info().height`.
pub trait ClipSource: Send {
    fn info(&self) -> &ClipInfo;
    /// Next frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> AutoframeResult<Option<FrameRGBA>>;
    /// Release decoder resources. Safe to call more than once.
    fn close(&mut self) -> AutoframeResult<()>;
}

/// Streams RGBA frames out of a system `ffmpeg` process at a constant rate.
pub struct FfmpegClipSource {
    info: ClipInfo,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    frame_len: usize,
    exhausted: bool,
}

impl FfmpegClipSource {
    /// Spawn the decoder. Frames are emitted unrotated and resampled to `fps`.
    pub fn open(info: &ClipInfo, fps: Fps) -> AutoframeResult<Self> {
        let frame_len = info.size().rgba_len()?;
        if frame_len == 0 {
            return Err(AutoframeError::media(
                "decoded video frame size is zero (invalid source dimensions)",
            ));
        }

        let mut child = Command::new("ffmpeg")
            .args(decode_args(info, fps))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                AutoframeError::media(format!("failed to run ffmpeg for video decode: {e}"))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AutoframeError::media("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| AutoframeError::media("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            info: info.clone(),
            child: Some(child),
            stdout: Some(stdout),
            stderr_drain: Some(stderr_drain),
            frame_len,
            exhausted: false,
        })
    }

    fn finish(&mut self) -> AutoframeResult<()> {
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        // Stopping before EOF is normal: the caller decides how many frames it needs.
        let stopped_early = !self.exhausted;
        if stopped_early {
            let _ = child.kill();
        }
        let status = child.wait().map_err(|e| {
            AutoframeError::media(format!("failed to wait for ffmpeg decoder: {e}"))
        })?;
        let stderr = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| AutoframeError::media("ffmpeg stderr drain thread panicked"))?
                .unwrap_or_default(),
            None => Vec::new(),
        };
        if !stopped_early && !status.success() {
            return Err(AutoframeError::media(format!(
                "ffmpeg video decode failed for '{}': {}",
                self.info.source_path.display(),
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(())
    }
}

pub(crate) fn decode_args(info: &ClipInfo, fps: Fps) -> Vec<String> {
    let mut args: Vec<String> = ["-v", "error", "-nostdin", "-noautorotate", "-i"]
        .map(String::from)
        .to_vec();
    args.push(info.source_path.to_string_lossy().into_owned());
    args.extend(
        [
            "-map", "0:v:0", "-an", "-sn", "-f", "rawvideo", "-pix_fmt", "rgba", "-r",
        ]
        .map(String::from),
    );
    args.push(format!("{}/{}", fps.num, fps.den));
    args.push("pipe:1".to_string());
    args
}

impl ClipSource for FfmpegClipSource {
    fn info(&self) -> &ClipInfo {
        &self.info
    }

    fn next_frame(&mut self) -> AutoframeResult<Option<FrameRGBA>> {
        if self.exhausted {
            return Ok(None);
        }
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; self.frame_len];
        let mut filled = 0usize;
        while filled < buf.len() {
            match stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(AutoframeError::media(format!(
                        "failed to read decoded frame: {e}"
                    )));
                }
            }
        }

        if filled == 0 {
            self.exhausted = true;
            self.finish()?;
            return Ok(None);
        }
        if filled < buf.len() {
            self.exhausted = true;
            self.finish()?;
            return Err(AutoframeError::media(format!(
                "decoded frame truncated: got {filled} bytes, expected {}",
                self.frame_len
            )));
        }
        FrameRGBA::from_raw(self.info.width, self.info.height, buf).map(Some)
    }

    fn close(&mut self) -> AutoframeResult<()> {
        self.finish()
    }
}

impl Drop for FfmpegClipSource {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/decode.rs"]
mod tests;
