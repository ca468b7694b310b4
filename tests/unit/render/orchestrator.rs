use super::*;
use crate::config::BlurSettings;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::{FrameRGBA, PixelSize};
use crate::media::decode::ClipSource;
use crate::media::probe::Rotation;
use crate::media::toolkit::FfmpegToolkit;
use crate::render::progress::InMemoryProgressStore;
use std::path::PathBuf;

struct FlatSource {
    info: ClipInfo,
    remaining: u32,
}

impl ClipSource for FlatSource {
    fn info(&self) -> &ClipInfo {
        &self.info
    }

    fn next_frame(&mut self) -> AutoframeResult<Option<FrameRGBA>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        FrameRGBA::solid(self.info.size(), [40, 80, 120, 255]).map(Some)
    }

    fn close(&mut self) -> AutoframeResult<()> {
        Ok(())
    }
}

fn info(duration_sec: f64) -> ClipInfo {
    ClipInfo {
        source_path: PathBuf::from("flat.mp4"),
        width: 32,
        height: 18,
        duration_sec,
        fps: Some(Fps::new(10, 1).unwrap()),
        has_audio: false,
        rotation: Rotation::None,
    }
}

fn orchestrator() -> RenderOrchestrator {
    RenderOrchestrator::new(
        Arc::new(FfmpegToolkit),
        Arc::new(InMemoryProgressStore::new()),
        AutoframeConfig::default(),
    )
}

#[test]
fn encode_clip_writes_every_frame_and_reports_progress() {
    let source = Box::new(FlatSource {
        info: info(0.5),
        remaining: 3,
    });
    let fps = Fps::new(10, 1).unwrap();
    let mut clip = ReframedClip::new(
        source,
        PixelSize::new(18, 32),
        StyleKind::Black,
        fps,
        BlurSettings::default(),
    );
    let mut sink = InMemorySink::new();
    let mut calls = Vec::new();
    let written = encode_clip(&mut clip, &mut sink, None, &mut |w, t| calls.push((w, t))).unwrap();

    assert_eq!(written, 5);
    assert_eq!(sink.frames().len(), 5);
    assert!(sink.is_finished());
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (18, 32));
    assert_eq!(cfg.duration_sec, Some(0.5));
    assert!(cfg.audio.is_none());
    assert_eq!(calls.first(), Some(&(1, 5)));
    assert_eq!(calls.last(), Some(&(5, 5)));
    assert!(calls.windows(2).all(|w| w[0].0 < w[1].0));
}

#[test]
fn duration_limit_is_inclusive() {
    let orch = orchestrator();
    assert!(orch.check_duration(&info(180.0)).is_ok());
    let err = orch.check_duration(&info(180.5)).unwrap_err();
    assert!(err.is_user_facing());
    assert!(matches!(
        err,
        AutoframeError::ClipTooLong { max_sec: 180, .. }
    ));
}
