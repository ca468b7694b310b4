use crate::foundation::core::FrameRGBA;
use crate::foundation::error::AutoframeResult;
use crate::media::decode::ClipSource;
use crate::media::probe::{ClipInfo, Rotation};

/// Rotate a frame clockwise by `rotation`.
pub fn rotate_frame(frame: FrameRGBA, rotation: Rotation) -> AutoframeResult<FrameRGBA> {
    if rotation == Rotation::None {
        return Ok(frame);
    }
    let img = frame.into_image()?;
    let rotated = match rotation {
        Rotation::None => img,
        Rotation::Cw90 => image::imageops::rotate90(&img),
        Rotation::Cw180 => image::imageops::rotate180(&img),
        Rotation::Cw270 => image::imageops::rotate270(&img),
    };
    Ok(FrameRGBA::from_image(rotated))
}

/// Presents a rotated source upright: frames are rotated on the fly and the reported metadata
/// carries display dimensions with no rotation left to apply.
pub struct OrientedClip {
    inner: Box<dyn ClipSource>,
    info: ClipInfo,
    rotation: Rotation,
}

impl OrientedClip {
    pub fn new(inner: Box<dyn ClipSource>) -> Self {
        let rotation = inner.info().rotation;
        let display = inner.info().display_size();
        let info = ClipInfo {
            width: display.width,
            height: display.height,
            rotation: Rotation::None,
            ..inner.info().clone()
        };
        Self {
            inner,
            info,
            rotation,
        }
    }
}

impl ClipSource for OrientedClip {
    fn info(&self) -> &ClipInfo {
        &self.info
    }

    fn next_frame(&mut self) -> AutoframeResult<Option<FrameRGBA>> {
        match self.inner.next_frame()? {
            Some(frame) => rotate_frame(frame, self.rotation).map(Some),
            None => Ok(None),
        }
    }

    fn close(&mut self) -> AutoframeResult<()> {
        self.inner.close()
    }
}

/// Wrap `source` so its frames come out upright. Unrotated sources pass through untouched.
pub fn normalize_orientation(source: Box<dyn ClipSource>) -> Box<dyn ClipSource> {
    if source.info().rotation == Rotation::None {
        return source;
    }
    tracing::debug!(
        rotation = source.info().rotation.degrees_cw(),
        "normalizing clip orientation"
    );
    Box::new(OrientedClip::new(source))
}

#[cfg(test)]
#[path = "../../tests/unit/media/orient.rs"]
mod tests;
