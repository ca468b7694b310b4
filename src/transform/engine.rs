use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba, RgbaImage};

use crate::catalog::StyleKind;
use crate::config::BlurSettings;
use crate::foundation::core::{Fps, FrameRGBA, PixelSize};
use crate::foundation::error::{AutoframeError, AutoframeResult};
use crate::media::decode::ClipSource;
use crate::media::orient::normalize_orientation;
use crate::transform::blur::blur_rgba8;
use crate::transform::geometry::{Background, CropBox, FramePlan, plan_frame};

type FrameView<'a> = ImageBuffer<Rgba<u8>, &'a [u8]>;

fn view(frame: &FrameRGBA) -> AutoframeResult<FrameView<'_>> {
    ImageBuffer::from_raw(frame.width, frame.height, frame.data.as_slice())
        .ok_or_else(|| AutoframeError::validation("frame buffer does not match its dimensions"))
}

fn resize_to(src: &FrameView<'_>, size: PixelSize, filter: FilterType) -> RgbaImage {
    if src.dimensions() == (size.width, size.height) {
        let mut out = RgbaImage::new(size.width, size.height);
        out.copy_from_slice(src.as_raw());
        return out;
    }
    imageops::resize(src, size.width, size.height, filter)
}

fn crop(img: &RgbaImage, c: CropBox) -> RgbaImage {
    if img.dimensions() == (c.width, c.height) {
        return img.clone();
    }
    imageops::crop_imm(img, c.x, c.y, c.width, c.height).to_image()
}

/// Applies one [`FramePlan`] to every frame of an upright source.
#[derive(Clone, Debug)]
pub struct Reframer {
    plan: FramePlan,
    source: PixelSize,
    blur: BlurSettings,
}

impl Reframer {
    pub fn new(source: PixelSize, target: PixelSize, style: StyleKind, blur: BlurSettings) -> Self {
        Self {
            plan: plan_frame(source, target, style),
            source,
            blur,
        }
    }

    pub fn plan(&self) -> &FramePlan {
        &self.plan
    }

    pub fn target(&self) -> PixelSize {
        self.plan.target()
    }

    /// Transform one frame into a frame of exactly the target size.
    pub fn apply(&self, frame: &FrameRGBA) -> AutoframeResult<FrameRGBA> {
        if frame.size() != self.source {
            return Err(AutoframeError::validation(format!(
                "frame size {} does not match planned source size {}",
                frame.size(),
                self.source
            )));
        }
        let src = view(frame)?;
        let out = match self.plan {
            FramePlan::FillCrop {
                scaled, crop: c, ..
            } => crop(&resize_to(&src, scaled, FilterType::CatmullRom), c),
            FramePlan::Letterbox {
                target,
                foreground,
                offset,
                background,
            } => {
                let mut canvas = match background {
                    Background::Solid(rgba) => {
                        RgbaImage::from_pixel(target.width, target.height, Rgba(rgba))
                    }
                    Background::Blurred { cover, crop: c } => {
                        let bg = crop(&resize_to(&src, cover, FilterType::Triangle), c);
                        let blurred = blur_rgba8(
                            bg.as_raw(),
                            target.width,
                            target.height,
                            self.blur.radius_px,
                            self.blur.sigma,
                        )?;
                        RgbaImage::from_raw(target.width, target.height, blurred).ok_or_else(
                            || AutoframeError::validation("blurred background size mismatch"),
                        )?
                    }
                };
                let fg = resize_to(&src, foreground, FilterType::CatmullRom);
                imageops::replace(&mut canvas, &fg, i64::from(offset.0), i64::from(offset.1));
                canvas
            }
        };
        Ok(FrameRGBA::from_image(out))
    }
}

/// A source clip reframed to a target canvas.
///
/// Yields exactly `round(duration * fps)` frames: a short decode repeats its last frame and
/// anything past the end is dropped, so the output duration matches the source.
pub struct ReframedClip {
    source: Box<dyn ClipSource>,
    reframer: Reframer,
    fps: Fps,
    duration_sec: f64,
    frame_total: u64,
    emitted: u64,
    last: Option<FrameRGBA>,
}

impl ReframedClip {
    /// Wrap `source`, correcting its orientation before planning the transform.
    pub fn new(
        source: Box<dyn ClipSource>,
        target: PixelSize,
        style: StyleKind,
        fps: Fps,
        blur: BlurSettings,
    ) -> Self {
        let source = normalize_orientation(source);
        let info = source.info();
        let duration_sec = info.duration_sec;
        let reframer = Reframer::new(info.size(), target, style, blur);
        Self {
            source,
            reframer,
            fps,
            duration_sec,
            frame_total: fps.secs_to_frames_round(duration_sec),
            emitted: 0,
            last: None,
        }
    }

    pub fn size(&self) -> PixelSize {
        self.reframer.target()
    }

    /// Upright source size the transform was planned against.
    pub fn source_size(&self) -> PixelSize {
        self.source.info().size()
    }

    pub fn duration_sec(&self) -> f64 {
        self.duration_sec
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn frame_total(&self) -> u64 {
        self.frame_total
    }

    pub fn has_audio(&self) -> bool {
        self.source.info().has_audio
    }

    pub fn plan(&self) -> &FramePlan {
        self.reframer.plan()
    }

    pub fn next_frame(&mut self) -> AutoframeResult<Option<FrameRGBA>> {
        if self.emitted >= self.frame_total {
            return Ok(None);
        }
        let frame = match self.source.next_frame()? {
            Some(decoded) => {
                let out = self.reframer.apply(&decoded)?;
                self.last = Some(out.clone());
                out
            }
            None => match self.last.as_ref() {
                Some(last) => last.clone(),
                None => {
                    return Err(AutoframeError::media(format!(
                        "'{}' produced no video frames",
                        self.source.info().source_path.display()
                    )));
                }
            },
        };
        self.emitted += 1;
        Ok(Some(frame))
    }

    /// Release the decoder and any cached frame.
    pub fn close(mut self) -> AutoframeResult<()> {
        self.last = None;
        self.source.close()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/engine.rs"]
mod tests;
