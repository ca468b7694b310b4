use crate::catalog::StyleKind;
use crate::foundation::core::PixelSize;

/// Largest uniform scale at which `src` fits inside `target`.
pub fn fit_scale(src: PixelSize, target: PixelSize) -> f64 {
    let sx = f64::from(target.width) / f64::from(src.width.max(1));
    let sy = f64::from(target.height) / f64::from(src.height.max(1));
    sx.min(sy)
}

/// Smallest uniform scale at which `src` covers `target`.
pub fn fill_scale(src: PixelSize, target: PixelSize) -> f64 {
    let sx = f64::from(target.width) / f64::from(src.width.max(1));
    let sy = f64::from(target.height) / f64::from(src.height.max(1));
    sx.max(sy)
}

/// `src` scaled by `scale`, rounded, never below one pixel.
pub fn scaled_size(src: PixelSize, scale: f64) -> PixelSize {
    let dim = |v: u32| ((f64::from(v) * scale).round() as u32).max(1);
    PixelSize::new(dim(src.width), dim(src.height))
}

/// `src` fitted inside `target`, clamped so rounding never overflows it.
pub fn fit_size(src: PixelSize, target: PixelSize) -> PixelSize {
    let s = scaled_size(src, fit_scale(src, target));
    PixelSize::new(s.width.min(target.width), s.height.min(target.height))
}

/// `src` scaled to cover `target`, clamped so rounding never leaves it short.
pub fn fill_size(src: PixelSize, target: PixelSize) -> PixelSize {
    let s = scaled_size(src, fill_scale(src, target));
    PixelSize::new(s.width.max(target.width), s.height.max(target.height))
}

/// Axis-aligned crop rectangle in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Centered crop of `target` out of `frame`; the excess splits with the odd pixel on the far side.
pub fn center_crop_box(frame: PixelSize, target: PixelSize) -> CropBox {
    let width = target.width.min(frame.width);
    let height = target.height.min(frame.height);
    CropBox {
        x: (frame.width - width) / 2,
        y: (frame.height - height) / 2,
        width,
        height,
    }
}

/// Top-left offset that centers `inner` within `outer`.
pub fn center_offset(inner: PixelSize, outer: PixelSize) -> (u32, u32) {
    (
        outer.width.saturating_sub(inner.width) / 2,
        outer.height.saturating_sub(inner.height) / 2,
    )
}

/// Letterbox background treatment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Background {
    /// Source filled over the target, then blurred.
    Blurred { cover: PixelSize, crop: CropBox },
    /// Flat opaque color.
    Solid([u8; 4]),
}

/// Per-frame geometry for one `(source size, target, style)` triple.
///
/// Computed once per variant and applied to every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramePlan {
    Letterbox {
        target: PixelSize,
        foreground: PixelSize,
        offset: (u32, u32),
        background: Background,
    },
    FillCrop {
        target: PixelSize,
        scaled: PixelSize,
        crop: CropBox,
    },
}

impl FramePlan {
    pub fn target(&self) -> PixelSize {
        match self {
            Self::Letterbox { target, .. } | Self::FillCrop { target, .. } => *target,
        }
    }
}

pub const BLACK: [u8; 4] = [0, 0, 0, 255];

/// Plan the transform of a `src`-sized (already upright) frame into `target` using `style`.
pub fn plan_frame(src: PixelSize, target: PixelSize, style: StyleKind) -> FramePlan {
    match style {
        StyleKind::Fill => {
            let scaled = fill_size(src, target);
            FramePlan::FillCrop {
                target,
                scaled,
                crop: center_crop_box(scaled, target),
            }
        }
        StyleKind::Blur | StyleKind::Black => {
            let foreground = fit_size(src, target);
            let background = if style == StyleKind::Blur {
                let cover = fill_size(src, target);
                Background::Blurred {
                    cover,
                    crop: center_crop_box(cover, target),
                }
            } else {
                Background::Solid(BLACK)
            };
            FramePlan::Letterbox {
                target,
                foreground,
                offset: center_offset(foreground, target),
                background,
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/geometry.rs"]
mod tests;
