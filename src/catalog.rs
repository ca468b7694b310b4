//! Fixed catalogs of output aspect ratios and background styles.
//!
//! Neither catalog is extensible at runtime; unknown keys are reported as `None` so callers can
//! decide whether to skip them or fall back to a default.

use crate::foundation::core::PixelSize;

/// Output aspect ratio key.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AspectKey {
    /// 9:16 vertical.
    Portrait,
    /// 4:5 portrait feed.
    FourFive,
    /// 1:1.
    Square,
    /// 16:9.
    Landscape,
}

/// Immutable descriptor for one output aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AspectTarget {
    pub key: AspectKey,
    pub size: PixelSize,
    /// Friendly label, e.g. `9:16 Portrait`.
    pub label: &'static str,
    /// Short label used in filenames, e.g. `9x16`.
    pub short: &'static str,
    pub description: &'static str,
}

const ASPECT_TARGETS: [AspectTarget; 4] = [
    AspectTarget {
        key: AspectKey::Portrait,
        size: PixelSize::new(1080, 1920),
        label: "9:16 Portrait",
        short: "9x16",
        description: "Vertical stories / shorts",
    },
    AspectTarget {
        key: AspectKey::FourFive,
        size: PixelSize::new(1080, 1350),
        label: "4:5 Portrait",
        short: "4x5",
        description: "Feeds & portrait posts",
    },
    AspectTarget {
        key: AspectKey::Square,
        size: PixelSize::new(1080, 1080),
        label: "1:1 Square",
        short: "1x1",
        description: "Feeds & carousels",
    },
    AspectTarget {
        key: AspectKey::Landscape,
        size: PixelSize::new(1920, 1080),
        label: "16:9 Landscape",
        short: "16x9",
        description: "YouTube & players",
    },
];

impl AspectKey {
    pub const ALL: [AspectKey; 4] = [
        AspectKey::Portrait,
        AspectKey::FourFive,
        AspectKey::Square,
        AspectKey::Landscape,
    ];

    pub fn parse(key: &str) -> Option<Self> {
        match key.trim() {
            "portrait" => Some(Self::Portrait),
            "four_five" => Some(Self::FourFive),
            "square" => Some(Self::Square),
            "landscape" => Some(Self::Landscape),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::FourFive => "four_five",
            Self::Square => "square",
            Self::Landscape => "landscape",
        }
    }

    pub fn target(self) -> &'static AspectTarget {
        match self {
            Self::Portrait => &ASPECT_TARGETS[0],
            Self::FourFive => &ASPECT_TARGETS[1],
            Self::Square => &ASPECT_TARGETS[2],
            Self::Landscape => &ASPECT_TARGETS[3],
        }
    }
}

impl std::fmt::Display for AspectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Background-fill strategy used when reframing.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StyleKind {
    /// Fit the clip and fill the bars with a blurred, enlarged copy of itself.
    #[default]
    Blur,
    /// Fit the clip over solid black bars.
    Black,
    /// Scale to cover the canvas and crop the overflow.
    Fill,
}

impl StyleKind {
    pub const ALL: [StyleKind; 3] = [StyleKind::Blur, StyleKind::Black, StyleKind::Fill];

    pub fn parse(key: &str) -> Option<Self> {
        match key.trim() {
            "blur" => Some(Self::Blur),
            "black" => Some(Self::Black),
            "fill" => Some(Self::Fill),
            _ => None,
        }
    }

    /// Parse a style key, falling back to [`StyleKind::Blur`] for anything unrecognized.
    pub fn parse_or_default(key: &str) -> Self {
        Self::parse(key).unwrap_or_else(|| {
            tracing::warn!(style = key, "unknown style key, falling back to blur");
            Self::default()
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blur => "blur",
            Self::Black => "black",
            Self::Fill => "fill",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Blur => "Blurred background letterbox",
            Self::Black => "Black background letterbox",
            Self::Fill => "Fill & crop",
        }
    }

    pub fn short_label(self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for StyleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "../tests/unit/catalog.rs"]
mod tests;
