//! AutoFrame reframes video clips into social-media aspect ratios.
//!
//! Each source clip is rendered once per requested ratio in one of three styles (blurred
//! letterbox, black letterbox, or fill-and-crop) and every output receives a deterministic,
//! collision-free filename.
//!
//! - Probe and decode clips through a [`MediaToolkit`]
//! - Reframe frames with a [`ReframedClip`]
//! - Render every ratio of a clip with a [`RenderOrchestrator`]
//! - Run whole batches, with summaries and zip bundles, through a [`BatchProcessor`]
#![forbid(unsafe_code)]

mod foundation;

pub mod batch;
pub mod catalog;
pub mod config;
pub mod encode;
pub mod media;
pub mod naming;
pub mod render;
pub mod transform;

pub use crate::foundation::core::{Fps, FrameRGBA, PixelSize};
pub use crate::foundation::error::{AutoframeError, AutoframeResult};

pub use crate::batch::{BatchProcessor, BatchReport, BatchRequest, FsSummaryStore, SummaryStore};
pub use crate::catalog::{AspectKey, AspectTarget, StyleKind};
pub use crate::config::{AutoframeConfig, BlurSettings, EncoderSettings};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::media::{ClipInfo, ClipSource, FfmpegToolkit, MediaToolkit, Rotation};
pub use crate::naming::filename::{BaseNameInfo, GeneratedName, generate_output_filename};
pub use crate::naming::policy::{NamingForm, NamingPolicy, build_naming_config};
pub use crate::render::{
    InMemoryProgressStore, ProgressEntry, ProgressStatus, ProgressStore, RenderOrchestrator,
    RenderOutput,
};
pub use crate::transform::{ReframedClip, Reframer};
