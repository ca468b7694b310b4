//! Source media access: probing, decoding, orientation and audio.

pub mod audio;
pub mod decode;
pub mod orient;
pub mod probe;
pub mod toolkit;

pub use decode::ClipSource;
pub use probe::{ClipInfo, Rotation};
pub use toolkit::{FfmpegToolkit, MediaToolkit};
