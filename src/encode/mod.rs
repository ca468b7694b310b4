//! Encoding of reframed frames into output files.

pub mod ffmpeg;
pub mod sink;
