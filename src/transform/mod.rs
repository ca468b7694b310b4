//! Frame transform engine: geometry planning, background blur and compositing.

pub mod blur;
pub mod engine;
pub mod geometry;

pub use engine::{ReframedClip, Reframer};
pub use geometry::{FramePlan, plan_frame};
