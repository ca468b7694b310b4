//! Deterministic, collision-free output naming.

pub mod filename;
pub mod policy;
pub mod sanitize;
pub mod template;
