//! Interpolation helpers shared by curve evaluation and fade weighting.

pub mod functions;

pub use functions::{cubic_bezier, ease, lerp};
