//! Error types for motion loading and curve evaluation.
//!
//! Scheduling never fails: bad priorities and unknown track ids degrade
//! gracefully and are reported through `log` instead.

use serde::{Deserialize, Serialize};

/// Coarse classification of a [`LoadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadErrorKind {
    Empty,
    Malformed,
    InvalidTiming,
}

impl LoadErrorKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Malformed => "malformed",
            Self::InvalidTiming => "invalid_timing",
        }
    }
}

/// A motion asset is structurally invalid and cannot be played.
///
/// Fatal for that asset only; the engine keeps running without it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LoadError {
    /// A required section (document root, curve list, segment list) is missing or empty.
    #[error("Empty motion data: {what}")]
    Empty { what: String },

    /// Data is present but does not have the expected shape.
    #[error("Malformed motion data: {reason}")]
    Malformed { reason: String },

    /// Durations, fades or segment times are out of range or out of order.
    #[error("Invalid motion timing: {reason}")]
    InvalidTiming { reason: String },
}

impl LoadError {
    pub fn empty(what: impl Into<String>) -> Self {
        Self::Empty { what: what.into() }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    pub fn invalid_timing(reason: impl Into<String>) -> Self {
        Self::InvalidTiming {
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            Self::Empty { .. } => LoadErrorKind::Empty,
            Self::Malformed { .. } => LoadErrorKind::Malformed,
            Self::InvalidTiming { .. } => LoadErrorKind::InvalidTiming,
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed {
            reason: err.to_string(),
        }
    }
}

/// Evaluation-time curve failure. Recovered locally with [`CurveError::neutral_value`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CurveError {
    #[error("Curve '{target_id}' has no segments")]
    Empty { target_id: String },
}

impl CurveError {
    /// Value substituted for a curve that cannot be evaluated.
    #[inline]
    pub fn neutral_value(&self) -> f64 {
        0.0
    }
}
