//! Error types for plexus.
//!
//! The simulation itself is total: degenerate surfaces produce an empty
//! field rather than an error. These variants cover the layers around it
//! (configuration, recipes, render targets, snapshots).

use thiserror::Error;

/// Errors produced outside the per-frame simulation.
#[derive(Debug, Error)]
pub enum BackdropError {
    /// Width or height was zero, or `width * height` overflowed.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A parameter was present but unusable.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    /// The drawing surface could not be acquired from the host.
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// Writing a snapshot or reading an input file failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl BackdropError {
    /// Shorthand for [`BackdropError::InvalidParam`].
    pub fn invalid_param(name: &str, reason: impl Into<String>) -> Self {
        BackdropError::InvalidParam {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
