//! Error types for terrain generation.

use thiserror::Error;

/// Invalid configuration detected before a generation sub-step.
///
/// These do not abort the whole pass: the generator logs them and skips the
/// dependent step, leaving that step's artifacts empty rather than partially
/// populated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The map has no quads on at least one axis.
    #[error("map size must be at least 1x1 quads, got {width}x{height}")]
    EmptyMap {
        /// Configured width in quads.
        width: u32,
        /// Configured height in quads.
        height: u32,
    },

    /// The Poisson-disc radius cannot space any points.
    #[error("node distance radius must be positive, got {0}")]
    NonPositiveRadius(f32),

    /// Graph construction needs at least two placed nodes.
    #[error("not enough node points to build paths ({0})")]
    TooFewNodes(usize),
}
