//! Errors that can occur at the configuration boundary.
//!
//! Generation, triangulation, and deformation are total; only loading and validating a [`TerrainConfig`](crate::config::TerrainConfig) can fail.

use thiserror::Error;

/// Everything that can go wrong while building a [`TerrainConfig`](crate::config::TerrainConfig).
#[derive(Debug, Error)]
pub enum TerrainError {
    /// A float parameter was negative, NaN, or infinite.
    #[error("invalid terrain parameter `{name}`: {value}")]
    InvalidParameter {
        /// The config field that was rejected.
        name: &'static str,
        /// The offending value.
        value: f32,
    },

    /// The grid has more points than a `u32` triangle index can address.
    #[error("terrain grid of {x_size} by {y_size} cells has too many points for u32 indices")]
    GridTooLarge {
        /// Cells along x.
        x_size: u32,
        /// Cells along y.
        y_size: u32,
    },

    /// The config text was not valid JSON for a terrain.
    #[error("failed to parse terrain config: {0}")]
    Json(#[from] serde_json::Error),
}
