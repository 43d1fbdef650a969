//! Configuration fixed per terrain instance before generation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    deform::{ImpactFrame, RefreshPolicy},
    error::TerrainError,
    storage::grid::GridSize,
};

/// Everything needed to generate and later deform one terrain.
///
/// Missing fields fall back to [`TerrainConfig::default`] when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Number of cells along x. The lattice has `x_size + 1` points on this axis.
    pub x_size: u32,
    /// Number of cells along y. The lattice has `y_size + 1` points on this axis.
    pub y_size: u32,
    /// World units per grid cell.
    pub scale: f32,
    /// Texture coordinate units per grid cell.
    pub uv_scale: f32,
    /// How far apart adjacent grid points sample the noise field.
    pub noise_scale: f32,
    /// Height amplitude applied to the noise value.
    pub z_multiplier: f32,
    /// Seed of the default Perlin noise.
    pub seed: u32,
    /// How impacts carve into the surface.
    pub crater: CraterConfig,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            x_size: 10,
            y_size: 10,
            scale: 100.0,
            uv_scale: 0.1,
            noise_scale: 0.1,
            z_multiplier: 50.0,
            seed: 0,
            crater: CraterConfig::default(),
        }
    }
}

impl TerrainConfig {
    /// Parses and [validates](Self::validate) a config from JSON.
    pub fn from_json(text: &str) -> Result<Self, TerrainError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        debug!(?config, "loaded terrain config");
        Ok(config)
    }

    /// The lattice this config describes.
    #[inline]
    pub fn grid(&self) -> GridSize {
        GridSize::new(self.x_size, self.y_size)
    }

    /// True if every lattice point, and the lattice extents themselves, fit in a `u32`.
    fn grid_fits_u32_indices(&self) -> bool {
        let points = (self.x_size as u64 + 1) * (self.y_size as u64 + 1);
        points <= u32::MAX as u64
    }

    /// Rejects grids too large for `u32` indices, and float parameters that are negative or not finite.
    ///
    /// Zero sized grids are allowed; they simply produce an empty mesh.
    pub fn validate(&self) -> Result<(), TerrainError> {
        if !self.grid_fits_u32_indices() {
            return Err(TerrainError::GridTooLarge {
                x_size: self.x_size,
                y_size: self.y_size,
            });
        }
        check("scale", self.scale)?;
        check("uv_scale", self.uv_scale)?;
        check("noise_scale", self.noise_scale)?;
        check("z_multiplier", self.z_multiplier)?;
        check("crater.radius", self.crater.radius)?;
        check("crater.depth", self.crater.depth)?;
        Ok(())
    }
}

fn check(name: &'static str, value: f32) -> Result<(), TerrainError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TerrainError::InvalidParameter { name, value })
    }
}

/// Parameters of the crater an impact leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraterConfig {
    /// Vertices strictly closer than this to the impact are lowered.
    pub radius: f32,
    /// How far each qualifying vertex drops per impact.
    pub depth: f32,
    /// When the surface is re-uploaded during an impact.
    pub refresh: RefreshPolicy,
    /// Which coordinate frame the impact is compared in.
    pub frame: ImpactFrame,
}

impl Default for CraterConfig {
    fn default() -> Self {
        Self {
            radius: 100.0,
            depth: 10.0,
            refresh: RefreshPolicy::default(),
            frame: ImpactFrame::default(),
        }
    }
}
