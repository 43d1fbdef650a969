//! Contains logic for what a terrain may look like.

use bevy_math::UVec2;
use noise::{NoiseFn, Perlin};
use tracing::{debug, trace};

use crate::{
    config::TerrainConfig,
    storage::grid::{GridSize, HeightGrid},
};

/// Represents a type that can dictate the shape of a terrain.
pub trait TerrainGenerator {
    /// Samples the height of the terrain at lattice coordinate `point`.
    fn sample_height(&self, point: UVec2) -> f32;
}

/// Samples a 2D noise field on a lattice to produce heights.
///
/// The point `(x, y)` has height `noise(x * noise_scale + 0.1, y * noise_scale + 0.1) * z_multiplier`.
/// The small offset keeps samples off exact integer coordinates, where gradient noise is always 0.
#[derive(Debug, Clone)]
pub struct NoiseTerrain<N> {
    noise: N,
    noise_scale: f64,
    z_multiplier: f32,
}

impl<N> NoiseTerrain<N> {
    /// Added to both noise coordinates before sampling.
    pub const SAMPLE_OFFSET: f64 = 0.1;

    /// Wraps `noise`, sampling it every `noise_scale` per lattice step and scaling the result by `z_multiplier`.
    pub fn new(noise: N, noise_scale: f32, z_multiplier: f32) -> Self {
        Self {
            noise,
            noise_scale: noise_scale as f64,
            z_multiplier,
        }
    }

    /// Gets the wrapped noise function.
    pub fn noise(&self) -> &N {
        &self.noise
    }
}

impl NoiseTerrain<Perlin> {
    /// Perlin noise seeded and scaled per `config`.
    pub fn perlin(config: &TerrainConfig) -> Self {
        Self::new(Perlin::new(config.seed), config.noise_scale, config.z_multiplier)
    }
}

impl<N: NoiseFn<f64, 2>> TerrainGenerator for NoiseTerrain<N> {
    fn sample_height(&self, point: UVec2) -> f32 {
        let x = point.x as f64 * self.noise_scale + Self::SAMPLE_OFFSET;
        let y = point.y as f64 * self.noise_scale + Self::SAMPLE_OFFSET;
        self.noise.get([x, y]) as f32 * self.z_multiplier
    }
}

/// Lays out the vertices and texture coordinates of a heightfield.
///
/// Each lattice point `(x, y)` becomes the vertex `(x * scale, y * scale, height)` and the uv `(x * uv_scale, y * uv_scale)`,
/// stored at the flat index given by [`GridSize::index_of`].
pub fn generate_grid(
    size: GridSize,
    scale: f32,
    uv_scale: f32,
    generator: &impl TerrainGenerator,
) -> HeightGrid {
    let mut positions = Vec::with_capacity(size.point_count());
    let mut uvs = Vec::with_capacity(size.point_count());

    for point in size.points() {
        let height = generator.sample_height(point);
        trace!(x = point.x, y = point.y, height, "sampled terrain height");

        let planar = point.as_vec2();
        positions.push((planar * scale).extend(height));
        uvs.push(planar * uv_scale);
    }

    debug!(
        x_size = size.x_size(),
        y_size = size.y_size(),
        vertices = positions.len(),
        "generated terrain grid"
    );
    HeightGrid::from_parts_unchecked(size, positions, uvs)
}

/// [`generate_grid`] driven entirely by `config`.
pub fn generate_from_config(config: &TerrainConfig, generator: &impl TerrainGenerator) -> HeightGrid {
    generate_grid(config.grid(), config.scale, config.uv_scale, generator)
}

#[cfg(test)]
mod tests {
    use bevy_math::{Vec2, Vec3};
    use noise::Constant;

    use super::*;

    /// Height encodes the lattice coordinate so placement can be checked exactly.
    struct Encoded;

    impl TerrainGenerator for Encoded {
        fn sample_height(&self, point: UVec2) -> f32 {
            (point.x * 10 + point.y) as f32
        }
    }

    #[test]
    fn documented_scenario() {
        let config = TerrainConfig {
            x_size: 2,
            y_size: 2,
            scale: 100.0,
            uv_scale: 0.1,
            noise_scale: 0.1,
            z_multiplier: 50.0,
            ..Default::default()
        };
        let terrain = NoiseTerrain::perlin(&config);
        let grid = generate_from_config(&config, &terrain);

        assert_eq!(grid.positions().len(), 9);
        assert_eq!(grid.uvs().len(), 9);

        let expected = terrain.noise().get([0.1, 0.1]) as f32 * 50.0;
        assert_eq!(grid.positions()[0], Vec3::new(0.0, 0.0, expected));
    }

    #[test]
    fn vertex_at_flat_index_matches_lattice_point() {
        let size = GridSize::new(3, 5);
        let grid = generate_grid(size, 2.0, 0.5, &Encoded);
        for point in size.points() {
            let i = size.index_of(point).unwrap();
            let expected = Vec3::new(
                point.x as f32 * 2.0,
                point.y as f32 * 2.0,
                (point.x * 10 + point.y) as f32,
            );
            assert_eq!(grid.positions()[i], expected);
            assert_eq!(grid.uvs()[i], Vec2::new(point.x as f32 * 0.5, point.y as f32 * 0.5));
        }
    }

    #[test]
    fn constant_noise_is_scaled() {
        let terrain = NoiseTerrain::new(Constant::new(0.5), 0.1, 8.0);
        let grid = generate_grid(GridSize::new(2, 3), 1.0, 1.0, &terrain);
        assert!(grid.positions().iter().all(|p| p.z == 4.0));
    }

    #[test]
    fn perlin_is_deterministic_per_seed() {
        let config = TerrainConfig {
            x_size: 6,
            y_size: 6,
            seed: 7,
            ..Default::default()
        };
        let a = generate_from_config(&config, &NoiseTerrain::perlin(&config));
        let b = generate_from_config(&config, &NoiseTerrain::perlin(&config));
        assert_eq!(a, b);
    }

    #[test]
    fn offset_avoids_flat_integer_samples() {
        // With noise_scale 1 every sample would land on an integer lattice point without the offset.
        let config = TerrainConfig {
            x_size: 4,
            y_size: 4,
            noise_scale: 1.0,
            z_multiplier: 1.0,
            seed: 3,
            ..Default::default()
        };
        let grid = generate_from_config(&config, &NoiseTerrain::perlin(&config));
        assert!(grid.positions().iter().any(|p| p.z != 0.0));
    }
}
