//! A single deformable terrain and everything it owns.

use bevy_math::{Affine3A, Vec2, Vec3};
use bevy_mesh::Mesh;
use tracing::{debug, info};

use crate::{
    config::TerrainConfig,
    deform::{DeformationEngine, ImpactReport, SurfaceState},
    generator::{NoiseTerrain, TerrainGenerator, generate_from_config},
    storage::{grid::HeightGrid, normals::height_normals, triangles::triangulate},
    surface::{MeshSurface, SurfaceBuffers, build_mesh},
};

/// Something hit a terrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    /// Where it hit, in world space.
    pub point: Vec3,
    /// Where the terrain was at the time, in world space.
    pub terrain_transform: Affine3A,
}

impl Impact {
    /// An impact at `point` on a terrain placed at `terrain_transform`.
    pub fn new(point: Vec3, terrain_transform: Affine3A) -> Self {
        Self {
            point,
            terrain_transform,
        }
    }
}

/// A heightfield generated once and then cratered by impacts.
///
/// The terrain exclusively owns its buffers.
/// Topology and uvs are fixed at generation; positions only change through impacts, and only downward.
/// Every mutation goes through `&mut self`, so impacts on one terrain are always serialized.
#[derive(Debug, Clone)]
pub struct Terrain {
    config: TerrainConfig,
    grid: HeightGrid,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
    engine: DeformationEngine,
}

impl Terrain {
    /// Generates a terrain from seeded Perlin noise.
    pub fn generate(config: TerrainConfig) -> Self {
        let generator = NoiseTerrain::perlin(&config);
        Self::generate_with(config, &generator)
    }

    /// Generates a terrain whose heights come from `generator`.
    pub fn generate_with(config: TerrainConfig, generator: &impl TerrainGenerator) -> Self {
        let grid = generate_from_config(&config, generator);
        let indices = triangulate(grid.size());
        let normals = height_normals(&grid);
        info!(
            vertices = grid.positions().len(),
            triangles = indices.len() / 3,
            "generated terrain"
        );
        Self {
            engine: DeformationEngine::new(config.crater),
            config,
            grid,
            normals,
            indices,
        }
    }

    /// The config this terrain was generated from.
    #[inline]
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// The heightfield.
    #[inline]
    pub fn grid(&self) -> &HeightGrid {
        &self.grid
    }

    /// Vertex positions in local space, z up.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        self.grid.positions()
    }

    /// Texture coordinates.
    #[inline]
    pub fn uvs(&self) -> &[Vec2] {
        self.grid.uvs()
    }

    /// Vertex normals.
    #[inline]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// The triangle list.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Whether the surface is behind the vertex data.
    #[inline]
    pub fn surface_state(&self) -> SurfaceState {
        self.engine.state()
    }

    /// Every buffer a [`MeshSurface`] needs.
    pub fn buffers(&self) -> SurfaceBuffers<'_> {
        SurfaceBuffers {
            positions: self.grid.positions(),
            normals: &self.normals,
            uvs: self.grid.uvs(),
        }
    }

    /// Builds `surface` from this terrain's current geometry.
    pub fn create_surface(&self, surface: &mut impl MeshSurface) {
        surface.create_section(self.buffers(), &self.indices);
    }

    /// Builds a fresh [`Mesh`] of this terrain's current geometry.
    pub fn to_mesh(&self) -> Mesh {
        build_mesh(self.buffers(), &self.indices)
    }

    /// Carves a crater where a world space `impact` hits this terrain, placed at `terrain_transform`,
    /// and refreshes `surface` as the crater's [`RefreshPolicy`](crate::deform::RefreshPolicy) dictates.
    pub fn apply_impact(
        &mut self,
        impact: Vec3,
        terrain_transform: &Affine3A,
        surface: &mut impl MeshSurface,
    ) -> ImpactReport {
        let (positions, uvs) = self.grid.split_mut();
        let normals = &self.normals;
        self.engine
            .apply_impact(positions, impact, terrain_transform, |positions| {
                surface.update_section(SurfaceBuffers {
                    positions,
                    normals,
                    uvs,
                });
            })
    }

    /// Applies `impacts` in order, returning a report for each.
    pub fn apply_impacts(
        &mut self,
        impacts: impl IntoIterator<Item = Impact>,
        surface: &mut impl MeshSurface,
    ) -> Vec<ImpactReport> {
        impacts
            .into_iter()
            .map(|impact| self.apply_impact(impact.point, &impact.terrain_transform, surface))
            .collect()
    }

    /// Carves a crater without touching any surface, returning the indices that moved.
    ///
    /// The terrain stays [`Dirty`](SurfaceState::Dirty) until [`refresh`](Self::refresh) is called,
    /// so many impacts can be batched into one upload.
    pub fn carve(&mut self, impact: Vec3, terrain_transform: &Affine3A) -> Vec<usize> {
        let local = self.config.crater.frame.to_local(impact, terrain_transform);
        let (positions, _) = self.grid.split_mut();
        let lowered = self.engine.carve(positions, local);
        debug!(?impact, lowered = lowered.len(), "carved terrain");
        lowered
    }

    /// Pushes the current vertex data to `surface` if it is stale, returning whether it did.
    pub fn refresh(&mut self, surface: &mut impl MeshSurface) -> bool {
        let buffers = SurfaceBuffers {
            positions: self.grid.positions(),
            normals: &self.normals,
            uvs: self.grid.uvs(),
        };
        self.engine
            .flush(buffers.positions, |_| surface.update_section(buffers))
    }

    /// Re-derives normals from the current heights.
    ///
    /// Impacts leave normals alone, so call this (and then [`refresh`](Self::refresh)) to shade craters correctly.
    pub fn recompute_normals(&mut self) {
        self.normals = height_normals(&self.grid);
        self.engine.mark_dirty();
    }
}
