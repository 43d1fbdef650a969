//! The renderable side of a terrain.
//!
//! A terrain owns its vertex data and pushes it to a [`MeshSurface`] it never reads back from.
//! The surface is created once with the full topology, and updated with fresh vertex data after deformation.

use bevy_asset::RenderAssetUsages;
use bevy_math::{Vec2, Vec3};
use bevy_mesh::{Indices, Mesh};
use bevy_render::render_resource::PrimitiveTopology;

/// The per-vertex buffers handed to a [`MeshSurface`], all in the same storage order.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceBuffers<'a> {
    /// Local space positions, z up.
    pub positions: &'a [Vec3],
    /// Unit normals.
    pub normals: &'a [Vec3],
    /// Texture coordinates.
    pub uvs: &'a [Vec2],
}

/// Something that can render a terrain's geometry.
pub trait MeshSurface {
    /// Builds the surface from scratch. `indices` is a triangle list.
    fn create_section(&mut self, buffers: SurfaceBuffers<'_>, indices: &[u32]);

    /// Replaces the vertex data of a surface previously built with [`create_section`](Self::create_section).
    /// Topology is unchanged.
    fn update_section(&mut self, buffers: SurfaceBuffers<'_>);
}

/// Builds a triangle list [`Mesh`] usable from both the main and render worlds.
pub fn build_mesh(buffers: SurfaceBuffers<'_>, indices: &[u32]) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    mesh.create_section(buffers, indices);
    mesh
}

/// Writes into an existing [`Mesh`], which must use [`PrimitiveTopology::TriangleList`].
impl MeshSurface for Mesh {
    fn create_section(&mut self, buffers: SurfaceBuffers<'_>, indices: &[u32]) {
        self.update_section(buffers);
        self.insert_indices(Indices::U32(indices.to_vec()));
    }

    fn update_section(&mut self, buffers: SurfaceBuffers<'_>) {
        self.insert_attribute(Mesh::ATTRIBUTE_POSITION, to_arrays(buffers.positions));
        self.insert_attribute(Mesh::ATTRIBUTE_NORMAL, to_arrays(buffers.normals));
        self.insert_attribute(
            Mesh::ATTRIBUTE_UV_0,
            buffers.uvs.iter().map(|uv| uv.to_array()).collect::<Vec<_>>(),
        );
    }
}

fn to_arrays(vectors: &[Vec3]) -> Vec<[f32; 3]> {
    vectors.iter().map(|v| v.to_array()).collect()
}

/// A [`MeshSurface`] that keeps copies of everything it was sent.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub(crate) creates: usize,
    pub(crate) updates: usize,
    pub(crate) positions: Vec<Vec3>,
    pub(crate) normals: Vec<Vec3>,
    pub(crate) uvs: Vec<Vec2>,
    pub(crate) indices: Vec<u32>,
}

#[cfg(test)]
impl MeshSurface for RecordingSurface {
    fn create_section(&mut self, buffers: SurfaceBuffers<'_>, indices: &[u32]) {
        self.creates += 1;
        self.indices = indices.to_vec();
        self.positions = buffers.positions.to_vec();
        self.normals = buffers.normals.to_vec();
        self.uvs = buffers.uvs.to_vec();
    }

    fn update_section(&mut self, buffers: SurfaceBuffers<'_>) {
        self.updates += 1;
        self.positions = buffers.positions.to_vec();
        self.normals = buffers.normals.to_vec();
        self.uvs = buffers.uvs.to_vec();
    }
}
