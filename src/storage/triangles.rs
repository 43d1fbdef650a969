//! Connects lattice points into a triangle list.

use tracing::debug;

use crate::storage::grid::GridSize;

/// Builds the index list for `size`, two triangles per cell.
///
/// Cells are visited in the same x-major order the points are stored in.
/// For the cell whose first corner is at flat index `v`, the triangles are
/// `(v, v + 1, v + y + 1)` and `(v + 1, v + y + 2, v + y + 1)`, where `y` is [`GridSize::y_size`].
/// That winding decides which side of the surface faces out, so it must be kept exactly.
///
/// Topology depends only on `size`, never on heights, so this is computed once per terrain.
/// A degenerate grid produces no indices.
pub fn triangulate(size: GridSize) -> Vec<u32> {
    let y_size = size.y_size();
    let mut indices = Vec::with_capacity(size.cell_count() * 6);

    let mut vertex = 0u32;
    for _ in 0..size.x_size() {
        for _ in 0..y_size {
            indices.extend_from_slice(&[vertex, vertex + 1, vertex + y_size + 1]);
            indices.extend_from_slice(&[vertex + 1, vertex + y_size + 2, vertex + y_size + 1]);
            vertex += 1;
        }
        // Each column has one more point than it has cells.
        vertex += 1;
    }

    debug!(
        x_size = size.x_size(),
        y_size,
        triangles = indices.len() / 3,
        "triangulated terrain grid"
    );
    indices
}

#[cfg(test)]
mod tests {
    use bevy_math::UVec2;

    use super::*;

    #[test]
    fn two_triangles_per_cell() {
        for (x, y) in [(1, 1), (2, 2), (3, 7), (10, 1)] {
            let size = GridSize::new(x, y);
            let indices = triangulate(size);
            assert_eq!(indices.len(), 6 * (x * y) as usize);
            assert_eq!(indices.len() / 3, 2 * size.cell_count());
        }
    }

    #[test]
    fn triangles_are_distinct_and_in_range() {
        let size = GridSize::new(4, 3);
        let count = size.point_count() as u32;
        for tri in triangulate(size).chunks_exact(3) {
            assert!(tri.iter().all(|&i| i < count), "{tri:?} out of range");
            assert!(tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2]);
        }
    }

    #[test]
    fn single_cell_winding() {
        assert_eq!(triangulate(GridSize::new(1, 1)), vec![0, 1, 2, 1, 3, 2]);
    }

    #[test]
    fn skips_the_last_point_of_each_column() {
        let size = GridSize::new(2, 2);
        let indices = triangulate(size);
        // Third cell starts the second column, at point (1, 0).
        let first = size.index_of(UVec2::new(1, 0)).unwrap() as u32;
        assert_eq!(&indices[12..18], &[first, first + 1, first + 3, first + 1, first + 4, first + 3]);
    }

    #[test]
    fn every_cell_covers_its_four_corners() {
        let size = GridSize::new(3, 2);
        let indices = triangulate(size);
        for (cell, tris) in indices.chunks_exact(6).enumerate() {
            let x = cell as u32 / size.y_size();
            let y = cell as u32 % size.y_size();
            let mut corners: Vec<u32> = [(x, y), (x, y + 1), (x + 1, y), (x + 1, y + 1)]
                .into_iter()
                .map(|(x, y)| size.index_of(UVec2::new(x, y)).unwrap() as u32)
                .collect();
            let mut used = tris.to_vec();
            used.sort_unstable();
            used.dedup();
            corners.sort_unstable();
            assert_eq!(used, corners);
        }
    }

    #[test]
    fn degenerate_grids_are_empty() {
        assert!(triangulate(GridSize::new(0, 4)).is_empty());
        assert!(triangulate(GridSize::new(4, 0)).is_empty());
    }
}
