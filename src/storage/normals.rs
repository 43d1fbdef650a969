//! Per-vertex normals for a heightfield.

use bevy_math::{UVec2, Vec3};

use crate::storage::grid::HeightGrid;

/// Estimates a unit normal for every vertex from the heights of its lattice neighbors.
///
/// Uses central differences in the interior and one-sided differences on the border.
/// Positions are z up, so a flat grid yields [`Vec3::Z`] everywhere.
pub fn height_normals(grid: &HeightGrid) -> Vec<Vec3> {
    let size = grid.size();
    let max = UVec2::new(size.x_size(), size.y_size());

    size.points()
        .map(|p| {
            // These lookups can't fail: the neighbors are clamped onto the lattice.
            let at = |q: UVec2| grid.position(q).unwrap_or(Vec3::ZERO);
            let left = at(UVec2::new(p.x.saturating_sub(1), p.y));
            let right = at(UVec2::new((p.x + 1).min(max.x), p.y));
            let down = at(UVec2::new(p.x, p.y.saturating_sub(1)));
            let up = at(UVec2::new(p.x, (p.y + 1).min(max.y)));

            let along_x = right - left;
            let along_y = up - down;
            let slope_x = if along_x.x != 0.0 { along_x.z / along_x.x } else { 0.0 };
            let slope_y = if along_y.y != 0.0 { along_y.z / along_y.y } else { 0.0 };

            Vec3::new(-slope_x, -slope_y, 1.0).normalize()
        })
        .collect()
}
