//! Contains the lattice a terrain is sampled on and the per-point buffers built from it.

use bevy_math::{UVec2, Vec2, Vec3};

/// The extents of a terrain lattice, in cells.
///
/// A grid of `x` by `y` cells has `(x + 1) * (y + 1)` points.
/// Points are stored densely in x-major order: every y for a given x, then the next x.
/// So the point at `(x, y)` lives at flat index `x * (y_size + 1) + y`.
///
/// This ordering is what [`triangulate`](crate::storage::triangles::triangulate) relies on, so it must never change.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct GridSize(UVec2);

impl GridSize {
    /// Constructs a grid of `x_size` by `y_size` cells.
    #[inline]
    pub const fn new(x_size: u32, y_size: u32) -> Self {
        Self(UVec2::new(x_size, y_size))
    }

    /// Number of cells along x.
    #[inline]
    pub const fn x_size(self) -> u32 {
        self.0.x
    }

    /// Number of cells along y.
    #[inline]
    pub const fn y_size(self) -> u32 {
        self.0.y
    }

    /// Number of points in one x column, which is also the flat index stride of x.
    #[inline]
    pub const fn column_len(self) -> u32 {
        self.0.y + 1
    }

    /// Total number of lattice points.
    #[inline]
    pub const fn point_count(self) -> usize {
        (self.0.x as usize + 1) * self.column_len() as usize
    }

    /// Total number of cells, each of which becomes two triangles.
    #[inline]
    pub const fn cell_count(self) -> usize {
        self.0.x as usize * self.0.y as usize
    }

    /// True if the grid has no cells and therefore no triangles.
    #[inline]
    pub const fn is_degenerate(self) -> bool {
        self.0.x == 0 || self.0.y == 0
    }

    /// Gets the flat index of the point at `point`, if it is on the lattice.
    #[inline]
    pub fn index_of(self, point: UVec2) -> Option<usize> {
        (point.x <= self.0.x && point.y <= self.0.y)
            .then(|| point.x as usize * self.column_len() as usize + point.y as usize)
    }

    /// Gets the lattice coordinate of the point stored at `index`, if it is in range.
    #[inline]
    pub fn point_at(self, index: usize) -> Option<UVec2> {
        (index < self.point_count()).then(|| {
            let column = self.column_len() as usize;
            UVec2::new((index / column) as u32, (index % column) as u32)
        })
    }

    /// Iterates every lattice point in storage order.
    pub fn points(self) -> impl Iterator<Item = UVec2> {
        let Self(size) = self;
        (0..=size.x).flat_map(move |x| (0..=size.y).map(move |y| UVec2::new(x, y)))
    }
}

/// The per-point buffers of a generated heightfield.
///
/// `positions` and `uvs` always have exactly [`GridSize::point_count`] entries and are paired by index.
/// Positions are in the terrain's local space with z up.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    size: GridSize,
    /// The only buffer that changes after generation, and only in z.
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
}

impl HeightGrid {
    /// Assembles a grid from already generated buffers.
    ///
    /// Returns `None` if either buffer does not have one entry per lattice point.
    pub fn from_parts(size: GridSize, positions: Vec<Vec3>, uvs: Vec<Vec2>) -> Option<Self> {
        (positions.len() == size.point_count() && uvs.len() == size.point_count()).then_some(Self {
            size,
            positions,
            uvs,
        })
    }

    /// Assembles a grid from buffers the caller has already sized to the lattice.
    pub(crate) fn from_parts_unchecked(size: GridSize, positions: Vec<Vec3>, uvs: Vec<Vec2>) -> Self {
        debug_assert_eq!(positions.len(), size.point_count());
        debug_assert_eq!(uvs.len(), size.point_count());
        Self {
            size,
            positions,
            uvs,
        }
    }

    /// The lattice this grid was generated on.
    #[inline]
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Vertex positions in storage order.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Texture coordinates in storage order.
    #[inline]
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Borrows the mutable positions alongside the fixed uvs.
    #[inline]
    pub(crate) fn split_mut(&mut self) -> (&mut [Vec3], &[Vec2]) {
        (&mut self.positions, &self.uvs)
    }

    /// Gets the position of the vertex at lattice coordinate `point`.
    #[inline]
    pub fn position(&self, point: UVec2) -> Option<Vec3> {
        self.size.index_of(point).map(|i| self.positions[i])
    }

    /// Gets the height of the vertex at lattice coordinate `point`.
    #[inline]
    pub fn height(&self, point: UVec2) -> Option<f32> {
        self.position(point).map(|p| p.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_x_major_layout() {
        let size = GridSize::new(3, 2);
        for x in 0..=3 {
            for y in 0..=2 {
                let index = size.index_of(UVec2::new(x, y)).unwrap();
                assert_eq!(index, (x * 3 + y) as usize);
                assert_eq!(size.point_at(index), Some(UVec2::new(x, y)));
            }
        }
        assert_eq!(size.index_of(UVec2::new(4, 0)), None);
        assert_eq!(size.index_of(UVec2::new(0, 3)), None);
        assert_eq!(size.point_at(size.point_count()), None);
    }

    #[test]
    fn points_iterate_in_storage_order() {
        let size = GridSize::new(2, 4);
        let points: Vec<_> = size.points().collect();
        assert_eq!(points.len(), size.point_count());
        for (i, point) in points.into_iter().enumerate() {
            assert_eq!(size.index_of(point), Some(i));
        }
    }

    #[test]
    fn counts() {
        let size = GridSize::new(2, 2);
        assert_eq!(size.point_count(), 9);
        assert_eq!(size.cell_count(), 4);
        assert!(!size.is_degenerate());
        assert!(GridSize::new(0, 5).is_degenerate());
        assert_eq!(GridSize::new(0, 0).point_count(), 1);
    }

    #[test]
    fn parts_must_cover_the_lattice() {
        let size = GridSize::new(1, 1);
        assert!(HeightGrid::from_parts(size, vec![Vec3::ZERO; 4], vec![Vec2::ZERO; 4]).is_some());
        assert!(HeightGrid::from_parts(size, vec![Vec3::ZERO; 3], vec![Vec2::ZERO; 4]).is_none());
    }
}
