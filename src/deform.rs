//! Carves craters into a heightfield where impacts land.
//!
//! An impact lowers every vertex strictly within [`CraterConfig::radius`] of it by a fixed [`CraterConfig::depth`].
//! There is no falloff, so crater walls are a hard step.
//! Heights only ever go down, and the vertex buffer is never resized.
//!
//! After vertices move, the render surface is stale until it is refreshed.
//! [`DeformationEngine`] tracks that as a two state machine, [`SurfaceState`],
//! and decides when to refresh according to its [`RefreshPolicy`].

use bevy_math::{Affine3A, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::CraterConfig;

/// When the render surface is re-uploaded while an impact is applied.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Refresh once after all vertices of an impact have moved.
    #[default]
    PerImpact,
    /// Re-upload the whole vertex buffer after each lowered vertex, so an impact lowering `n` vertices refreshes `n` times.
    /// A miss still flushes a surface that was already stale.
    PerVertex,
}

/// Which frame an impact point is compared against the local vertices in.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactFrame {
    /// Bring the impact fully into the terrain's local space with the inverse of its transform.
    #[default]
    Local,
    /// Only subtract the terrain's world translation from the impact.
    /// This ignores rotation and scale, so it only agrees with [`Local`](Self::Local) for unrotated, unscaled terrains.
    OriginOffset,
}

impl ImpactFrame {
    /// Maps a world space `impact` into the frame vertices are tested in.
    pub fn to_local(self, impact: Vec3, terrain_transform: &Affine3A) -> Vec3 {
        match self {
            Self::Local => terrain_transform.inverse().transform_point3(impact),
            Self::OriginOffset => impact - Vec3::from(terrain_transform.translation),
        }
    }
}

/// Whether the render surface reflects the current vertex data.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum SurfaceState {
    /// Nothing changed since the last upload.
    #[default]
    Clean,
    /// Vertices moved and the surface has not been told yet.
    Dirty,
}

/// What a single impact did.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct ImpactReport {
    /// Flat indices of every vertex that was lowered, in storage order.
    pub lowered: Vec<usize>,
    /// How many times the surface was refreshed while applying the impact.
    pub refreshes: usize,
}

impl ImpactReport {
    /// True if the impact missed every vertex.
    #[inline]
    pub fn is_miss(&self) -> bool {
        self.lowered.is_empty()
    }
}

/// Applies impacts to a vertex buffer and tracks whether the surface needs refreshing.
#[derive(Debug, Clone)]
pub struct DeformationEngine {
    crater: CraterConfig,
    state: SurfaceState,
}

impl DeformationEngine {
    /// Creates an engine in the [`SurfaceState::Clean`] state.
    pub fn new(crater: CraterConfig) -> Self {
        Self {
            crater,
            state: SurfaceState::Clean,
        }
    }

    /// The crater parameters this engine applies.
    #[inline]
    pub fn crater(&self) -> &CraterConfig {
        &self.crater
    }

    /// Whether the surface is stale.
    #[inline]
    pub fn state(&self) -> SurfaceState {
        self.state
    }

    /// Flags the surface as stale without moving any vertex, for when other buffers change.
    #[inline]
    pub(crate) fn mark_dirty(&mut self) {
        self.state = SurfaceState::Dirty;
    }

    /// Lowers every vertex within the crater radius of `local_impact`, without refreshing anything.
    ///
    /// `local_impact` must already be in the vertices' frame, see [`ImpactFrame::to_local`].
    /// Returns the indices that moved, and leaves the engine [`Dirty`](SurfaceState::Dirty) if any did.
    /// A NaN impact compares false against every vertex, so it is a miss.
    pub fn carve(&mut self, positions: &mut [Vec3], local_impact: Vec3) -> Vec<usize> {
        let mut lowered = Vec::new();
        self.carve_with(positions, local_impact, |index, _| lowered.push(index));
        lowered
    }

    /// Lowers vertices around `local_impact`, calling `on_lowered` with the index and the buffer right after each one moves.
    fn carve_with(
        &mut self,
        positions: &mut [Vec3],
        local_impact: Vec3,
        mut on_lowered: impl FnMut(usize, &[Vec3]),
    ) {
        let CraterConfig { radius, depth, .. } = self.crater;
        for index in 0..positions.len() {
            if positions[index].distance(local_impact) < radius {
                positions[index].z -= depth;
                self.state = SurfaceState::Dirty;
                on_lowered(index, &*positions);
            }
        }
    }

    /// Applies a world space impact to `positions`, which are local to a terrain placed at `terrain_transform`.
    ///
    /// `refresh` is the surface collaborator; it is handed the whole vertex buffer whenever the [`RefreshPolicy`] calls for an upload.
    /// An impact that misses every vertex never calls it, unless the surface was already [`Dirty`](SurfaceState::Dirty), in which case it is flushed once.
    pub fn apply_impact(
        &mut self,
        positions: &mut [Vec3],
        impact: Vec3,
        terrain_transform: &Affine3A,
        mut refresh: impl FnMut(&[Vec3]),
    ) -> ImpactReport {
        let local_impact = self.crater.frame.to_local(impact, terrain_transform);
        let mut report = ImpactReport::default();

        match self.crater.refresh {
            RefreshPolicy::PerImpact => {
                report.lowered = self.carve(positions, local_impact);
                if self.flush(positions, &mut refresh) {
                    report.refreshes = 1;
                }
            }
            RefreshPolicy::PerVertex => {
                let mut refreshes = 0;
                self.carve_with(positions, local_impact, |index, positions| {
                    report.lowered.push(index);
                    refresh(positions);
                    refreshes += 1;
                });
                if refreshes > 0 {
                    // The last upload already carried every moved vertex.
                    report.refreshes = refreshes;
                    self.state = SurfaceState::Clean;
                } else if self.flush(positions, &mut refresh) {
                    report.refreshes = 1;
                }
            }
        }

        debug!(
            ?impact,
            ?local_impact,
            lowered = report.lowered.len(),
            refreshes = report.refreshes,
            "applied impact"
        );
        report
    }

    /// Hands `positions` to `refresh` if the surface is stale, returning whether it did.
    /// Afterwards the engine is [`Clean`](SurfaceState::Clean).
    pub fn flush(&mut self, positions: &[Vec3], mut refresh: impl FnMut(&[Vec3])) -> bool {
        match self.state {
            SurfaceState::Clean => false,
            SurfaceState::Dirty => {
                trace!(vertices = positions.len(), "refreshing terrain surface");
                refresh(positions);
                self.state = SurfaceState::Clean;
                true
            }
        }
    }
}
