#![allow(
    clippy::doc_markdown,
    reason = "These rules should not apply to the readme."
)]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod deform;
pub mod error;
pub mod generator;
pub mod storage;
pub mod surface;
pub mod terrain;

pub use config::{CraterConfig, TerrainConfig};
pub use deform::{DeformationEngine, ImpactFrame, ImpactReport, RefreshPolicy, SurfaceState};
pub use error::TerrainError;
pub use generator::{NoiseTerrain, TerrainGenerator};
pub use storage::grid::{GridSize, HeightGrid};
pub use surface::{MeshSurface, SurfaceBuffers};
pub use terrain::{Impact, Terrain};
