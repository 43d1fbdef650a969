//! Contains the buffers a terrain is made of and the logic that fills them.

pub mod grid;
pub mod normals;
pub mod triangles;
