//! Marching cubes isosurface extraction for voxel scaffolds.
//!
//! This crate turns a voxelized volume into a triangle mesh ready for
//! export to a slicer or STL writer. Two kinds of volume are supported:
//!
//! - [`BinaryVolume`]: solid/void occupancy, e.g. a segmented micro-CT scan.
//!   Crossings sit at edge midpoints.
//! - [`ScalarVolume`]: a density or distance field with an isovalue.
//!   Crossings are linearly interpolated.
//!
//! # Layer 0 Crate
//!
//! No engine, rendering or file-format dependencies. Volumes come in from
//! an upstream segmentation step and [`MeshResult`] goes out to whatever
//! writes STL.
//!
//! # Guarantees
//!
//! - **Shared vertices**: every physical grid edge yields at most one
//!   vertex, so a solid lying strictly inside the grid produces a closed
//!   manifold mesh (every edge shared by exactly two triangles).
//! - **Outward winding**: faces wind counter-clockwise seen from outside the
//!   solid, and normals point away from it.
//! - **Determinism**: the same input gives the same vertex order, face order
//!   and coordinates, whether or not the traversal runs in parallel.
//! - **No zero-area faces**: scalar samples lying exactly on the isovalue
//!   collapse crossings onto one point; those vertices are welded and the
//!   collapsed faces dropped (see [`MarchingCubesConfig::remove_degenerate`]).
//!
//! The classic Lorensen & Cline triangle table is used unchanged; its
//! ambiguous-face cases are not resolved.
//!
//! # Example
//!
//! ```
//! use mesh_isosurface::{BinaryVolume, march_cubes};
//!
//! // A 4x4x4 solid block with a one-voxel void border
//! let volume = BinaryVolume::from_fn((6, 6, 6), |x, y, z| {
//!     (1..5).contains(&x) && (1..5).contains(&y) && (1..5).contains(&z)
//! });
//!
//! let mesh = march_cubes(&volume, 0.1).unwrap();
//! let report = mesh.topology();
//!
//! assert!(report.is_closed_manifold());
//! assert!(mesh.signed_volume() > 0.0);
//! println!("{mesh}");
//! ```
//!
//! # Boundary handling
//!
//! Only cubes whose eight corners are samples are visited, so a solid
//! touching the grid boundary is left open there. Use
//! [`MarchingCubesConfig::closed`] to cap it instead.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod classify;
mod cleanup;
mod config;
mod edge_cache;
mod error;
mod extract;
mod interpolate;
mod march;
mod normals;
mod result;
pub mod tables;
mod topology;
mod triangulate;
mod volume;

pub use classify::{BinaryClassifier, CubeClassifier, ScalarClassifier, pack_corners};
pub use cleanup::{
    CleanupSummary, DEGENERATE_AREA_EPSILON, remove_cancelling_faces, remove_degenerate,
    remove_degenerate_faces, remove_unreferenced_vertices, weld_coincident_vertices,
};
pub use config::{BoundaryMode, MarchingCubesConfig};
pub use edge_cache::{EdgeKey, VertexCache};
pub use error::{IsosurfaceError, IsosurfaceResult};
pub use extract::{
    extract_isosurface, extract_isosurface_with, extract_with_classifier, march_cubes,
    march_cubes_with,
};
pub use interpolate::{DEGENERATE_EPSILON, crossing_parameter};
pub use normals::{NORMAL_EPSILON, compute_vertex_normals};
pub use result::MeshResult;
pub use topology::{EdgeAdjacency, TopologyReport};
pub use volume::{BinaryVolume, Dimensions, ScalarVolume};
