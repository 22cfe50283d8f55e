//! Property-based tests for isosurface extraction.
//!
//! These tests use proptest to generate random voxel volumes and verify
//! mesh invariants.
//!
//! Run with: cargo test -p mesh-isosurface -- proptest

#![allow(clippy::cast_precision_loss)]

use mesh_isosurface::{
    BinaryVolume, MarchingCubesConfig, ScalarVolume, extract_isosurface_with, march_cubes,
    march_cubes_with,
};
use proptest::prelude::*;

// =============================================================================
// Strategies for generating random volumes
// =============================================================================

/// Random occupancy with a one-voxel void border, so the solid never touches
/// the grid boundary.
fn arb_interior_volume(max_side: usize) -> impl Strategy<Value = BinaryVolume> {
    (3..=max_side, 3..=max_side, 3..=max_side).prop_flat_map(|(nx, ny, nz)| {
        prop::collection::vec(any::<bool>(), nx * ny * nz).prop_map(move |bits| {
            BinaryVolume::from_fn((nx, ny, nz), |x, y, z| {
                let interior =
                    x > 0 && y > 0 && z > 0 && x + 1 < nx && y + 1 < ny && z + 1 < nz;
                interior && bits[x + nx * (y + ny * z)]
            })
        })
    })
}

/// Random occupancy anywhere in the grid.
fn arb_volume(max_side: usize) -> impl Strategy<Value = BinaryVolume> {
    (1..=max_side, 1..=max_side, 1..=max_side).prop_flat_map(|(nx, ny, nz)| {
        prop::collection::vec(any::<bool>(), nx * ny * nz).prop_map(move |bits| {
            BinaryVolume::from_vec((nx, ny, nz), bits).unwrap()
        })
    })
}

/// Random scalar field with values in `[-1, 1]`.
fn arb_scalar_volume(max_side: usize) -> impl Strategy<Value = ScalarVolume> {
    (2..=max_side, 2..=max_side, 2..=max_side).prop_flat_map(|(nx, ny, nz)| {
        prop::collection::vec(-1.0..1.0f64, nx * ny * nz).prop_map(move |values| {
            ScalarVolume::from_vec((nx, ny, nz), values).unwrap()
        })
    })
}

/// Scalar field whose samples are `-1`, `0` or `1`, so many samples sit
/// exactly on a zero isovalue.
fn arb_quantized_volume(max_side: usize) -> impl Strategy<Value = ScalarVolume> {
    (2..=max_side, 2..=max_side, 2..=max_side).prop_flat_map(|(nx, ny, nz)| {
        prop::collection::vec(-1_i8..=1, nx * ny * nz).prop_map(move |levels| {
            let values = levels.into_iter().map(f64::from).collect();
            ScalarVolume::from_vec((nx, ny, nz), values).unwrap()
        })
    })
}

// =============================================================================
// Property Tests: Topology
// =============================================================================

proptest! {
    /// A solid strictly inside the grid gives a closed manifold.
    #[test]
    fn interior_solid_is_closed_manifold(volume in arb_interior_volume(8)) {
        let mesh = march_cubes(&volume, 1.0).unwrap();
        let report = mesh.topology();

        prop_assert!(report.is_closed_manifold(), "{}", report);
        prop_assert_eq!(mesh.is_empty(), volume.count_solid() == 0);
    }

    /// Outward winding gives positive enclosed volume.
    #[test]
    fn interior_solid_has_positive_volume(volume in arb_interior_volume(8)) {
        let mesh = march_cubes(&volume, 1.0).unwrap();
        if !mesh.is_empty() {
            prop_assert!(mesh.signed_volume() > 0.0);
        }
    }

    /// Closed boundary mode caps any solid.
    #[test]
    fn closed_boundary_is_always_closed(volume in arb_volume(6)) {
        let mesh = march_cubes_with(&volume, 1.0, &MarchingCubesConfig::closed()).unwrap();
        prop_assert!(mesh.topology().is_closed_manifold());
    }

    /// No edge is ever shared by more than two faces.
    #[test]
    fn open_boundary_is_manifold(volume in arb_volume(6)) {
        let mesh = march_cubes(&volume, 1.0).unwrap();
        prop_assert!(mesh.topology().is_manifold());
    }
}

// =============================================================================
// Property Tests: Output Layout
// =============================================================================

proptest! {
    /// Face indices are in range and buffers agree in length.
    #[test]
    fn buffers_are_consistent(volume in arb_scalar_volume(7), iso in -0.5..0.5f64) {
        let mesh = extract_isosurface_with(&volume, iso, 0.5, &MarchingCubesConfig::default())
            .unwrap();

        let vertex_count = mesh.vertices.len() as u32;
        for face in &mesh.faces {
            for &i in face {
                prop_assert!(i < vertex_count, "Face index {} >= vertex count {}", i, vertex_count);
            }
        }
        prop_assert_eq!(mesh.normals.len(), mesh.vertices.len());
        prop_assert_eq!(mesh.triangle_count, mesh.faces.len());
    }

    /// Scalar vertices stay inside the sampled box.
    #[test]
    fn vertices_stay_in_grid(volume in arb_scalar_volume(7), iso in -0.5..0.5f64) {
        let (nx, ny, nz) = volume.dimensions();
        let mesh = extract_isosurface_with(&volume, iso, 1.0, &MarchingCubesConfig::default())
            .unwrap();

        for v in &mesh.vertices {
            prop_assert!((0.0..=(nx - 1) as f64).contains(&v.x));
            prop_assert!((0.0..=(ny - 1) as f64).contains(&v.y));
            prop_assert!((0.0..=(nz - 1) as f64).contains(&v.z));
        }
    }

    /// Every vertex is referenced by at least one face.
    #[test]
    fn no_orphan_vertices(volume in arb_volume(6)) {
        let mesh = march_cubes(&volume, 1.0).unwrap();
        let mut used = vec![false; mesh.vertices.len()];
        for face in &mesh.faces {
            for &i in face {
                used[i as usize] = true;
            }
        }
        prop_assert!(used.into_iter().all(|u| u));
    }
}

// =============================================================================
// Property Tests: Degenerate Cleanup
// =============================================================================

proptest! {
    /// Samples on the isovalue never leave zero-area faces behind.
    #[test]
    fn cleanup_leaves_no_zero_area_faces(volume in arb_quantized_volume(6)) {
        let mesh = extract_isosurface_with(&volume, 0.0, 1.0, &MarchingCubesConfig::default())
            .unwrap();

        for i in 0..mesh.face_count() {
            let [a, b, c] = mesh.triangle(i).unwrap();
            let area = (b - a).cross(&(c - a)).norm() * 0.5;
            prop_assert!(area > 1e-12, "face {} has area {}", i, area);
        }
        prop_assert_eq!(mesh.normals.len(), mesh.vertices.len());
    }

    /// Welding and dropping collapsed faces leaves the enclosed volume alone.
    #[test]
    fn cleanup_preserves_volume(volume in arb_quantized_volume(6)) {
        let config = MarchingCubesConfig::closed();
        let cleaned = extract_isosurface_with(&volume, 0.0, 1.0, &config).unwrap();
        let raw = extract_isosurface_with(
            &volume,
            0.0,
            1.0,
            &config.clone().with_remove_degenerate(false),
        )
        .unwrap();

        prop_assert!(cleaned.triangle_count <= raw.triangle_count);
        prop_assert!(cleaned.vertex_count() <= raw.vertex_count());
        prop_assert!((cleaned.signed_volume() - raw.signed_volume()).abs() < 1e-9);
        prop_assert!(cleaned.topology().is_watertight());
    }
}

// =============================================================================
// Property Tests: Determinism
// =============================================================================

proptest! {
    /// Parallel slabs merge to the sequential mesh exactly.
    #[test]
    fn parallel_equals_sequential(volume in arb_scalar_volume(10), iso in -0.5..0.5f64) {
        let sequential = MarchingCubesConfig::sequential();
        let parallel = MarchingCubesConfig::default().with_parallel_threshold(0);

        let a = extract_isosurface_with(&volume, iso, 1.0, &sequential).unwrap();
        let b = extract_isosurface_with(&volume, iso, 1.0, &parallel).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Closed-boundary binary extraction is also schedule independent.
    #[test]
    fn parallel_equals_sequential_closed(volume in arb_volume(8)) {
        let sequential = MarchingCubesConfig::closed().with_parallel(false);
        let parallel = MarchingCubesConfig::closed().with_parallel_threshold(0);

        let a = march_cubes_with(&volume, 1.0, &sequential).unwrap();
        let b = march_cubes_with(&volume, 1.0, &parallel).unwrap();
        prop_assert_eq!(a, b);
    }
}
