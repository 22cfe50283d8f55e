//! Public extraction entry points.

use nalgebra::Vector3;
use tracing::{debug, info};

use crate::classify::{BinaryClassifier, CubeClassifier, ScalarClassifier};
use crate::cleanup::{DEGENERATE_AREA_EPSILON, remove_degenerate};
use crate::config::MarchingCubesConfig;
use crate::error::{
    IsosurfaceError, IsosurfaceResult, check_dimensions, check_isovalue, check_voxel_size,
};
use crate::march::{Lattice, Placement, march_layers, march_parallel};
use crate::normals::compute_vertex_normals;
use crate::result::MeshResult;
use crate::volume::{BinaryVolume, ScalarVolume};

/// Extract the boundary between solid and void voxels.
///
/// Every crossing sits at the midpoint of its grid edge. Uses the default
/// [`MarchingCubesConfig`]: open boundary, origin at zero.
///
/// # Errors
///
/// - [`IsosurfaceError::InvalidInput`] if any axis of `volume` has length 0.
/// - [`IsosurfaceError::InvalidParameter`] if `voxel_size` is not a positive
///   finite number.
///
/// # Example
///
/// ```
/// use mesh_isosurface::{BinaryVolume, march_cubes};
///
/// let mut volume = BinaryVolume::new((4, 4, 4));
/// volume.set(1, 1, 1, true);
/// volume.set(2, 1, 1, true);
///
/// let mesh = march_cubes(&volume, 0.5).unwrap();
/// assert_eq!(mesh.triangle_count, mesh.faces.len());
/// assert!(mesh.topology().is_closed_manifold());
/// ```
pub fn march_cubes(volume: &BinaryVolume, voxel_size: f64) -> IsosurfaceResult<MeshResult> {
    march_cubes_with(volume, voxel_size, &MarchingCubesConfig::default())
}

/// [`march_cubes`] with explicit configuration.
///
/// # Errors
///
/// As [`march_cubes`], plus [`IsosurfaceError::InvalidParameter`] for a
/// non-finite `config.origin`.
pub fn march_cubes_with(
    volume: &BinaryVolume,
    voxel_size: f64,
    config: &MarchingCubesConfig,
) -> IsosurfaceResult<MeshResult> {
    extract_with_classifier(&BinaryClassifier::new(volume), voxel_size, config)
}

/// Extract the surface where a scalar field crosses `isovalue`.
///
/// Samples with `value >= isovalue` are inside. Crossings are placed by
/// linear interpolation along each grid edge; an edge whose two samples are
/// (nearly) equal places its crossing at the midpoint.
///
/// # Errors
///
/// - [`IsosurfaceError::InvalidInput`] if any axis of `volume` has length 0.
/// - [`IsosurfaceError::InvalidParameter`] if `voxel_size` is not a positive
///   finite number or `isovalue` is not finite.
///
/// # Example
///
/// ```
/// use mesh_isosurface::{ScalarVolume, extract_isosurface};
///
/// // Distance from the grid centre; the 1.5 level set is a small sphere.
/// let volume = ScalarVolume::from_fn((8, 8, 8), |x, y, z| {
///     let d = |i: usize| i as f64 - 3.5;
///     1.5 - (d(x).powi(2) + d(y).powi(2) + d(z).powi(2)).sqrt()
/// });
///
/// let mesh = extract_isosurface(&volume, 0.0, 1.0).unwrap();
/// assert!(!mesh.is_empty());
/// assert!(mesh.signed_volume() > 0.0);
/// ```
pub fn extract_isosurface(
    volume: &ScalarVolume,
    isovalue: f64,
    voxel_size: f64,
) -> IsosurfaceResult<MeshResult> {
    extract_isosurface_with(volume, isovalue, voxel_size, &MarchingCubesConfig::default())
}

/// [`extract_isosurface`] with explicit configuration.
///
/// # Errors
///
/// As [`extract_isosurface`], plus [`IsosurfaceError::InvalidParameter`] for
/// a non-finite `config.origin`.
pub fn extract_isosurface_with(
    volume: &ScalarVolume,
    isovalue: f64,
    voxel_size: f64,
    config: &MarchingCubesConfig,
) -> IsosurfaceResult<MeshResult> {
    check_isovalue(isovalue)?;
    extract_with_classifier(&ScalarClassifier::new(volume, isovalue), voxel_size, config)
}

/// Run marching cubes over any [`CubeClassifier`].
///
/// This is the shared core behind [`march_cubes`] and
/// [`extract_isosurface`]. The output depends only on the classifier, the
/// voxel size and the non-parallel settings of `config`; the parallel
/// settings change speed, never the mesh.
///
/// # Errors
///
/// - [`IsosurfaceError::InvalidInput`] if any axis has length 0.
/// - [`IsosurfaceError::InvalidParameter`] for a bad `voxel_size`, origin
///   or a `step_size` of 0.
/// - [`IsosurfaceError::IndexOverflow`] if the mesh would need more than
///   `u32::MAX` vertices.
pub fn extract_with_classifier<C: CubeClassifier>(
    classifier: &C,
    voxel_size: f64,
    config: &MarchingCubesConfig,
) -> IsosurfaceResult<MeshResult> {
    let dims = classifier.dimensions();
    check_dimensions(dims)?;
    check_voxel_size(voxel_size)?;
    if let Some(&bad) = config.origin.coords.iter().find(|c| !c.is_finite()) {
        return Err(IsosurfaceError::parameter("origin", bad));
    }
    if config.step_size == 0 {
        return Err(IsosurfaceError::parameter("step_size", 0.0));
    }

    let lattice = Lattice::new(classifier, config.boundary.padding(), config.step_size);
    let cubes = lattice.cube_total();
    let layers = lattice.cube_counts()[2];
    let parallel = config.parallel && cubes >= config.parallel_threshold && layers >= 2;

    info!(
        dims = ?dims,
        cubes,
        boundary = ?config.boundary,
        step = config.step_size,
        parallel,
        "Starting marching cubes"
    );

    let placement = Placement {
        voxel_size: lattice.spacing(voxel_size),
        origin: config.origin,
    };
    let slab = if parallel {
        march_parallel(&lattice, placement)?
    } else {
        march_layers(&lattice, 0..layers, placement)?
    };

    let mut vertices = slab.cache.into_positions();
    let mut faces = slab.faces;
    if config.remove_degenerate {
        let spacing = placement.voxel_size;
        let summary = remove_degenerate(
            &mut vertices,
            &mut faces,
            DEGENERATE_AREA_EPSILON * spacing * spacing,
        );
        if summary.had_changes() {
            debug!(
                welded = summary.vertices_welded,
                degenerate = summary.degenerates_removed,
                duplicate = summary.duplicates_removed,
                unreferenced = summary.unreferenced_removed,
                "Removed degenerate faces"
            );
        }
    }
    let normals = if config.compute_normals {
        compute_vertex_normals(&vertices, &faces)
    } else {
        vec![Vector3::zeros(); vertices.len()]
    };

    let mesh = MeshResult::new(vertices, faces, normals);
    info!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count,
        "Marching cubes complete"
    );

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoundaryMode;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn zero_axis_is_rejected() {
        let volume = BinaryVolume::new((4, 0, 4));
        assert_eq!(
            march_cubes(&volume, 1.0),
            Err(IsosurfaceError::InvalidInput { dims: (4, 0, 4) })
        );
    }

    #[test]
    fn bad_voxel_size_is_rejected() {
        let volume = BinaryVolume::new((2, 2, 2));
        for voxel_size in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                march_cubes(&volume, voxel_size),
                Err(IsosurfaceError::InvalidParameter { name: "voxel_size", .. })
            ));
        }
    }

    #[test]
    fn bad_isovalue_is_rejected() {
        let volume = ScalarVolume::new((2, 2, 2));
        assert!(matches!(
            extract_isosurface(&volume, f64::NAN, 1.0),
            Err(IsosurfaceError::InvalidParameter { name: "isovalue", .. })
        ));
    }

    #[test]
    fn non_finite_origin_is_rejected() {
        let volume = BinaryVolume::new((2, 2, 2));
        let config = MarchingCubesConfig::default().with_origin(Point3::new(0.0, f64::NAN, 0.0));
        assert!(matches!(
            march_cubes_with(&volume, 1.0, &config),
            Err(IsosurfaceError::InvalidParameter { name: "origin", .. })
        ));
    }

    #[test]
    fn zero_step_size_is_rejected() {
        let volume = BinaryVolume::new((4, 4, 4));
        let config = MarchingCubesConfig::default().with_step_size(0);
        assert_eq!(
            march_cubes_with(&volume, 1.0, &config),
            Err(IsosurfaceError::InvalidParameter {
                name: "step_size",
                value: 0.0
            })
        );
    }

    #[test]
    fn cleanup_switch_keeps_clamped_vertices() {
        let volume = ScalarVolume::from_fn((3, 3, 3), |x, y, z| {
            if (x, y, z) == (1, 1, 1) { 1.0 } else { 0.0 }
        });

        let cleaned = extract_isosurface(&volume, 1.0, 1.0).expect("valid input");
        assert!(cleaned.is_empty());

        let config = MarchingCubesConfig::default().with_remove_degenerate(false);
        let raw = extract_isosurface_with(&volume, 1.0, 1.0, &config).expect("valid input");
        assert_eq!(raw.vertex_count(), 6);
        assert_eq!(raw.triangle_count, 8);
        // Coincident vertices give zero accumulated normals.
        assert!(raw.normals.iter().all(|n| *n == Vector3::zeros()));
    }

    #[test]
    fn unit_axis_yields_empty_mesh() {
        let volume = BinaryVolume::from_fn((5, 5, 1), |_, _, _| true);
        let mesh = march_cubes(&volume, 1.0).expect("valid input");
        assert!(mesh.is_empty());
        assert!(mesh.vertices.is_empty());
    }

    #[test]
    fn single_voxel_octahedron_in_world_units() {
        let mut volume = BinaryVolume::new((3, 3, 3));
        volume.set(1, 1, 1, true);
        let config = MarchingCubesConfig::default().with_origin(Point3::new(10.0, 0.0, 0.0));

        let mesh = march_cubes_with(&volume, 2.0, &config).expect("valid input");
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangle_count, 8);

        // Vertices sit one half-voxel from the centre sample at (12, 2, 2).
        let centre = Point3::new(12.0, 2.0, 2.0);
        for v in &mesh.vertices {
            assert_relative_eq!((v - centre).norm(), 1.0, epsilon = 1e-12);
        }
        assert!(mesh.topology().is_closed_manifold());
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn normals_disabled_are_zero() {
        let mut volume = BinaryVolume::new((3, 3, 3));
        volume.set(1, 1, 1, true);
        let config = MarchingCubesConfig::default().with_normals(false);

        let mesh = march_cubes_with(&volume, 1.0, &config).expect("valid input");
        assert_eq!(mesh.normals.len(), mesh.vertices.len());
        assert!(mesh.normals.iter().all(|n| *n == Vector3::zeros()));
    }

    #[test]
    fn closed_boundary_caps_solid_grid() {
        let volume = BinaryVolume::from_fn((3, 3, 3), |_, _, _| true);

        let open = march_cubes(&volume, 1.0).expect("valid input");
        assert!(open.is_empty());

        let config = MarchingCubesConfig::default().with_boundary(BoundaryMode::Closed);
        let closed = march_cubes_with(&volume, 1.0, &config).expect("valid input");
        assert!(closed.topology().is_closed_manifold());

        let (min, max) = closed.bounds().expect("non-empty");
        assert_relative_eq!(min, Point3::new(-0.5, -0.5, -0.5));
        assert_relative_eq!(max, Point3::new(2.5, 2.5, 2.5));
    }
}
