//! Extraction configuration.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the traversal treats the outer faces of the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoundaryMode {
    /// Visit only cubes whose eight corners are samples. A solid touching
    /// the grid boundary produces an open surface there.
    #[default]
    Open,
    /// Surround the grid with one virtual layer of outside samples, capping
    /// solids that touch the boundary. Crossings against a virtual sample
    /// sit at the edge midpoint.
    Closed,
}

impl BoundaryMode {
    /// Lattice padding applied on each side of every axis.
    #[must_use]
    pub const fn padding(self) -> usize {
        match self {
            Self::Open => 0,
            Self::Closed => 1,
        }
    }
}

/// Configuration for marching cubes extraction.
///
/// Every setting leaves the output deterministic; sequential and parallel
/// runs of the same input produce identical meshes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MarchingCubesConfig {
    /// World position of grid sample `(0, 0, 0)`.
    pub origin: Point3<f64>,
    /// Treatment of the grid boundary.
    pub boundary: BoundaryMode,
    /// Whether to split traversal across z-slabs using rayon.
    pub parallel: bool,
    /// Minimum number of cubes before parallel traversal is used.
    pub parallel_threshold: usize,
    /// Whether to compute vertex normals. When disabled, normals are zero.
    pub compute_normals: bool,
    /// Cube edge length in samples. Values above 1 march a coarser lattice
    /// that reads every `step_size`-th sample along each axis; samples past
    /// the last full step are ignored.
    pub step_size: usize,
    /// Whether to weld coincident vertices and drop zero-area faces and
    /// opposite-wound face pairs after traversal. Such faces appear only
    /// when scalar samples lie exactly on the isovalue.
    pub remove_degenerate: bool,
}

impl Default for MarchingCubesConfig {
    fn default() -> Self {
        Self {
            origin: Point3::origin(),
            boundary: BoundaryMode::Open,
            parallel: true,
            parallel_threshold: 32_768,
            compute_normals: true,
            step_size: 1,
            remove_degenerate: true,
        }
    }
}

impl MarchingCubesConfig {
    /// Single-threaded traversal regardless of grid size.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Default::default()
        }
    }

    /// Cap solids that touch the grid boundary.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_isosurface::{BinaryVolume, MarchingCubesConfig, march_cubes_with};
    ///
    /// let solid = BinaryVolume::from_fn((3, 3, 3), |_, _, _| true);
    /// let mesh = march_cubes_with(&solid, 1.0, &MarchingCubesConfig::closed()).unwrap();
    /// assert!(mesh.topology().is_closed_manifold());
    /// assert!(mesh.signed_volume() > 0.0);
    /// ```
    #[must_use]
    pub fn closed() -> Self {
        Self {
            boundary: BoundaryMode::Closed,
            ..Default::default()
        }
    }

    /// Quick preview: march cubes two samples wide.
    ///
    /// Roughly an eighth of the cubes are visited, so the mesh has about a
    /// quarter of the faces at full resolution.
    #[must_use]
    pub fn draft() -> Self {
        Self {
            step_size: 2,
            ..Default::default()
        }
    }

    /// Set the world position of the first sample.
    #[must_use]
    pub const fn with_origin(mut self, origin: Point3<f64>) -> Self {
        self.origin = origin;
        self
    }

    /// Set the boundary mode.
    #[must_use]
    pub const fn with_boundary(mut self, boundary: BoundaryMode) -> Self {
        self.boundary = boundary;
        self
    }

    /// Enable or disable parallel traversal.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the cube count above which traversal runs in parallel.
    #[must_use]
    pub const fn with_parallel_threshold(mut self, cubes: usize) -> Self {
        self.parallel_threshold = cubes;
        self
    }

    /// Enable or disable normal computation.
    #[must_use]
    pub const fn with_normals(mut self, compute: bool) -> Self {
        self.compute_normals = compute;
        self
    }

    /// Set the cube edge length in samples.
    #[must_use]
    pub const fn with_step_size(mut self, step: usize) -> Self {
        self.step_size = step;
        self
    }

    /// Enable or disable the degenerate-face cleanup.
    #[must_use]
    pub const fn with_remove_degenerate(mut self, remove: bool) -> Self {
        self.remove_degenerate = remove;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = MarchingCubesConfig::default();
        assert_eq!(config.origin, Point3::origin());
        assert_eq!(config.boundary, BoundaryMode::Open);
        assert!(config.parallel);
        assert!(config.compute_normals);
        assert_eq!(config.step_size, 1);
        assert!(config.remove_degenerate);
    }

    #[test]
    fn presets() {
        assert!(!MarchingCubesConfig::sequential().parallel);
        assert_eq!(MarchingCubesConfig::closed().boundary, BoundaryMode::Closed);
        assert_eq!(MarchingCubesConfig::draft().step_size, 2);
    }

    #[test]
    fn builder_methods() {
        let config = MarchingCubesConfig::default()
            .with_origin(Point3::new(-2.0, -2.0, -2.0))
            .with_boundary(BoundaryMode::Closed)
            .with_parallel(false)
            .with_parallel_threshold(10)
            .with_normals(false)
            .with_step_size(3)
            .with_remove_degenerate(false);

        assert_eq!(config.origin, Point3::new(-2.0, -2.0, -2.0));
        assert_eq!(config.boundary, BoundaryMode::Closed);
        assert!(!config.parallel);
        assert_eq!(config.parallel_threshold, 10);
        assert!(!config.compute_normals);
        assert_eq!(config.step_size, 3);
        assert!(!config.remove_degenerate);
    }

    #[test]
    fn padding_per_mode() {
        assert_eq!(BoundaryMode::Open.padding(), 0);
        assert_eq!(BoundaryMode::Closed.padding(), 1);
    }
}
