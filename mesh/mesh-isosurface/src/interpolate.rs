//! Placement of surface vertices along crossed cube edges.

use nalgebra::Point3;

/// Denominators smaller than this are treated as a flat edge.
pub const DEGENERATE_EPSILON: f64 = 1e-12;

/// Parameter `t ∈ [0, 1]` where the field crosses `isovalue` between two
/// samples `v0` (at `t = 0`) and `v1` (at `t = 1`).
///
/// Equal (or NaN-poisoned) samples have no usable slope; the crossing is
/// then placed at the edge midpoint.
///
/// # Example
///
/// ```
/// use mesh_isosurface::crossing_parameter;
///
/// assert_eq!(crossing_parameter(0.0, 2.0, 0.5), 0.25);
/// assert_eq!(crossing_parameter(1.0, 1.0, 1.0), 0.5);
/// assert_eq!(crossing_parameter(0.0, 1.0, 7.0), 1.0);
/// ```
#[must_use]
pub fn crossing_parameter(v0: f64, v1: f64, isovalue: f64) -> f64 {
    let denom = v1 - v0;
    if denom.is_nan() || denom.abs() < DEGENERATE_EPSILON {
        return 0.5;
    }

    let t = (isovalue - v0) / denom;
    if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) }
}

/// World position of a crossing on the grid edge that starts at lattice
/// point `low` and runs one step along `axis`.
///
/// `pad` is subtracted from lattice coordinates before scaling; it is 1 when
/// the traversal runs over a virtually padded grid.
#[inline]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn edge_position(
    low: [usize; 3],
    axis: usize,
    t: f64,
    pad: usize,
    voxel_size: f64,
    origin: &Point3<f64>,
) -> Point3<f64> {
    let mut grid = [
        low[0] as f64 - pad as f64,
        low[1] as f64 - pad as f64,
        low[2] as f64 - pad as f64,
    ];
    grid[axis] += t;

    Point3::new(
        grid[0].mul_add(voxel_size, origin.x),
        grid[1].mul_add(voxel_size, origin.y),
        grid[2].mul_add(voxel_size, origin.z),
    )
}
