//! Corner classification strategies.
//!
//! The traversal is shared between binary and scalar volumes; the only
//! differences are how a corner is judged inside and where a crossing lands
//! along an edge. [`CubeClassifier`] captures exactly that.

use crate::interpolate::crossing_parameter;
use crate::volume::{BinaryVolume, Dimensions, ScalarVolume};

/// Inside/outside test and edge crossing for one kind of volume.
///
/// Implementations must be deterministic: the same sample pair always yields
/// the same crossing, which keeps sequential and parallel extraction
/// bit-identical.
pub trait CubeClassifier: Sync {
    /// Raw sample read from the volume.
    type Sample: Copy + Send + Sync;

    /// Grid dimensions `(nx, ny, nz)`.
    fn dimensions(&self) -> Dimensions;

    /// Sample at in-bounds grid coordinates.
    fn sample(&self, ix: usize, iy: usize, iz: usize) -> Self::Sample;

    /// Whether a sample lies inside the surface.
    fn is_inside(&self, sample: Self::Sample) -> bool;

    /// Crossing parameter in `[0, 1]` measured from `low` towards `high`.
    fn crossing(&self, low: Self::Sample, high: Self::Sample) -> f64;
}

/// Pack eight corner flags into a cube configuration index.
///
/// Bit `i` is set when corner `i` is inside.
///
/// ```
/// use mesh_isosurface::pack_corners;
///
/// assert_eq!(pack_corners([false; 8]), 0);
/// assert_eq!(pack_corners([true; 8]), 255);
/// assert_eq!(pack_corners([true, false, false, true, false, false, false, false]), 0b1001);
/// ```
#[must_use]
pub fn pack_corners(inside: [bool; 8]) -> u8 {
    inside
        .iter()
        .enumerate()
        .fold(0_u8, |index, (corner, &flag)| {
            if flag { index | (1 << corner) } else { index }
        })
}

/// Occupied voxels are inside; every crossing sits at the edge midpoint.
#[derive(Debug, Clone, Copy)]
pub struct BinaryClassifier<'a> {
    volume: &'a BinaryVolume,
}

impl<'a> BinaryClassifier<'a> {
    /// Classify corners of `volume`.
    #[must_use]
    pub const fn new(volume: &'a BinaryVolume) -> Self {
        Self { volume }
    }
}

impl CubeClassifier for BinaryClassifier<'_> {
    type Sample = bool;

    fn dimensions(&self) -> Dimensions {
        self.volume.dimensions()
    }

    #[inline]
    fn sample(&self, ix: usize, iy: usize, iz: usize) -> bool {
        self.volume.get(ix, iy, iz)
    }

    #[inline]
    fn is_inside(&self, sample: bool) -> bool {
        sample
    }

    #[inline]
    fn crossing(&self, _low: bool, _high: bool) -> f64 {
        0.5
    }
}

/// Samples at or above the isovalue are inside; crossings are linearly
/// interpolated.
#[derive(Debug, Clone, Copy)]
pub struct ScalarClassifier<'a> {
    volume: &'a ScalarVolume,
    isovalue: f64,
}

impl<'a> ScalarClassifier<'a> {
    /// Classify corners of `volume` against `isovalue`.
    #[must_use]
    pub const fn new(volume: &'a ScalarVolume, isovalue: f64) -> Self {
        Self { volume, isovalue }
    }

    /// The threshold separating inside from outside.
    #[must_use]
    pub const fn isovalue(&self) -> f64 {
        self.isovalue
    }
}

impl CubeClassifier for ScalarClassifier<'_> {
    type Sample = f64;

    fn dimensions(&self) -> Dimensions {
        self.volume.dimensions()
    }

    #[inline]
    fn sample(&self, ix: usize, iy: usize, iz: usize) -> f64 {
        self.volume.get(ix, iy, iz)
    }

    #[inline]
    fn is_inside(&self, sample: f64) -> bool {
        sample >= self.isovalue
    }

    #[inline]
    fn crossing(&self, low: f64, high: f64) -> f64 {
        crossing_parameter(low, high, self.isovalue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pack_sets_one_bit_per_corner() {
        for corner in 0..8 {
            let mut flags = [false; 8];
            flags[corner] = true;
            assert_eq!(pack_corners(flags), 1 << corner);
        }
    }

    #[test]
    fn binary_inside_is_occupancy() {
        let mut volume = BinaryVolume::new((2, 2, 2));
        volume.set(1, 1, 1, true);
        let classifier = BinaryClassifier::new(&volume);

        assert!(classifier.is_inside(classifier.sample(1, 1, 1)));
        assert!(!classifier.is_inside(classifier.sample(0, 0, 0)));
        assert_relative_eq!(classifier.crossing(true, false), 0.5);
    }

    #[test]
    fn scalar_threshold_is_inclusive() {
        let volume = ScalarVolume::from_fn((2, 1, 1), |x, _, _| x as f64);
        let classifier = ScalarClassifier::new(&volume, 1.0);

        assert!(classifier.is_inside(1.0));
        assert!(!classifier.is_inside(0.999));
        assert!(!classifier.is_inside(f64::NAN));
    }

    #[test]
    fn scalar_crossing_interpolates() {
        let volume = ScalarVolume::new((1, 1, 1));
        let classifier = ScalarClassifier::new(&volume, 0.5);

        assert_relative_eq!(classifier.crossing(0.0, 2.0), 0.25);
        assert_relative_eq!(classifier.crossing(0.5, 0.5), 0.5);
    }
}
