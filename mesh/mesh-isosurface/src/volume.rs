//! Voxel volumes consumed by the extractor.
//!
//! Both volume kinds store samples in a flat buffer with x varying fastest,
//! then y, then z. Sample `(ix, iy, iz)` sits at grid position
//! `(ix, iy, iz) * voxel_size` relative to the extraction origin.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{IsosurfaceError, IsosurfaceResult};

/// Volume dimensions `(nx, ny, nz)`.
pub type Dimensions = (usize, usize, usize);

#[inline]
const fn linear_index(dims: Dimensions, ix: usize, iy: usize, iz: usize) -> usize {
    ix + iy * dims.0 + iz * dims.0 * dims.1
}

#[inline]
const fn in_bounds(dims: Dimensions, ix: usize, iy: usize, iz: usize) -> bool {
    ix < dims.0 && iy < dims.1 && iz < dims.2
}

fn check_len(dims: Dimensions, actual: usize) -> IsosurfaceResult<()> {
    // Saturating so that absurd dimensions read from disk report a mismatch
    // instead of overflowing.
    let expected = dims
        .0
        .checked_mul(dims.1)
        .and_then(|n| n.checked_mul(dims.2))
        .unwrap_or(usize::MAX);
    if expected == actual {
        Ok(())
    } else {
        Err(IsosurfaceError::DataLengthMismatch {
            dims,
            expected,
            actual,
        })
    }
}

fn fill_from_fn<T, F>(dims: Dimensions, mut f: F) -> Vec<T>
where
    F: FnMut(usize, usize, usize) -> T,
{
    let (nx, ny, nz) = dims;
    let mut data = Vec::with_capacity(nx * ny * nz);
    for iz in 0..nz {
        for iy in 0..ny {
            for ix in 0..nx {
                data.push(f(ix, iy, iz));
            }
        }
    }
    data
}

/// Stack `layers` copies of an `nx * ny` slice along z.
fn extrude_slice<T: Copy>(
    (nx, ny): (usize, usize),
    slice: &[T],
    layers: usize,
) -> IsosurfaceResult<(Dimensions, Vec<T>)> {
    check_len((nx, ny, 1), slice.len())?;
    let dims = (nx, ny, layers);
    let Some(total) = slice.len().checked_mul(layers) else {
        return Err(IsosurfaceError::DataLengthMismatch {
            dims,
            expected: usize::MAX,
            actual: slice.len(),
        });
    };
    let mut data = Vec::with_capacity(total);
    for _ in 0..layers {
        data.extend_from_slice(slice);
    }
    Ok((dims, data))
}

/// Unchecked serialized form; deserialization goes through `from_vec`.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawVolume<T> {
    data: Vec<T>,
    dimensions: Dimensions,
}

/// Solid/void occupancy grid.
///
/// # Example
///
/// ```
/// use mesh_isosurface::BinaryVolume;
///
/// let mut volume = BinaryVolume::new((4, 4, 4));
/// volume.set(1, 2, 1, true);
/// assert!(volume.get(1, 2, 1));
/// assert_eq!(volume.count_solid(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawVolume<bool>"))]
pub struct BinaryVolume {
    data: Vec<bool>,
    dimensions: Dimensions,
}

impl BinaryVolume {
    /// Create an all-void volume.
    #[must_use]
    pub fn new(dimensions: Dimensions) -> Self {
        let (nx, ny, nz) = dimensions;
        Self {
            data: vec![false; nx * ny * nz],
            dimensions,
        }
    }

    /// Wrap an existing occupancy buffer.
    ///
    /// # Errors
    ///
    /// Returns [`IsosurfaceError::DataLengthMismatch`] if `data.len()` is not
    /// `nx * ny * nz`.
    pub fn from_vec(dimensions: Dimensions, data: Vec<bool>) -> IsosurfaceResult<Self> {
        check_len(dimensions, data.len())?;
        Ok(Self { data, dimensions })
    }

    /// Build a volume by evaluating `f` at every sample.
    ///
    /// ```
    /// use mesh_isosurface::BinaryVolume;
    ///
    /// // 2x2x2 block in the middle of a 6^3 grid
    /// let volume = BinaryVolume::from_fn((6, 6, 6), |x, y, z| {
    ///     (2..4).contains(&x) && (2..4).contains(&y) && (2..4).contains(&z)
    /// });
    /// assert_eq!(volume.count_solid(), 8);
    /// ```
    #[must_use]
    pub fn from_fn<F>(dimensions: Dimensions, f: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> bool,
    {
        Self {
            data: fill_from_fn(dimensions, f),
            dimensions,
        }
    }

    /// Extrude a single 2D occupancy slice into `layers` identical z-layers.
    ///
    /// Segmented images often arrive one slice at a time; stacking turns a
    /// slice into a thin plate that marching cubes can mesh. Use
    /// [`MarchingCubesConfig::closed`](crate::MarchingCubesConfig::closed)
    /// to cap the plate's top and bottom.
    ///
    /// # Errors
    ///
    /// Returns [`IsosurfaceError::DataLengthMismatch`] if `slice.len()` is
    /// not `nx * ny`.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_isosurface::{BinaryVolume, MarchingCubesConfig, march_cubes_with};
    ///
    /// // A 2x1 strip in a 4x3 slice
    /// let slice: Vec<bool> = (0..12).map(|i| i == 5 || i == 6).collect();
    /// let volume = BinaryVolume::extrude((4, 3), &slice, 3).unwrap();
    /// assert_eq!(volume.dimensions(), (4, 3, 3));
    /// assert_eq!(volume.count_solid(), 6);
    ///
    /// let mesh = march_cubes_with(&volume, 1.0, &MarchingCubesConfig::closed()).unwrap();
    /// assert!(mesh.topology().is_closed_manifold());
    /// ```
    pub fn extrude(
        slice_dims: (usize, usize),
        slice: &[bool],
        layers: usize,
    ) -> IsosurfaceResult<Self> {
        let (dimensions, data) = extrude_slice(slice_dims, slice, layers)?;
        Ok(Self { data, dimensions })
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Occupancy at grid coordinates. Out-of-bounds samples are void.
    #[must_use]
    pub fn get(&self, ix: usize, iy: usize, iz: usize) -> bool {
        in_bounds(self.dimensions, ix, iy, iz)
            && self.data[linear_index(self.dimensions, ix, iy, iz)]
    }

    /// Set occupancy at grid coordinates. Out-of-bounds writes are ignored.
    pub fn set(&mut self, ix: usize, iy: usize, iz: usize, solid: bool) {
        if in_bounds(self.dimensions, ix, iy, iz) {
            let idx = linear_index(self.dimensions, ix, iy, iz);
            self.data[idx] = solid;
        }
    }

    /// Number of solid samples.
    #[must_use]
    pub fn count_solid(&self) -> usize {
        self.data.iter().filter(|&&solid| solid).count()
    }

    /// Total number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the volume has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw samples, x fastest.
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }
}

/// Scalar density grid.
///
/// # Example
///
/// ```
/// use mesh_isosurface::ScalarVolume;
///
/// let volume = ScalarVolume::from_fn((3, 3, 3), |x, y, z| (x + y + z) as f64);
/// assert_eq!(volume.get(2, 2, 2), 6.0);
/// assert_eq!(volume.value_range(), Some((0.0, 6.0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawVolume<f64>"))]
pub struct ScalarVolume {
    data: Vec<f64>,
    dimensions: Dimensions,
}

impl ScalarVolume {
    /// Create a volume filled with `0.0`.
    #[must_use]
    pub fn new(dimensions: Dimensions) -> Self {
        let (nx, ny, nz) = dimensions;
        Self {
            data: vec![0.0; nx * ny * nz],
            dimensions,
        }
    }

    /// Wrap an existing sample buffer.
    ///
    /// # Errors
    ///
    /// Returns [`IsosurfaceError::DataLengthMismatch`] if `data.len()` is not
    /// `nx * ny * nz`.
    pub fn from_vec(dimensions: Dimensions, data: Vec<f64>) -> IsosurfaceResult<Self> {
        check_len(dimensions, data.len())?;
        Ok(Self { data, dimensions })
    }

    /// Build a volume by evaluating `f` at every sample.
    #[must_use]
    pub fn from_fn<F>(dimensions: Dimensions, f: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> f64,
    {
        Self {
            data: fill_from_fn(dimensions, f),
            dimensions,
        }
    }

    /// Extrude a single 2D sample slice into `layers` identical z-layers.
    ///
    /// # Errors
    ///
    /// Returns [`IsosurfaceError::DataLengthMismatch`] if `slice.len()` is
    /// not `nx * ny`.
    pub fn extrude(
        slice_dims: (usize, usize),
        slice: &[f64],
        layers: usize,
    ) -> IsosurfaceResult<Self> {
        let (dimensions, data) = extrude_slice(slice_dims, slice, layers)?;
        Ok(Self { data, dimensions })
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Value at grid coordinates. Returns `0.0` if out of bounds.
    #[must_use]
    pub fn get(&self, ix: usize, iy: usize, iz: usize) -> f64 {
        if in_bounds(self.dimensions, ix, iy, iz) {
            self.data[linear_index(self.dimensions, ix, iy, iz)]
        } else {
            0.0
        }
    }

    /// Set the value at grid coordinates. Out-of-bounds writes are ignored.
    pub fn set(&mut self, ix: usize, iy: usize, iz: usize, value: f64) {
        if in_bounds(self.dimensions, ix, iy, iz) {
            let idx = linear_index(self.dimensions, ix, iy, iz);
            self.data[idx] = value;
        }
    }

    /// Smallest and largest sample, or `None` for an empty volume.
    ///
    /// NaN samples are skipped.
    #[must_use]
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Total number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the volume has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw samples, x fastest.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(feature = "serde")]
impl TryFrom<RawVolume<bool>> for BinaryVolume {
    type Error = IsosurfaceError;

    fn try_from(raw: RawVolume<bool>) -> IsosurfaceResult<Self> {
        Self::from_vec(raw.dimensions, raw.data)
    }
}

#[cfg(feature = "serde")]
impl TryFrom<RawVolume<f64>> for ScalarVolume {
    type Error = IsosurfaceError;

    fn try_from(raw: RawVolume<f64>) -> IsosurfaceResult<Self> {
        Self::from_vec(raw.dimensions, raw.data)
    }
}
