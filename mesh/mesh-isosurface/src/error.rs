//! Error types for isosurface extraction.

use thiserror::Error;

/// Result type for isosurface operations.
pub type IsosurfaceResult<T> = Result<T, IsosurfaceError>;

/// Errors that can occur while building volumes or extracting a surface.
///
/// Degenerate edge interpolation (two equal corner values) is not an error;
/// the crossing falls back to the edge midpoint.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum IsosurfaceError {
    /// At least one volume axis has zero length.
    #[error("invalid input: volume dimensions {dims:?} contain a zero-length axis")]
    InvalidInput {
        /// Volume dimensions (nx, ny, nz).
        dims: (usize, usize, usize),
    },

    /// A numeric parameter is out of range or not finite.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// A flat sample buffer does not match the requested dimensions.
    #[error("volume data has {actual} samples, dimensions {dims:?} need {expected}")]
    DataLengthMismatch {
        /// Requested dimensions.
        dims: (usize, usize, usize),
        /// Sample count implied by the dimensions.
        expected: usize,
        /// Sample count supplied.
        actual: usize,
    },

    /// The mesh has more vertices than a `u32` face index can address.
    #[error("mesh has {count} vertices, exceeding the u32 index space")]
    IndexOverflow {
        /// Number of vertices that would have been emitted.
        count: usize,
    },
}

impl IsosurfaceError {
    pub(crate) const fn parameter(name: &'static str, value: f64) -> Self {
        Self::InvalidParameter { name, value }
    }
}

/// Reject dimensions with a zero-length axis.
pub(crate) fn check_dimensions(dims: (usize, usize, usize)) -> IsosurfaceResult<()> {
    let (nx, ny, nz) = dims;
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(IsosurfaceError::InvalidInput { dims });
    }
    Ok(())
}

/// Require a strictly positive, finite voxel size.
pub(crate) fn check_voxel_size(voxel_size: f64) -> IsosurfaceResult<()> {
    if voxel_size > 0.0 && voxel_size.is_finite() {
        Ok(())
    } else {
        Err(IsosurfaceError::parameter("voxel_size", voxel_size))
    }
}

/// Require a finite isovalue.
pub(crate) fn check_isovalue(isovalue: f64) -> IsosurfaceResult<()> {
    if isovalue.is_finite() {
        Ok(())
    } else {
        Err(IsosurfaceError::parameter("isovalue", isovalue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_axis_is_invalid_input() {
        assert_eq!(
            check_dimensions((4, 0, 4)),
            Err(IsosurfaceError::InvalidInput { dims: (4, 0, 4) })
        );
        assert!(check_dimensions((1, 1, 1)).is_ok());
    }

    #[test]
    fn voxel_size_must_be_positive_and_finite() {
        assert!(check_voxel_size(0.5).is_ok());
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                check_voxel_size(bad),
                Err(IsosurfaceError::InvalidParameter {
                    name: "voxel_size",
                    ..
                })
            ));
        }
    }

    #[test]
    fn isovalue_must_be_finite() {
        assert!(check_isovalue(-3.5).is_ok());
        assert!(check_isovalue(f64::NAN).is_err());
        assert!(check_isovalue(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn messages_name_the_problem() {
        let err = IsosurfaceError::parameter("voxel_size", -2.0);
        assert_eq!(err.to_string(), "invalid parameter `voxel_size`: -2");

        let err = IsosurfaceError::DataLengthMismatch {
            dims: (2, 2, 2),
            expected: 8,
            actual: 7,
        };
        assert!(err.to_string().contains("need 8"));
    }
}
