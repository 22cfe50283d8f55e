//! Area-weighted vertex normals.

use nalgebra::{Point3, Vector3};

/// Accumulated normals shorter than this are left as zero vectors.
pub const NORMAL_EPSILON: f64 = 1e-12;

/// Per-vertex normals from face winding.
///
/// Each face adds its un-normalized cross product (twice its area times the
/// unit normal) to its three vertices; the sums are then normalized.
/// Vertices no face references, or whose contributions cancel, keep a zero
/// normal.
///
/// Faces referencing a vertex outside `vertices` are skipped.
///
/// # Example
///
/// ```
/// use mesh_isosurface::compute_vertex_normals;
/// use nalgebra::{Point3, Vector3};
///
/// let vertices = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(5.0, 5.0, 5.0),
/// ];
/// let normals = compute_vertex_normals(&vertices, &[[0, 1, 2]]);
/// assert_eq!(normals[0], Vector3::z());
/// assert_eq!(normals[3], Vector3::zeros());
/// ```
#[must_use]
pub fn compute_vertex_normals(vertices: &[Point3<f64>], faces: &[[u32; 3]]) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); vertices.len()];

    for face in faces {
        let [i0, i1, i2] = face.map(|i| i as usize);
        let (Some(v0), Some(v1), Some(v2)) = (vertices.get(i0), vertices.get(i1), vertices.get(i2))
        else {
            continue;
        };

        let face_normal = (v1 - v0).cross(&(v2 - v0));
        normals[i0] += face_normal;
        normals[i1] += face_normal;
        normals[i2] += face_normal;
    }

    for normal in &mut normals {
        let length = normal.norm();
        if length >= NORMAL_EPSILON {
            *normal /= length;
        }
    }

    normals
}
