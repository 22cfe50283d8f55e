//! Extracted mesh.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::topology::TopologyReport;

/// Triangle mesh produced by one extraction.
///
/// - `vertices` are in creation order (the order crossed edges were first
///   reached by the z-major cube traversal).
/// - `faces` are in generation order and wind counter-clockwise when viewed
///   from outside the solid.
/// - `normals` has one entry per vertex; unreferenced or degenerate vertices
///   carry a zero vector.
///
/// The result is owned by the caller and independent of the source volume.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshResult {
    /// Vertex positions in world units.
    pub vertices: Vec<Point3<f64>>,
    /// Triangles as indices into `vertices`.
    pub faces: Vec<[u32; 3]>,
    /// Unit vertex normals (or zero).
    pub normals: Vec<Vector3<f64>>,
    /// Number of triangles; always `faces.len()`.
    pub triangle_count: usize,
}

impl MeshResult {
    /// Assemble a result from its parts.
    #[must_use]
    pub fn new(
        vertices: Vec<Point3<f64>>,
        faces: Vec<[u32; 3]>,
        normals: Vec<Vector3<f64>>,
    ) -> Self {
        let triangle_count = faces.len();
        Self {
            vertices,
            faces,
            normals,
            triangle_count,
        }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// The three corner positions of a face.
    #[must_use]
    pub fn triangle(&self, face: usize) -> Option<[Point3<f64>; 3]> {
        let [a, b, c] = *self.faces.get(face)?;
        Some([
            *self.vertices.get(a as usize)?,
            *self.vertices.get(b as usize)?,
            *self.vertices.get(c as usize)?,
        ])
    }

    /// Signed enclosed volume by the divergence theorem.
    ///
    /// Sums the signed tetrahedra spanned by each face and the origin.
    /// Positive for a closed mesh with outward winding; meaningless for an
    /// open mesh.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let volume: f64 = (0..self.faces.len())
            .filter_map(|i| self.triangle(i))
            .map(|[v0, v1, v2]| v0.coords.dot(&v1.coords.cross(&v2.coords)))
            .sum();
        volume / 6.0
    }

    /// Absolute value of [`signed_volume`](Self::signed_volume).
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Total triangle area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        (0..self.faces.len())
            .filter_map(|i| self.triangle(i))
            .map(|[v0, v1, v2]| (v1 - v0).cross(&(v2 - v0)).norm() * 0.5)
            .sum()
    }

    /// Axis-aligned bounds `(min, max)` of the vertices, or `None` if there
    /// are none.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), p| {
            (lo.inf(p), hi.sup(p))
        }))
    }

    /// Edge-sharing analysis of the faces.
    #[must_use]
    pub fn topology(&self) -> TopologyReport {
        TopologyReport::from_faces(&self.faces)
    }
}

impl std::fmt::Display for MeshResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Isosurface: {} vertices, {} triangles",
            self.vertices.len(),
            self.triangle_count
        )?;
        if let Some((min, max)) = self.bounds() {
            write!(
                f,
                ", bounds [{:.3}, {:.3}, {:.3}] - [{:.3}, {:.3}, {:.3}]",
                min.x, min.y, min.z, max.x, max.y, max.z
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Unit tetrahedron with outward winding.
    fn tetrahedron() -> MeshResult {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
        MeshResult::new(vertices, faces, vec![Vector3::zeros(); 4])
    }

    #[test]
    fn counts() {
        let mesh = tetrahedron();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.triangle_count, 4);
        assert!(!mesh.is_empty());
        assert!(MeshResult::default().is_empty());
    }

    #[test]
    fn tetrahedron_volume_is_positive() {
        let mesh = tetrahedron();
        assert_relative_eq!(mesh.signed_volume(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn flipped_winding_negates_volume() {
        let mut mesh = tetrahedron();
        for face in &mut mesh.faces {
            face.swap(1, 2);
        }
        assert_relative_eq!(mesh.signed_volume(), -1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.volume(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn surface_area() {
        let mesh = tetrahedron();
        let expected = 1.5 + 3.0_f64.sqrt() / 2.0;
        assert_relative_eq!(mesh.surface_area(), expected, epsilon = 1e-12);
    }

    #[test]
    fn bounds() {
        let mesh = tetrahedron();
        let (min, max) = mesh.bounds().expect("non-empty");
        assert_relative_eq!(min, Point3::origin());
        assert_relative_eq!(max, Point3::new(1.0, 1.0, 1.0));
        assert!(MeshResult::default().bounds().is_none());
    }

    #[test]
    fn triangle_lookup() {
        let mesh = tetrahedron();
        let [a, _, c] = mesh.triangle(3).expect("face exists");
        assert_relative_eq!(a, Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(c, Point3::new(0.0, 0.0, 1.0));
        assert!(mesh.triangle(4).is_none());
    }

    #[test]
    fn display_summary() {
        let text = tetrahedron().to_string();
        assert!(text.starts_with("Isosurface: 4 vertices, 4 triangles"));
        assert_eq!(
            MeshResult::default().to_string(),
            "Isosurface: 0 vertices, 0 triangles"
        );
    }
}
