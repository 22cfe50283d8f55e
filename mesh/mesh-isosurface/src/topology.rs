//! Edge-sharing analysis for extracted meshes.
//!
//! A surface that encloses a solid lying strictly inside the sampled grid
//! has every edge shared by exactly two triangles. Edges used once appear
//! only where the solid is cut open by the grid boundary.

use hashbrown::HashMap;
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of faces using each undirected edge.
#[derive(Debug, Clone, Default)]
pub struct EdgeAdjacency {
    /// Maps edge (v0, v1) to its face count. v0 < v1.
    edge_faces: HashMap<(u32, u32), usize>,
}

impl EdgeAdjacency {
    /// Count edge uses over `faces`.
    ///
    /// ```
    /// use mesh_isosurface::EdgeAdjacency;
    ///
    /// let adj = EdgeAdjacency::build(&[[0, 1, 2], [1, 3, 2]]);
    /// assert_eq!(adj.edge_count(), 5);
    /// assert_eq!(adj.face_count(2, 1), 2);
    /// assert_eq!(adj.face_count(0, 1), 1);
    /// ```
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_faces: HashMap<(u32, u32), usize> =
            HashMap::with_capacity(faces.len() * 3 / 2);

        for face in faces {
            let edges = [
                normalize_edge(face[0], face[1]),
                normalize_edge(face[1], face[2]),
                normalize_edge(face[2], face[0]),
            ];
            for edge in edges {
                *edge_faces.entry(edge).or_default() += 1;
            }
        }

        Self { edge_faces }
    }

    /// Faces sharing the edge between `v0` and `v1` (0 if absent).
    #[must_use]
    pub fn face_count(&self, v0: u32, v1: u32) -> usize {
        self.edge_faces
            .get(&normalize_edge(v0, v1))
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_faces.len()
    }

    /// Edges used by exactly one face.
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_faces
            .iter()
            .filter(|&(_, &count)| count == 1)
            .map(|(&edge, _)| edge)
    }

    /// Edges used by more than two faces.
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_faces
            .iter()
            .filter(|&(_, &count)| count > 2)
            .map(|(&edge, _)| edge)
    }
}

/// Summary of edge sharing in a mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TopologyReport {
    /// Number of triangles inspected.
    pub face_count: usize,
    /// Number of distinct edges.
    pub edge_count: usize,
    /// Edges used by exactly one face.
    pub boundary_edge_count: usize,
    /// Edges used by more than two faces.
    pub non_manifold_edge_count: usize,
}

impl TopologyReport {
    /// Analyse `faces`.
    ///
    /// ```
    /// use mesh_isosurface::TopologyReport;
    ///
    /// // Closed tetrahedron.
    /// let report = TopologyReport::from_faces(&[[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]]);
    /// assert!(report.is_closed_manifold());
    /// assert_eq!(report.edge_count, 6);
    /// ```
    #[must_use]
    pub fn from_faces(faces: &[[u32; 3]]) -> Self {
        let adjacency = EdgeAdjacency::build(faces);
        let report = Self {
            face_count: faces.len(),
            edge_count: adjacency.edge_count(),
            boundary_edge_count: adjacency.boundary_edges().count(),
            non_manifold_edge_count: adjacency.non_manifold_edges().count(),
        };

        if report.non_manifold_edge_count > 0 {
            warn!(
                non_manifold = report.non_manifold_edge_count,
                "Mesh has edges shared by more than two faces"
            );
        } else if report.boundary_edge_count > 0 {
            warn!(
                boundary = report.boundary_edge_count,
                "Mesh is open; surface reaches the grid boundary"
            );
        } else {
            debug!(edges = report.edge_count, "Mesh is a closed manifold");
        }

        report
    }

    /// No edge is used by only one face.
    #[must_use]
    pub const fn is_watertight(&self) -> bool {
        self.boundary_edge_count == 0
    }

    /// No edge is used by more than two faces.
    #[must_use]
    pub const fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// Every edge is shared by exactly two faces.
    #[must_use]
    pub const fn is_closed_manifold(&self) -> bool {
        self.is_watertight() && self.is_manifold()
    }
}

impl std::fmt::Display for TopologyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Topology Report:")?;
        writeln!(f, "  Faces: {}", self.face_count)?;
        writeln!(f, "  Edges: {}", self.edge_count)?;
        writeln!(
            f,
            "  Watertight: {}",
            if self.is_watertight() { "Yes" } else { "No" }
        )?;
        writeln!(
            f,
            "  Manifold: {}",
            if self.is_manifold() { "Yes" } else { "No" }
        )?;
        if self.boundary_edge_count > 0 {
            writeln!(f, "  Boundary edges: {}", self.boundary_edge_count)?;
        }
        if self.non_manifold_edge_count > 0 {
            writeln!(f, "  Non-manifold edges: {}", self.non_manifold_edge_count)?;
        }
        Ok(())
    }
}

/// Normalize edge direction so v0 < v1.
#[inline]
fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 { (v0, v1) } else { (v1, v0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mesh_is_trivially_closed() {
        let report = TopologyReport::from_faces(&[]);
        assert_eq!(report, TopologyReport::default());
        assert!(report.is_closed_manifold());
    }

    #[test]
    fn single_triangle_is_open() {
        let report = TopologyReport::from_faces(&[[0, 1, 2]]);
        assert_eq!(report.boundary_edge_count, 3);
        assert!(!report.is_watertight());
        assert!(report.is_manifold());
    }

    #[test]
    fn fin_is_non_manifold() {
        // Three triangles hinged on edge (0, 1).
        let faces = [[0, 1, 2], [1, 0, 3], [0, 1, 4]];
        let adj = EdgeAdjacency::build(&faces);
        assert_eq!(adj.face_count(1, 0), 3);
        assert_eq!(adj.non_manifold_edges().collect::<Vec<_>>(), vec![(0, 1)]);

        let report = TopologyReport::from_faces(&faces);
        assert!(!report.is_manifold());
        assert_eq!(report.non_manifold_edge_count, 1);
    }

    #[test]
    fn missing_edge_counts_zero() {
        let adj = EdgeAdjacency::build(&[[0, 1, 2]]);
        assert_eq!(adj.face_count(7, 8), 0);
    }

    #[test]
    fn display_lists_issues() {
        let text = TopologyReport::from_faces(&[[0, 1, 2]]).to_string();
        assert!(text.contains("Watertight: No"));
        assert!(text.contains("Boundary edges: 3"));
    }

    #[test]
    fn normalize_edge_orders() {
        assert_eq!(normalize_edge(5, 2), (2, 5));
        assert_eq!(normalize_edge(2, 5), (2, 5));
    }
}
