//! Per-cube triangle emission.

use crate::tables::{TRI_SENTINEL, TRI_TABLE};

/// Append the triangles of configuration `cube_index` to `faces`.
///
/// `edge_vertices[e]` must hold the vertex index resolved for local edge `e`
/// for every edge the configuration crosses; other slots are ignored.
///
/// The table's triangles face the inside region, so the last two corners of
/// each triple are swapped: emitted faces wind counter-clockwise seen from
/// outside the solid. Returns the number of triangles appended (0 to 5).
pub(crate) fn emit_triangles(
    cube_index: u8,
    edge_vertices: &[u32; 12],
    faces: &mut Vec<[u32; 3]>,
) -> usize {
    let mut emitted = 0;
    for tri in TRI_TABLE[usize::from(cube_index)].chunks_exact(3) {
        if tri[0] == TRI_SENTINEL {
            break;
        }
        let vertex = |slot: usize| edge_vertices[usize::from(tri[slot].unsigned_abs())];
        faces.push([vertex(0), vertex(2), vertex(1)]);
        emitted += 1;
    }
    emitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::triangle_count;

    fn identity_edges() -> [u32; 12] {
        core::array::from_fn(|e| e as u32)
    }

    #[test]
    fn homogeneous_cubes_emit_nothing() {
        let mut faces = Vec::new();
        assert_eq!(emit_triangles(0, &identity_edges(), &mut faces), 0);
        assert_eq!(emit_triangles(255, &identity_edges(), &mut faces), 0);
        assert!(faces.is_empty());
    }

    #[test]
    fn single_corner_winding_is_reversed() {
        // Table row 1 is [0, 8, 3].
        let mut faces = Vec::new();
        emit_triangles(1, &identity_edges(), &mut faces);
        assert_eq!(faces, vec![[0, 3, 8]]);
    }

    #[test]
    fn edge_slots_are_resolved_through_lookup() {
        let mut edges = [u32::MAX; 12];
        edges[0] = 40;
        edges[8] = 41;
        edges[3] = 42;
        let mut faces = Vec::new();
        emit_triangles(1, &edges, &mut faces);
        assert_eq!(faces, vec![[40, 42, 41]]);
    }

    #[test]
    fn count_matches_table() {
        let edges = identity_edges();
        for index in 0..=255_u8 {
            let mut faces = Vec::new();
            let emitted = emit_triangles(index, &edges, &mut faces);
            assert_eq!(emitted, triangle_count(index));
            assert_eq!(faces.len(), emitted);
            assert!(emitted <= 5);
        }
    }
}
