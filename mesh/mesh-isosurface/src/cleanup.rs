//! Removal of faces that collapse onto a single point or line.
//!
//! A scalar sample lying exactly on the isovalue clamps every crossing that
//! touches it to the sample itself, so several edge vertices share one
//! position and the faces between them have no area. A flat run of such
//! samples can also leave two faces over the same vertices with opposite
//! winding, a fin of zero thickness.
//!
//! The cleanup welds vertices with bit-identical positions, drops faces that
//! lose an index or their area, cancels opposite-wound pairs and compacts the
//! vertex buffer. Welding before dropping keeps the surrounding faces
//! stitched together, so a closed surface stays closed and keeps its volume.

use hashbrown::HashMap;
use nalgebra::Point3;

/// Faces whose area is at or below this fraction of a voxel face are
/// dropped.
pub const DEGENERATE_AREA_EPSILON: f64 = 1e-12;

/// Counts from one cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    /// Vertices merged into an earlier vertex at the same position.
    pub vertices_welded: usize,
    /// Faces removed for repeated indices or zero area.
    pub degenerates_removed: usize,
    /// Faces removed in opposite-wound pairs over the same vertices.
    pub duplicates_removed: usize,
    /// Vertices no longer referenced by any face.
    pub unreferenced_removed: usize,
}

impl CleanupSummary {
    /// Check if the pass changed the mesh.
    #[must_use]
    pub const fn had_changes(&self) -> bool {
        self.vertices_welded > 0
            || self.degenerates_removed > 0
            || self.duplicates_removed > 0
            || self.unreferenced_removed > 0
    }
}

impl std::fmt::Display for CleanupSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cleanup: {} welded, {} degenerate faces, {} duplicate faces, {} unreferenced vertices",
            self.vertices_welded,
            self.degenerates_removed,
            self.duplicates_removed,
            self.unreferenced_removed
        )
    }
}

/// Weld, drop degenerate faces, cancel duplicates, then compact, in that
/// order.
///
/// `area_threshold` is an absolute area; [`extract_with_classifier`]
/// passes [`DEGENERATE_AREA_EPSILON`] scaled by the voxel face area.
/// Surviving vertices and faces keep their relative order.
///
/// [`extract_with_classifier`]: crate::extract_with_classifier
///
/// # Example
///
/// ```
/// use mesh_isosurface::remove_degenerate;
/// use nalgebra::Point3;
///
/// // Vertex 3 duplicates vertex 1, so the second face collapses.
/// let mut vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
/// ];
/// let mut faces = vec![[0, 1, 2], [1, 3, 2]];
///
/// let summary = remove_degenerate(&mut vertices, &mut faces, 1e-12);
/// assert_eq!(summary.vertices_welded, 1);
/// assert_eq!(summary.degenerates_removed, 1);
/// assert_eq!(faces, vec![[0, 1, 2]]);
/// assert_eq!(vertices.len(), 3);
/// ```
pub fn remove_degenerate(
    vertices: &mut Vec<Point3<f64>>,
    faces: &mut Vec<[u32; 3]>,
    area_threshold: f64,
) -> CleanupSummary {
    let vertices_welded = weld_coincident_vertices(vertices, faces);
    let degenerates_removed = remove_degenerate_faces(vertices, faces, area_threshold);
    let duplicates_removed = remove_cancelling_faces(faces);
    let unreferenced_removed = remove_unreferenced_vertices(vertices, faces);

    CleanupSummary {
        vertices_welded,
        degenerates_removed,
        duplicates_removed,
        unreferenced_removed,
    }
}

/// Point every face at the first vertex with its exact position.
///
/// Only bit-identical positions merge (`-0.0` and `0.0` count as equal).
/// The vertex buffer itself is left untouched; merged vertices become
/// unreferenced. Returns the number of vertices merged.
pub fn weld_coincident_vertices(vertices: &[Point3<f64>], faces: &mut [[u32; 3]]) -> usize {
    let mut first_at: HashMap<[u64; 3], u32> = HashMap::with_capacity(vertices.len());
    let mut remap: Vec<u32> = Vec::with_capacity(vertices.len());
    let mut merged = 0;

    for (index, v) in (0_u32..).zip(vertices) {
        let canonical = *first_at.entry(position_bits(v)).or_insert(index);
        if canonical != index {
            merged += 1;
        }
        remap.push(canonical);
    }

    if merged > 0 {
        for face in faces.iter_mut() {
            *face = face.map(|i| remap[i as usize]);
        }
    }

    merged
}

/// Drop faces with a repeated index or an area at or below
/// `area_threshold`. Returns the number of faces removed.
pub fn remove_degenerate_faces(
    vertices: &[Point3<f64>],
    faces: &mut Vec<[u32; 3]>,
    area_threshold: f64,
) -> usize {
    let original_count = faces.len();

    faces.retain(|&[a, b, c]| {
        if a == b || b == c || c == a {
            return false;
        }
        let v0 = vertices[a as usize];
        let e1 = vertices[b as usize] - v0;
        let e2 = vertices[c as usize] - v0;
        e1.cross(&e2).norm() * 0.5 > area_threshold
    });

    original_count - faces.len()
}

/// Drop pairs of faces that cover the same three vertices with opposite
/// winding.
///
/// Each pair bounds no volume, and removing both faces changes every shared
/// edge's face count by two. Faces repeated with the same winding are kept.
/// Returns the number of faces removed.
pub fn remove_cancelling_faces(faces: &mut Vec<[u32; 3]>) -> usize {
    let original_count = faces.len();
    let mut unmatched: HashMap<[u32; 3], Vec<usize>> = HashMap::new();
    let mut cancelled = vec![false; original_count];

    for (i, &face) in faces.iter().enumerate() {
        let [a, b, c] = min_first(face);
        if let Some(partner) = unmatched.get_mut(&[a, c, b]).and_then(Vec::pop) {
            cancelled[partner] = true;
            cancelled[i] = true;
        } else {
            unmatched.entry([a, b, c]).or_default().push(i);
        }
    }

    let mut flags = cancelled.iter();
    faces.retain(|_| !flags.next().copied().unwrap_or(false));

    original_count - faces.len()
}

/// Rotate a face so its smallest index comes first, keeping the winding.
fn min_first([a, b, c]: [u32; 3]) -> [u32; 3] {
    if a <= b && a <= c {
        [a, b, c]
    } else if b <= c {
        [b, c, a]
    } else {
        [c, a, b]
    }
}

/// Remove vertices no face references, rewriting face indices.
///
/// Returns the number of vertices removed.
pub fn remove_unreferenced_vertices(
    vertices: &mut Vec<Point3<f64>>,
    faces: &mut [[u32; 3]],
) -> usize {
    let original_count = vertices.len();

    let mut referenced = vec![false; original_count];
    for face in faces.iter() {
        for &i in face {
            referenced[i as usize] = true;
        }
    }

    let mut remap = vec![u32::MAX; original_count];
    let mut next = 0_u32;
    for (slot, &used) in remap.iter_mut().zip(&referenced) {
        if used {
            *slot = next;
            next += 1;
        }
    }

    if next as usize == original_count {
        return 0;
    }

    let mut used = referenced.iter();
    vertices.retain(|_| used.next().copied().unwrap_or(false));
    for face in faces.iter_mut() {
        *face = face.map(|i| remap[i as usize]);
    }

    original_count - vertices.len()
}

fn position_bits(p: &Point3<f64>) -> [u64; 3] {
    // Adding zero folds -0.0 into 0.0.
    [p.x, p.y, p.z].map(|c| (c + 0.0).to_bits())
}
