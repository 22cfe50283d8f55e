//! Canonical edge identities and the per-extraction vertex arena.
//!
//! A physical grid edge is shared by up to four cubes. Each of them derives
//! the same [`EdgeKey`] for it, and [`VertexCache`] turns the first lookup of
//! a key into a new vertex and every later lookup into that vertex's index.

use hashbrown::HashMap;
use nalgebra::Point3;

use crate::error::{IsosurfaceError, IsosurfaceResult};
use crate::tables::EDGE_KEY_OFFSETS;

/// Identity of one grid edge: its low-coordinate endpoint and its axis.
///
/// Keys order lexicographically by `(z, y, x, axis)`, matching traversal
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    z: usize,
    y: usize,
    x: usize,
    axis: u8,
}

impl EdgeKey {
    /// Key for local edge `edge` (0..12) of the cube whose minimum corner is
    /// `cube`.
    ///
    /// # Panics
    ///
    /// Panics if `edge >= 12`.
    ///
    /// ```
    /// use mesh_isosurface::EdgeKey;
    ///
    /// // Edge 1 of cube (0,0,0) is edge 3 of its +x neighbour.
    /// assert_eq!(EdgeKey::new([0, 0, 0], 1), EdgeKey::new([1, 0, 0], 3));
    /// // Edge 10 is shared by four cubes around the same vertical line.
    /// assert_eq!(EdgeKey::new([0, 0, 0], 10), EdgeKey::new([1, 1, 0], 8));
    /// ```
    #[inline]
    #[must_use]
    pub const fn new(cube: [usize; 3], edge: usize) -> Self {
        let (offset, axis) = EDGE_KEY_OFFSETS[edge];
        Self {
            x: cube[0] + offset[0],
            y: cube[1] + offset[1],
            z: cube[2] + offset[2],
            axis,
        }
    }

    /// Lattice coordinates of the low endpoint.
    #[inline]
    #[must_use]
    pub const fn low(&self) -> [usize; 3] {
        [self.x, self.y, self.z]
    }

    /// Lattice coordinates of the high endpoint.
    #[inline]
    #[must_use]
    pub fn high(&self) -> [usize; 3] {
        let mut p = self.low();
        p[self.axis()] += 1;
        p
    }

    /// Axis the edge runs along (0 = x, 1 = y, 2 = z).
    #[inline]
    #[must_use]
    pub const fn axis(&self) -> usize {
        self.axis as usize
    }
}

/// Insertion-ordered arena of vertices keyed by [`EdgeKey`].
///
/// Valid for one extraction only. Entries are never removed or replaced, so
/// a key always resolves to the index it was first given.
#[derive(Debug, Clone, Default)]
pub struct VertexCache {
    index: HashMap<EdgeKey, u32>,
    keys: Vec<EdgeKey>,
    positions: Vec<Point3<f64>>,
}

impl VertexCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache sized for `vertices` entries.
    #[must_use]
    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            index: HashMap::with_capacity(vertices),
            keys: Vec::with_capacity(vertices),
            positions: Vec::with_capacity(vertices),
        }
    }

    /// Index of the vertex on `key`, creating it with `position` on first
    /// encounter.
    ///
    /// # Errors
    ///
    /// Returns [`IsosurfaceError::IndexOverflow`] if a new vertex would not
    /// fit in a `u32` index.
    ///
    /// ```
    /// use mesh_isosurface::{EdgeKey, VertexCache};
    /// use nalgebra::Point3;
    ///
    /// let mut cache = VertexCache::new();
    /// let key = EdgeKey::new([0, 0, 0], 0);
    /// let a = cache.get_or_insert_with(key, || Point3::new(0.5, 0.0, 0.0)).unwrap();
    /// let b = cache.get_or_insert_with(key, || Point3::new(9.0, 9.0, 9.0)).unwrap();
    /// assert_eq!(a, b);
    /// assert_eq!(cache.len(), 1);
    /// ```
    pub fn get_or_insert_with<F>(&mut self, key: EdgeKey, position: F) -> IsosurfaceResult<u32>
    where
        F: FnOnce() -> Point3<f64>,
    {
        if let Some(&existing) = self.index.get(&key) {
            return Ok(existing);
        }

        let count = self.positions.len();
        let next = u32::try_from(count).map_err(|_| IsosurfaceError::IndexOverflow {
            count: count + 1,
        })?;
        self.index.insert(key, next);
        self.keys.push(key);
        self.positions.push(position());
        Ok(next)
    }

    /// Index already assigned to `key`, if any.
    #[must_use]
    pub fn get(&self, key: &EdgeKey) -> Option<u32> {
        self.index.get(key).copied()
    }

    /// Number of vertices created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no vertex has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Keys in vertex index order.
    #[must_use]
    pub fn keys(&self) -> &[EdgeKey] {
        &self.keys
    }

    /// Vertex positions in index order.
    #[must_use]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Consume the cache, keeping only the positions.
    #[must_use]
    pub fn into_positions(self) -> Vec<Point3<f64>> {
        self.positions
    }
}
