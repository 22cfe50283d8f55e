//! Cube traversal, sequential and slab-parallel.
//!
//! The traversal walks cubes in z-major order (z outermost, x innermost).
//! In parallel mode the cube layers are split into contiguous z-slabs, each
//! slab builds a local vertex arena keyed by [`EdgeKey`], and a single merge
//! pass folds the arenas into the global one in slab order. Because vertex
//! positions depend only on the edge key, the merged mesh is identical to
//! the sequential one.

use std::ops::Range;

use nalgebra::Point3;
use rayon::prelude::*;
use tracing::debug;

use crate::classify::{CubeClassifier, pack_corners};
use crate::edge_cache::{EdgeKey, VertexCache};
use crate::error::IsosurfaceResult;
use crate::interpolate::edge_position;
use crate::tables::{CORNER_OFFSETS, EDGE_TABLE};
use crate::triangulate::emit_triangles;

/// Slabs per worker thread; more slabs than threads evens out load when the
/// surface is concentrated in a few layers.
const SLABS_PER_THREAD: usize = 4;

/// A classifier viewed through an optional layer of virtual outside samples.
///
/// Lattice points are `step` samples apart, so each cube spans `step`
/// voxels along every axis.
pub(crate) struct Lattice<'c, C: CubeClassifier> {
    classifier: &'c C,
    /// Lattice points along each axis, before padding.
    dims: [usize; 3],
    pad: usize,
    step: usize,
}

impl<'c, C: CubeClassifier> Lattice<'c, C> {
    /// `step` must be at least 1.
    pub(crate) fn new(classifier: &'c C, pad: usize, step: usize) -> Self {
        let (nx, ny, nz) = classifier.dimensions();
        Self {
            classifier,
            dims: [nx, ny, nz].map(|n| n.div_ceil(step)),
            pad,
            step,
        }
    }

    /// Cubes along each axis.
    pub(crate) fn cube_counts(&self) -> [usize; 3] {
        self.dims.map(|n| (n + 2 * self.pad).saturating_sub(1))
    }

    /// Total cubes visited.
    pub(crate) fn cube_total(&self) -> usize {
        self.cube_counts().iter().product()
    }

    /// World distance between neighbouring lattice points.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn spacing(&self, voxel_size: f64) -> f64 {
        voxel_size * self.step as f64
    }

    /// Sample at lattice point `p`; `None` for a virtual padding sample.
    #[inline]
    fn sample(&self, p: [usize; 3]) -> Option<C::Sample> {
        let mut grid = [0_usize; 3];
        for axis in 0..3 {
            let g = p[axis].checked_sub(self.pad)?;
            if g >= self.dims[axis] {
                return None;
            }
            grid[axis] = g * self.step;
        }
        Some(self.classifier.sample(grid[0], grid[1], grid[2]))
    }

    #[inline]
    fn is_inside(&self, sample: Option<C::Sample>) -> bool {
        sample.is_some_and(|s| self.classifier.is_inside(s))
    }

    /// Crossing along a canonical edge, measured from its low endpoint.
    #[inline]
    fn crossing(&self, key: &EdgeKey) -> f64 {
        match (self.sample(key.low()), self.sample(key.high())) {
            (Some(low), Some(high)) => self.classifier.crossing(low, high),
            _ => 0.5,
        }
    }
}

/// Placement parameters shared by every cube.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placement {
    pub(crate) voxel_size: f64,
    pub(crate) origin: Point3<f64>,
}

/// Vertices and faces produced by one run of cube layers.
#[derive(Debug, Default)]
pub(crate) struct SlabMesh {
    pub(crate) cache: VertexCache,
    pub(crate) faces: Vec<[u32; 3]>,
}

/// Classify, interpolate and triangulate every cube in layers `layers`.
pub(crate) fn march_layers<C: CubeClassifier>(
    lattice: &Lattice<'_, C>,
    layers: Range<usize>,
    placement: Placement,
) -> IsosurfaceResult<SlabMesh> {
    let [cx, cy, _] = lattice.cube_counts();
    let mut slab = SlabMesh::default();

    for z in layers {
        for y in 0..cy {
            for x in 0..cx {
                march_cube(lattice, [x, y, z], placement, &mut slab)?;
            }
        }
    }

    Ok(slab)
}

#[inline]
fn march_cube<C: CubeClassifier>(
    lattice: &Lattice<'_, C>,
    cube: [usize; 3],
    placement: Placement,
    slab: &mut SlabMesh,
) -> IsosurfaceResult<()> {
    let corners = CORNER_OFFSETS.map(|offset| {
        lattice.is_inside(lattice.sample([
            cube[0] + offset[0],
            cube[1] + offset[1],
            cube[2] + offset[2],
        ]))
    });
    let cube_index = pack_corners(corners);
    if cube_index == 0 || cube_index == u8::MAX {
        return Ok(());
    }

    let crossed = EDGE_TABLE[usize::from(cube_index)];
    let mut edge_vertices = [0_u32; 12];
    for (edge, slot) in edge_vertices.iter_mut().enumerate() {
        if crossed & (1 << edge) == 0 {
            continue;
        }
        let key = EdgeKey::new(cube, edge);
        *slot = slab.cache.get_or_insert_with(key, || {
            edge_position(
                key.low(),
                key.axis(),
                lattice.crossing(&key),
                lattice.pad,
                placement.voxel_size,
                &placement.origin,
            )
        })?;
    }

    emit_triangles(cube_index, &edge_vertices, &mut slab.faces);
    Ok(())
}

/// Split `layers` cube layers into at most `slabs` contiguous ranges.
pub(crate) fn slab_ranges(layers: usize, slabs: usize) -> Vec<Range<usize>> {
    let slabs = slabs.clamp(1, layers.max(1));
    let depth = layers.div_ceil(slabs).max(1);
    (0..layers)
        .step_by(depth)
        .map(|start| start..(start + depth).min(layers))
        .collect()
}

/// Run all slabs on the rayon pool and merge them in z order.
pub(crate) fn march_parallel<C: CubeClassifier>(
    lattice: &Lattice<'_, C>,
    placement: Placement,
) -> IsosurfaceResult<SlabMesh> {
    let layers = lattice.cube_counts()[2];
    let ranges = slab_ranges(layers, rayon::current_num_threads() * SLABS_PER_THREAD);
    debug!(slabs = ranges.len(), layers, "Marching z-slabs in parallel");

    let slabs = ranges
        .into_par_iter()
        .map(|range| march_layers(lattice, range, placement))
        .collect::<IsosurfaceResult<Vec<_>>>()?;

    merge_slabs(slabs)
}

/// Fold slab-local arenas into one, rewriting face indices.
///
/// Slabs must be given in traversal order. A key already seen in an earlier
/// slab keeps that slab's vertex; new keys are appended in the order the
/// slab created them.
pub(crate) fn merge_slabs(slabs: Vec<SlabMesh>) -> IsosurfaceResult<SlabMesh> {
    let local_vertices: usize = slabs.iter().map(|s| s.cache.len()).sum();
    let face_total: usize = slabs.iter().map(|s| s.faces.len()).sum();

    let mut merged = SlabMesh {
        cache: VertexCache::with_capacity(local_vertices),
        faces: Vec::with_capacity(face_total),
    };

    for slab in slabs {
        let remap = slab
            .cache
            .keys()
            .iter()
            .zip(slab.cache.positions())
            .map(|(&key, &position)| merged.cache.get_or_insert_with(key, || position))
            .collect::<IsosurfaceResult<Vec<u32>>>()?;

        merged.faces.extend(
            slab.faces
                .iter()
                .map(|face| face.map(|local| remap[local as usize])),
        );
    }

    debug!(
        local_vertices,
        merged_vertices = merged.cache.len(),
        faces = merged.faces.len(),
        "Merged slab vertex arenas"
    );

    Ok(merged)
}
