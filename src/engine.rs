use crate::bounds::BoundingBox;
use crate::cell_faces::{CellFaces, CellFacesScratch};
use crate::error::{CrustError, CrustResult};
use crate::grid::{BlockGrid, DEFAULT_POINTS_PER_BLOCK};
use rayon::prelude::*;

/// One computed cell, borrowed from the engine for the duration of a visit.
///
/// `neighbors[i]` is the neighbor of face `i`; negative values are container
/// walls. `face_vertices` is count-prefixed: for every face its vertex count
/// `c` followed by `c` indices into `vertices`, where local vertex `m`
/// occupies `vertices[3m..3m + 3]`.
#[derive(Clone, Copy, Debug)]
pub struct DecomposedCell<'a> {
    pub id: usize,
    pub neighbors: &'a [i32],
    pub face_vertices: &'a [usize],
    pub vertices: &'a [f64],
}

/// Trait defining a cell decomposition engine.
///
/// This keeps face extraction independent of how cells are built.
pub trait CellEngine {
    /// Submit a point with the caller's ID.
    ///
    /// Points outside the bounding box are rejected with [`CrustError::OutOfBounds`].
    fn insert(&mut self, id: usize, point: [f64; 3]) -> CrustResult<()>;

    /// Number of accepted points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compute every cell and hand it to `visitor` in a single forward pass.
    ///
    /// A cell the engine fails to build is reported as an `Err` and the pass continues.
    fn for_each_cell<F>(&mut self, visitor: F)
    where
        F: FnMut(CrustResult<DecomposedCell<'_>>);
}

/// Non-periodic box container computing cells by half-space clipping.
///
/// Cells are computed in parallel and visited in insertion order.
pub struct ContainerEngine {
    bounds: BoundingBox,
    points_per_block: usize,
    /// Flat accepted coordinates [x, y, z, x, y, z, ...].
    points: Vec<f64>,
    /// Caller ID of each accepted point.
    ids: Vec<usize>,
}

impl ContainerEngine {
    pub fn new(bounds: BoundingBox) -> Self {
        Self::with_points_per_block(bounds, DEFAULT_POINTS_PER_BLOCK)
    }

    /// `points_per_block` is the expected occupancy used to size the block grid.
    pub fn with_points_per_block(bounds: BoundingBox, points_per_block: usize) -> Self {
        Self {
            bounds,
            points_per_block: points_per_block.max(1),
            points: Vec::new(),
            ids: Vec::new(),
        }
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Builds all cells, indexed like the accepted points.
    pub fn compute_cells(&self) -> Vec<CellFaces> {
        let mut grid = BlockGrid::with_occupancy(self.ids.len(), self.points_per_block, &self.bounds);
        grid.insert_all(&self.points);

        let points = &self.points;
        let ids = &self.ids;
        let bounds = self.bounds;
        let grid = &grid;

        (0..ids.len())
            .into_par_iter()
            .map_init(CellFacesScratch::default, |scratch, i| {
                let g = [points[i * 3], points[i * 3 + 1], points[i * 3 + 2]];
                let mut cell = CellFaces::new(ids[i], bounds);
                let mut radius_sq = cell.max_radius_sq(&g);

                grid.visit_neighbors(points, i, g, &mut radius_sq, |j, other, cur| {
                    let normal = [other[0] - g[0], other[1] - g[1], other[2] - g[2]];
                    let dist_sq = normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2];
                    // Bisector lies beyond the cell
                    if dist_sq > 4.0 * cur {
                        return cur;
                    }
                    let mid = [g[0] + normal[0] * 0.5, g[1] + normal[1] * 0.5, g[2] + normal[2] * 0.5];

                    match cell.clip(&mid, &normal, ids[j] as i32, scratch, Some(&g)) {
                        (true, new_radius) => new_radius,
                        (false, _) => cur,
                    }
                });

                cell
            })
            .collect()
    }
}

impl CellEngine for ContainerEngine {
    fn insert(&mut self, id: usize, point: [f64; 3]) -> CrustResult<()> {
        let [x, y, z] = point;
        if !self.bounds.contains(x, y, z) {
            return Err(CrustError::OutOfBounds { id, x, y, z });
        }
        self.points.extend_from_slice(&point);
        self.ids.push(id);
        Ok(())
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn for_each_cell<F>(&mut self, mut visitor: F)
    where
        F: FnMut(CrustResult<DecomposedCell<'_>>),
    {
        let cells = self.compute_cells();
        let mut face_vertices = Vec::new();
        for cell in &cells {
            if cell.is_empty() {
                visitor(Err(CrustError::EmptyCell { id: cell.id() }));
                continue;
            }
            cell.face_vertices_into(&mut face_vertices);
            visitor(Ok(DecomposedCell {
                id: cell.id(),
                neighbors: cell.neighbors(),
                face_vertices: &face_vertices,
                vertices: cell.vertices(),
            }));
        }
    }
}
