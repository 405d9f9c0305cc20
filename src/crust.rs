use crate::bounds::BoundingBox;
use crate::engine::{CellEngine, ContainerEngine};
use crate::error::{CrustError, CrustResult};
use crate::extractor::{ExtractStats, FaceExtractor};
use crate::face_index::FaceIndex;
use crate::grid::DEFAULT_POINTS_PER_BLOCK;
use crate::points::{FnPoints, PointSource};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Summary of one build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Points submitted by the caller.
    pub submitted: usize,
    /// Points outside the bounding box, skipped.
    pub rejected: usize,
    /// Cells the engine failed to build, skipped.
    pub failed: usize,
    /// Cells passed through the extractor.
    pub processed: usize,
    pub faces: ExtractStats,
}

enum State {
    Uncomputed,
    Computed { index: FaceIndex, stats: BuildStats },
}

/// The crust of a bounded 3D Voronoi tessellation.
///
/// Computes the tessellation once, keeps every internal interface polygon
/// tagged with the two cells that share it, and exports them as a mesh.
///
/// Cell IDs are the caller's point indices. A point rejected for lying
/// outside the box keeps its ID slot but has no range and no faces.
pub struct VoronoiCrust {
    bounds: BoundingBox,
    points_per_block: usize,
    state: State,
}

impl VoronoiCrust {
    pub fn new(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            points_per_block: DEFAULT_POINTS_PER_BLOCK,
            state: State::Uncomputed,
        }
    }

    /// Sets the expected points per block used to size the engine's search grid.
    pub fn with_points_per_block(mut self, points_per_block: usize) -> Self {
        self.points_per_block = points_per_block.max(1);
        self
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn is_computed(&self) -> bool {
        matches!(self.state, State::Computed { .. })
    }

    /// The face registry, once computed.
    pub fn faces(&self) -> Option<&FaceIndex> {
        match &self.state {
            State::Computed { index, .. } => Some(index),
            State::Uncomputed => None,
        }
    }

    pub fn stats(&self) -> Option<BuildStats> {
        match &self.state {
            State::Computed { stats, .. } => Some(*stats),
            State::Uncomputed => None,
        }
    }

    /// Computes the tessellation of `points` and builds the face registry.
    ///
    /// Fails with [`CrustError::AlreadyComputed`] on a second call, leaving
    /// the existing registry untouched.
    pub fn compute<P: PointSource + ?Sized>(&mut self, points: &P) -> CrustResult<BuildStats> {
        self.compute_with_progress(points, |_, _| {})
    }

    /// Like [`Self::compute`] for points given by a callback `f(index, axis)`.
    pub fn compute_fn<F>(&mut self, count: usize, f: F) -> CrustResult<BuildStats>
    where
        F: Fn(usize, usize) -> f64,
    {
        self.compute(&FnPoints::new(count, f))
    }

    /// Like [`Self::compute`], calling `progress(processed, total)` after every cell.
    pub fn compute_with_progress<P, F>(&mut self, points: &P, progress: F) -> CrustResult<BuildStats>
    where
        P: PointSource + ?Sized,
        F: FnMut(usize, usize),
    {
        let engine = ContainerEngine::with_points_per_block(self.bounds, self.points_per_block);
        self.compute_with_engine(engine, points, progress)
    }

    /// Builds the registry using a caller-supplied cell engine.
    pub fn compute_with_engine<E, P, F>(&mut self, mut engine: E, points: &P, mut progress: F) -> CrustResult<BuildStats>
    where
        E: CellEngine,
        P: PointSource + ?Sized,
        F: FnMut(usize, usize),
    {
        if self.is_computed() {
            return Err(CrustError::AlreadyComputed);
        }

        let count = points.count();
        let mut stats = BuildStats { submitted: count, ..Default::default() };

        for i in 0..count {
            if let Err(err) = engine.insert(i, points.point(i)) {
                warn!(%err, "skipping point");
                stats.rejected += 1;
            }
        }

        let total = engine.len();
        let extractor = FaceExtractor::new();
        let mut index = FaceIndex::new(count);
        let mut last_decile = 0;

        engine.for_each_cell(|cell| {
            match cell {
                Ok(cell) => stats.faces += extractor.extract(&cell, &mut index),
                Err(err) => {
                    warn!(%err, "skipping cell");
                    stats.failed += 1;
                }
            }
            stats.processed += 1;
            progress(stats.processed, total);

            let decile = stats.processed * 10 / total.max(1);
            if decile > last_decile {
                last_decile = decile;
                debug!(processed = stats.processed, total, "build {}%", decile * 10);
            }
        });

        info!(
            faces = index.len(),
            rejected = stats.rejected,
            failed = stats.failed,
            boundary = stats.faces.boundary,
            "voronoi crust computed"
        );

        self.state = State::Computed { index, stats };
        Ok(stats)
    }

    /// Writes the crust as an OBJ mesh to `path`.
    ///
    /// Before a successful compute this logs an error and creates no file.
    pub fn write_mesh<P: AsRef<Path>>(&self, path: P) -> CrustResult<()> {
        let path = path.as_ref();
        let Some(index) = self.faces() else {
            error!(path = %path.display(), "no faces to draw, compute the tessellation first");
            return Err(CrustError::NotComputed);
        };

        let to_io_error = |source: std::io::Error| CrustError::IoWrite { path: path.to_path_buf(), source };
        let file = File::create(path).map_err(to_io_error)?;
        let mut writer = BufWriter::new(file);
        index.write_obj(&mut writer).map_err(to_io_error)?;
        writer.flush().map_err(to_io_error)?;

        info!(path = %path.display(), faces = index.len(), vertices = index.vertex_count(), "wrote crust mesh");
        Ok(())
    }

    /// Writes the crust as OBJ text to any writer.
    pub fn write_obj<W: Write>(&self, writer: &mut W) -> CrustResult<()> {
        let index = self.faces().ok_or(CrustError::NotComputed)?;
        index.write_obj(writer)?;
        Ok(())
    }
}
