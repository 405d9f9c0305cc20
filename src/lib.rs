//! # vorocrust
//!
//! `vorocrust` computes the 3D Voronoi tessellation of a bounded point set and
//! extracts the crust: every planar face shared by two neighbouring cells, once
//! per pair of cells, as an explicit polygon. The crust can be written as an
//! OBJ-like polygon mesh.
//!
//! ## Features
//!
//! - **Face registry**: interface polygons tagged with the pair of cells sharing them,
//!   plus a per-cell range of the faces each cell emitted.
//! - **Boundary exclusion**: faces lying on the bounding box are dropped.
//! - **Pluggable engine**: cells come from any [`CellEngine`]; [`ContainerEngine`]
//!   clips the box against bisector planes using a block grid, in parallel.
//! - **Any point storage**: input goes through the [`PointSource`] trait.
//!
//! ## Example
//!
//! ```no_run
//! use vorocrust::{BoundingBox, VoronoiCrust};
//!
//! let mut crust = VoronoiCrust::new(BoundingBox::new(0.0, 0.0, 0.0, 1.0, 1.0, 1.0));
//! crust.compute(&[[0.25, 0.5, 0.5], [0.75, 0.5, 0.5]])?;
//! crust.write_mesh("crust.obj")?;
//! # Ok::<(), vorocrust::CrustError>(())
//! ```
//!
//! ## Main Interface
//!
//! The primary entry point is the [`VoronoiCrust`] struct.

mod bounds;
mod cell_faces;
mod crust;
mod engine;
mod error;
mod extractor;
mod face_index;
mod grid;
mod obj;
mod points;

pub use bounds::BoundingBox;
pub use bounds::is_wall;
pub use bounds::{BOX_ID_BACK, BOX_ID_BOTTOM, BOX_ID_FRONT, BOX_ID_LEFT, BOX_ID_RIGHT, BOX_ID_TOP};
pub use cell_faces::{CellFaces, CellFacesScratch};
pub use crust::{BuildStats, VoronoiCrust};
pub use engine::{CellEngine, ContainerEngine, DecomposedCell};
pub use error::{CrustError, CrustResult};
pub use extractor::{ExtractStats, FaceExtractor};
pub use face_index::{FaceIndex, InterfacePolygon};
pub use grid::{BlockGrid, DEFAULT_POINTS_PER_BLOCK};
pub use points::{FlatPoints, FnPoints, PointSource};
