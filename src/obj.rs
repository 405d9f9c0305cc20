//! OBJ-like text export of the crust.
//!
//! Each polygon is written as its own block of `v x y z` records followed by
//! one `f i1 i2 ... ik` record indexing that block (1-based, counted over the
//! whole file). Points shared by adjacent polygons are written once per
//! polygon. Floats use the shortest representation that parses back to the
//! same `f64`.

use crate::face_index::FaceIndex;
use std::io::{self, Write};

impl FaceIndex {
    /// Writes every polygon in registry order to `writer`.
    pub fn write_obj<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut next_vertex: usize = 1;
        for polygon in self.faces() {
            for p in polygon.points() {
                writeln!(writer, "v {} {} {}", p[0], p[1], p[2])?;
            }

            write!(writer, "f")?;
            for k in 0..polygon.len() {
                write!(writer, " {}", next_vertex + k)?;
            }
            writeln!(writer)?;
            next_vertex += polygon.len();
        }
        Ok(())
    }
}
