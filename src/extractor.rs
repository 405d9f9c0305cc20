use crate::bounds::is_wall;
use crate::engine::DecomposedCell;
use crate::face_index::{FaceIndex, InterfacePolygon};

/// Face counts produced by extracting one or more cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Faces appended to the registry.
    pub emitted: usize,
    /// Faces lying on the container wall.
    pub boundary: usize,
    /// Faces owned by the neighbor cell, emitted from its side instead.
    pub mirrored: usize,
}

impl std::ops::AddAssign for ExtractStats {
    fn add_assign(&mut self, other: Self) {
        self.emitted += other.emitted;
        self.boundary += other.boundary;
        self.mirrored += other.mirrored;
    }
}

/// Turns decomposed cells into deduplicated interface polygons.
///
/// Every internal face is seen twice, once from each cell. It is only kept
/// from the side with the smaller ID, so each unordered pair of cells
/// contributes at most one polygon.
#[derive(Debug, Default)]
pub struct FaceExtractor;

impl FaceExtractor {
    pub fn new() -> Self {
        FaceExtractor
    }

    /// Appends the internal faces owned by `cell` to `index` and records the
    /// cell's range, which is empty when nothing was emitted.
    pub fn extract(&self, cell: &DecomposedCell<'_>, index: &mut FaceIndex) -> ExtractStats {
        let mut stats = ExtractStats::default();
        let start = index.len();

        let mut offset = 0;
        for &neighbor in cell.neighbors {
            let Some(&count) = cell.face_vertices.get(offset) else {
                break;
            };
            let local = &cell.face_vertices[offset + 1..offset + 1 + count];
            offset += count + 1;

            if is_wall(neighbor) {
                stats.boundary += 1;
                continue;
            }
            let neighbor = neighbor as usize;
            let is_owner = cell.id < neighbor;
            if !is_owner {
                stats.mirrored += 1;
                continue;
            }

            let points = local
                .iter()
                .map(|&m| [cell.vertices[3 * m], cell.vertices[3 * m + 1], cell.vertices[3 * m + 2]])
                .collect();
            index.push(InterfacePolygon::new(points), cell.id, neighbor);
            stats.emitted += 1;
        }

        index.set_range(cell.id, start..index.len());
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Unit cube corners
    const CUBE: [f64; 24] = [
        0.0, 0.0, 0.0,
        1.0, 0.0, 0.0,
        1.0, 1.0, 0.0,
        0.0, 1.0, 0.0,
        0.0, 0.0, 1.0,
        1.0, 0.0, 1.0,
        1.0, 1.0, 1.0,
        0.0, 1.0, 1.0,
    ];

    const TABLE: [usize; 30] = [
        4, 3, 2, 1, 0,
        4, 4, 5, 6, 7,
        4, 0, 1, 5, 4,
        4, 2, 3, 7, 6,
        4, 0, 4, 7, 3,
        4, 1, 2, 6, 5,
    ];

    fn cube_cell(id: usize, neighbors: &[i32]) -> DecomposedCell<'_> {
        DecomposedCell {
            id,
            neighbors,
            face_vertices: &TABLE,
            vertices: &CUBE,
        }
    }

    #[test]
    fn test_boundary_faces_skipped() {
        let neighbors = [-1, -2, -3, -4, -5, -6];
        let mut index = FaceIndex::new(1);
        let stats = FaceExtractor::new().extract(&cube_cell(0, &neighbors), &mut index);

        assert_eq!(stats, ExtractStats { emitted: 0, boundary: 6, mirrored: 0 });
        assert!(index.is_empty());
        assert_eq!(index.range(0), Some(0..0));
    }

    #[test]
    fn test_owner_side_emits() {
        let neighbors = [-1, -2, 3, -4, 0, 7];
        let mut index = FaceIndex::new(8);
        let stats = FaceExtractor::new().extract(&cube_cell(2, &neighbors), &mut index);

        // Neighbor 0 is owned by cell 0; 3 and 7 are owned here
        assert_eq!(stats, ExtractStats { emitted: 2, boundary: 3, mirrored: 1 });
        assert_eq!(index.pairs(), &[(2, 3), (2, 7)]);
        assert_eq!(index.range(2), Some(0..2));

        // Front face (y-) in table order 0, 1, 5, 4
        assert_eq!(
            index.faces()[0].points(),
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]]
        );
    }

    #[test]
    fn test_neighbor_zero_is_a_cell_not_a_wall() {
        let neighbors = [0, -2, -3, -4, -5, -6];
        let mut index = FaceIndex::new(2);
        let stats = FaceExtractor::new().extract(&cube_cell(1, &neighbors), &mut index);
        assert_eq!(stats.mirrored, 1);
        assert_eq!(stats.boundary, 5);
    }

    #[test]
    fn test_symmetric_pair_emitted_once() {
        let extractor = FaceExtractor::new();
        let mut index = FaceIndex::new(2);
        let from_0 = [5, -2, -3, -4, -5, -6];
        let from_5 = [0, -2, -3, -4, -5, -6];

        let mut stats = extractor.extract(&cube_cell(0, &from_0), &mut index);
        stats += extractor.extract(&cube_cell(5, &from_5), &mut index);

        assert_eq!(index.len(), 1);
        assert_eq!(index.pairs(), &[(0, 5)]);
        assert_eq!(stats, ExtractStats { emitted: 1, boundary: 10, mirrored: 1 });
        assert_eq!(index.range(0), Some(0..1));
        assert_eq!(index.range(5), Some(1..1));
    }
}
