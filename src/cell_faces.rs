use crate::bounds::BoundingBox;
use crate::bounds::{BOX_ID_BACK, BOX_ID_BOTTOM, BOX_ID_FRONT, BOX_ID_LEFT, BOX_ID_RIGHT, BOX_ID_TOP};

const EPSILON: f64 = 1e-9;

/// Scratch buffer to reuse allocations during clipping.
#[derive(Default, Clone)]
pub struct CellFacesScratch {
    vertices: Vec<f64>,
    face_counts: Vec<u8>,
    face_indices: Vec<u16>,
    face_neighbors: Vec<i32>,
    dists: Vec<f64>,
    on_plane: Vec<bool>,
    old_to_new: Vec<Option<u16>>,
    intersection_map: Vec<(u32, u16)>,
    lid_segments: Vec<(u16, u16)>,
    face_buffer: Vec<u16>,
    lid_buffer: Vec<u16>,
    lid_map: Vec<u16>,
}

/// A convex Voronoi cell stored as vertices plus per-face index lists.
///
/// Starts as the bounding box and is cut down by successive half-space clips.
#[derive(Clone, Debug)]
pub struct CellFaces {
    pub(crate) id: usize,
    // Flat array of vertices [x, y, z, x, y, z, ...]
    pub(crate) vertices: Vec<f64>,
    // Number of vertices for each face
    pub(crate) face_counts: Vec<u8>,
    // Flattened indices for all faces
    pub(crate) face_indices: Vec<u16>,
    // Neighbor ID for each face. Negative values indicate walls.
    pub(crate) face_neighbors: Vec<i32>,
}

impl CellFaces {
    pub fn new(id: usize, bounds: BoundingBox) -> CellFaces {
        let vertices: Vec<f64> = vec![
            bounds.min_x, bounds.min_y, bounds.min_z, // 0
            bounds.max_x, bounds.min_y, bounds.min_z, // 1
            bounds.max_x, bounds.max_y, bounds.min_z, // 2
            bounds.min_x, bounds.max_y, bounds.min_z, // 3
            bounds.min_x, bounds.min_y, bounds.max_z, // 4
            bounds.max_x, bounds.min_y, bounds.max_z, // 5
            bounds.max_x, bounds.max_y, bounds.max_z, // 6
            bounds.min_x, bounds.max_y, bounds.max_z, // 7
        ];

        let face_indices: Vec<u16> = vec![
            3, 2, 1, 0, // Bottom (z-)
            4, 5, 6, 7, // Top (z+)
            0, 1, 5, 4, // Front (y-)
            2, 3, 7, 6, // Back (y+)
            0, 4, 7, 3, // Left (x-)
            1, 2, 6, 5, // Right (x+)
        ];

        CellFaces {
            id,
            vertices,
            face_counts: vec![4; 6],
            face_indices,
            face_neighbors: vec![
                BOX_ID_BOTTOM, // z-
                BOX_ID_TOP,    // z+
                BOX_ID_FRONT,  // y-
                BOX_ID_BACK,   // y+
                BOX_ID_LEFT,   // x-
                BOX_ID_RIGHT,  // x+
            ],
        }
    }

    /// The caller ID of the point that owns this cell.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Flat array of vertices [x, y, z, x, y, z, ...].
    pub fn vertices(&self) -> &[f64] {
        &self.vertices
    }

    /// Neighbor ID for each face, parallel to the face table.
    pub fn neighbors(&self) -> &[i32] {
        &self.face_neighbors
    }

    pub fn face_count(&self) -> usize {
        self.face_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Writes the count-prefixed face table into `out`: for every face its
    /// vertex count followed by that many indices into [`Self::vertices`].
    pub fn face_vertices_into(&self, out: &mut Vec<usize>) {
        out.clear();
        out.reserve(self.face_counts.len() + self.face_indices.len());
        let mut offset = 0;
        for &count in &self.face_counts {
            let count = count as usize;
            out.push(count);
            out.extend(self.face_indices[offset..offset + count].iter().map(|&i| i as usize));
            offset += count;
        }
    }

    pub fn faces(&self) -> Vec<Vec<usize>> {
        let mut faces: Vec<Vec<usize>> = Vec::with_capacity(self.face_counts.len());
        let mut offset: usize = 0;
        for &count in &self.face_counts {
            let count: usize = count as usize;
            faces.push(self.face_indices[offset..offset + count].iter().map(|&i| i as usize).collect());
            offset += count;
        }
        faces
    }

    pub fn volume(&self) -> f64 {
        let mut volume: f64 = 0.0;
        let mut index_offset: usize = 0;

        for &count in &self.face_counts {
            let count: usize = count as usize;
            if count < 3 {
                index_offset += count;
                continue;
            }

            // Fan triangulation around the first vertex of the face
            let p0 = self.vertex(self.face_indices[index_offset] as usize);
            for i in 1..count - 1 {
                let p1 = self.vertex(self.face_indices[index_offset + i] as usize);
                let p2 = self.vertex(self.face_indices[index_offset + i + 1] as usize);

                volume += p0[0] * (p1[1] * p2[2] - p1[2] * p2[1])
                    + p0[1] * (p1[2] * p2[0] - p1[0] * p2[2])
                    + p0[2] * (p1[0] * p2[1] - p1[1] * p2[0]);
            }
            index_offset += count;
        }

        (volume / 6.0).abs()
    }

    #[inline]
    fn vertex(&self, index: usize) -> [f64; 3] {
        [self.vertices[index * 3], self.vertices[index * 3 + 1], self.vertices[index * 3 + 2]]
    }

    /// Squared distance from `center` to the furthest vertex.
    pub fn max_radius_sq(&self, center: &[f64; 3]) -> f64 {
        let mut max_d2 = 0.0;
        for k in 0..self.vertices.len() / 3 {
            let d2 = dist_sq(&self.vertex(k), center);
            if d2 > max_d2 {
                max_d2 = d2;
            }
        }
        max_d2
    }

    /// Clip the cell by the half-space `(x - point) . normal <= 0`.
    ///
    /// The new face created on the cutting plane is tagged with `neighbor_id`.
    /// Returns `(true, new_max_radius_sq)` if the cell was modified, where the
    /// radius is measured from `generator` when given (0.0 otherwise), or
    /// `(false, 0.0)` if the plane does not cut the cell.
    pub fn clip(
        &mut self,
        point: &[f64; 3],
        normal: &[f64; 3],
        neighbor_id: i32,
        scratch: &mut CellFacesScratch,
        generator: Option<&[f64; 3]>,
    ) -> (bool, f64) {
        let num_verts = self.vertices.len() / 3;
        scratch.dists.clear();
        scratch.dists.reserve(num_verts);
        let mut all_inside = true;
        let mut all_outside = true;

        // 1. Signed distances
        for i in 0..num_verts {
            let v = self.vertex(i);
            let d = (v[0] - point[0]) * normal[0] + (v[1] - point[1]) * normal[1] + (v[2] - point[2]) * normal[2];
            scratch.dists.push(d);

            if d > EPSILON {
                all_inside = false;
            } else if d < -EPSILON {
                all_outside = false;
            }
        }

        if all_inside {
            return (false, 0.0);
        }
        if all_outside {
            self.vertices.clear();
            self.face_counts.clear();
            self.face_indices.clear();
            self.face_neighbors.clear();
            return (true, 0.0);
        }

        // 2. Keep vertices that are inside
        scratch.vertices.clear();
        scratch.face_counts.clear();
        scratch.face_indices.clear();
        scratch.face_neighbors.clear();
        scratch.on_plane.clear();
        scratch.old_to_new.clear();
        scratch.old_to_new.resize(num_verts, None);
        scratch.intersection_map.clear();
        scratch.lid_segments.clear();
        scratch.lid_map.clear();

        let mut max_d2 = 0.0;

        for i in 0..num_verts {
            if scratch.dists[i] <= EPSILON {
                let v = self.vertex(i);
                let new_idx = (scratch.vertices.len() / 3) as u16;
                scratch.vertices.extend_from_slice(&v);
                scratch.old_to_new[i] = Some(new_idx);
                scratch.on_plane.push(scratch.dists[i] >= -EPSILON);

                if let Some(g) = generator {
                    max_d2 = f64::max(max_d2, dist_sq(&v, g));
                }
            }
        }

        // 3. Clip each face, collecting the edges that lie on the cutting plane
        let mut index_offset = 0;
        for (face_idx, &count_u8) in self.face_counts.iter().enumerate() {
            let count = count_u8 as usize;
            let face_neighbor = self.face_neighbors[face_idx];
            let current_indices = &self.face_indices[index_offset..index_offset + count];
            index_offset += count;

            scratch.face_buffer.clear();

            for i in 0..count {
                let idx_s = current_indices[i] as usize;
                let idx_e = current_indices[(i + 1) % count] as usize;
                let d_s = scratch.dists[idx_s];
                let d_e = scratch.dists[idx_e];

                // Vertices within EPSILON of the plane are kept as they are, so
                // only edges that strictly cross it get a new vertex
                if d_e <= EPSILON {
                    if d_s > EPSILON && d_e < -EPSILON {
                        let idx = intersect_edge(&self.vertices, idx_s, idx_e, scratch, generator, &mut max_d2);
                        scratch.face_buffer.push(idx);
                    }
                    if let Some(idx) = scratch.old_to_new[idx_e] {
                        scratch.face_buffer.push(idx);
                    }
                } else if d_s < -EPSILON {
                    let idx = intersect_edge(&self.vertices, idx_s, idx_e, scratch, generator, &mut max_d2);
                    scratch.face_buffer.push(idx);
                }
            }

            if scratch.face_buffer.len() >= 3 {
                scratch.face_counts.push(scratch.face_buffer.len() as u8);
                scratch.face_neighbors.push(face_neighbor);

                let len = scratch.face_buffer.len();
                for i in 0..len {
                    let u = scratch.face_buffer[i];
                    let v = scratch.face_buffer[(i + 1) % len];
                    if scratch.on_plane[u as usize] && scratch.on_plane[v as usize] {
                        // Reversed so the lid is wound opposite to its neighbors
                        scratch.lid_segments.push((v, u));
                    }
                }
                scratch.face_indices.extend_from_slice(&scratch.face_buffer);
            }
        }

        // 4. Close the cell with a lid face on the cutting plane
        if !scratch.lid_segments.is_empty() {
            scratch.lid_buffer.clear();
            scratch.lid_map.resize(scratch.vertices.len() / 3, u16::MAX);
            for &(u, v) in &scratch.lid_segments {
                scratch.lid_map[u as usize] = v;
            }

            let (start, next) = scratch.lid_segments[0];
            scratch.lid_buffer.push(start);

            let mut current = next;
            while current != start && scratch.lid_buffer.len() <= scratch.lid_segments.len() {
                scratch.lid_buffer.push(current);
                current = scratch.lid_map[current as usize];
                if current == u16::MAX {
                    break;
                }
            }

            if scratch.lid_buffer.len() >= 3 {
                scratch.face_counts.push(scratch.lid_buffer.len() as u8);
                scratch.face_indices.extend_from_slice(&scratch.lid_buffer);
                scratch.face_neighbors.push(neighbor_id);
            }
        }

        std::mem::swap(&mut self.vertices, &mut scratch.vertices);
        std::mem::swap(&mut self.face_counts, &mut scratch.face_counts);
        std::mem::swap(&mut self.face_indices, &mut scratch.face_indices);
        std::mem::swap(&mut self.face_neighbors, &mut scratch.face_neighbors);

        (true, max_d2)
    }
}

/// Returns the index of the vertex where edge `(idx_s, idx_e)` crosses the
/// cutting plane, creating it on first use so both faces sharing the edge
/// reference the same vertex.
fn intersect_edge(
    vertices: &[f64],
    idx_s: usize,
    idx_e: usize,
    scratch: &mut CellFacesScratch,
    generator: Option<&[f64; 3]>,
    max_d2: &mut f64,
) -> u16 {
    let key = if idx_s < idx_e {
        (idx_s as u32) << 16 | (idx_e as u32)
    } else {
        (idx_e as u32) << 16 | (idx_s as u32)
    };
    if let Some(&(_, id)) = scratch.intersection_map.iter().find(|&&(k, _)| k == key) {
        return id;
    }

    let d_s = scratch.dists[idx_s];
    let d_e = scratch.dists[idx_e];
    let t = (d_s / (d_s - d_e)).clamp(0.0, 1.0);
    let p = [
        vertices[idx_s * 3] + t * (vertices[idx_e * 3] - vertices[idx_s * 3]),
        vertices[idx_s * 3 + 1] + t * (vertices[idx_e * 3 + 1] - vertices[idx_s * 3 + 1]),
        vertices[idx_s * 3 + 2] + t * (vertices[idx_e * 3 + 2] - vertices[idx_s * 3 + 2]),
    ];

    let new_idx = (scratch.vertices.len() / 3) as u16;
    scratch.vertices.extend_from_slice(&p);
    if let Some(g) = generator {
        *max_d2 = f64::max(*max_d2, dist_sq(&p, g));
    }
    scratch.on_plane.push(true);
    scratch.intersection_map.push((key, new_idx));
    new_idx
}

#[inline]
fn dist_sq(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 0.0, 1.0, 1.0, 1.0)
    }

    #[test]
    fn test_cell_faces_box() {
        let cell = CellFaces::new(0, unit_box());
        assert!((cell.volume() - 1.0).abs() < 1e-6);
        assert_eq!(cell.face_count(), 6);
        assert!(cell.neighbors().iter().all(|&n| n < 0));
    }

    #[test]
    fn test_cell_faces_clip() {
        let mut cell = CellFaces::new(0, unit_box());
        let mut scratch = CellFacesScratch::default();

        let (changed, _) = cell.clip(&[0.5, 0.5, 0.5], &[1.0, 0.0, 0.0], 10, &mut scratch, None);
        assert!(changed);
        assert!((cell.volume() - 0.5).abs() < 1e-6);

        // Right wall dropped, lid tagged with the neighbor
        assert_eq!(cell.face_count(), 6);
        assert!(!cell.neighbors().contains(&BOX_ID_RIGHT));
        assert_eq!(cell.neighbors().iter().filter(|&&n| n == 10).count(), 1);
    }

    #[test]
    fn test_clip_outside_plane_is_noop() {
        let mut cell = CellFaces::new(0, unit_box());
        let mut scratch = CellFacesScratch::default();
        let (changed, _) = cell.clip(&[2.0, 0.0, 0.0], &[1.0, 0.0, 0.0], 3, &mut scratch, None);
        assert!(!changed);
        assert_eq!(cell.face_count(), 6);
    }

    #[test]
    fn test_clip_everything_empties_cell() {
        let mut cell = CellFaces::new(0, unit_box());
        let mut scratch = CellFacesScratch::default();
        cell.clip(&[-1.0, 0.0, 0.0], &[1.0, 0.0, 0.0], 3, &mut scratch, None);
        assert!(cell.is_empty());
        assert_eq!(cell.face_count(), 0);
    }

    #[test]
    fn test_clip_reports_radius_from_generator() {
        let mut cell = CellFaces::new(0, unit_box());
        let mut scratch = CellFacesScratch::default();
        let g = [0.25, 0.5, 0.5];
        let (_, r2) = cell.clip(&[0.5, 0.5, 0.5], &[0.5, 0.0, 0.0], 1, &mut scratch, Some(&g));
        // Furthest corner of [0, 0.5] x [0, 1] x [0, 1] from g
        let expected = 0.25 * 0.25 + 0.5 * 0.5 + 0.5 * 0.5;
        assert!((r2 - expected).abs() < 1e-12);
        assert!((cell.max_radius_sq(&g) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_face_vertices_are_count_prefixed() {
        let cell = CellFaces::new(0, unit_box());
        let mut table = Vec::new();
        cell.face_vertices_into(&mut table);
        assert_eq!(table.len(), 6 * 5);
        assert_eq!(&table[0..5], &[4, 3, 2, 1, 0]);
        assert_eq!(cell.faces()[5], vec![1, 2, 6, 5]);
    }
}
