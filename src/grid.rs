use crate::bounds::BoundingBox;

/// Expected number of points per block used when no hint is given.
pub const DEFAULT_POINTS_PER_BLOCK: usize = 8;

/// Uniform block partition of the bounding box used to find nearby points.
///
/// Blocks are visited in order of increasing minimum distance so the search
/// can stop once no block can hold a point that still cuts the cell.
pub struct BlockGrid {
    res: [usize; 3],
    scale: [f64; 3],
    limit: [f64; 3],
    min: [f64; 3],
    /// Point indices in each block.
    bins: Vec<Vec<usize>>,
    /// Block of each point.
    point_bins: Vec<usize>,
    /// Block offsets sorted by their minimum squared distance.
    search_order: Vec<(isize, isize, isize, f64)>,
}

impl BlockGrid {
    /// Creates a grid with `nx * ny * nz` blocks over `bounds`.
    pub fn new(nx: usize, ny: usize, nz: usize, bounds: &BoundingBox) -> Self {
        let res = [nx.max(1), ny.max(1), nz.max(1)];
        let extent = [
            bounds.max_x - bounds.min_x,
            bounds.max_y - bounds.min_y,
            bounds.max_z - bounds.min_z,
        ];
        let scale = [0usize, 1, 2].map(|a| if extent[a] > 0.0 { res[a] as f64 / extent[a] } else { 0.0 });
        let block_size = [0usize, 1, 2].map(|a| if scale[a] > 0.0 { 1.0 / scale[a] } else { 0.0 });

        let (rx, ry, rz) = (res[0] as isize, res[1] as isize, res[2] as isize);
        let mut search_order = Vec::with_capacity(((2 * rx + 1) * (2 * ry + 1) * (2 * rz + 1)) as usize);
        for z in -rz..=rz {
            for y in -ry..=ry {
                for x in -rx..=rx {
                    search_order.push((x, y, z, min_block_dist_sq([x, y, z], block_size)));
                }
            }
        }
        search_order.sort_unstable_by(|a, b| a.3.partial_cmp(&b.3).unwrap_or(std::cmp::Ordering::Equal));

        BlockGrid {
            res,
            scale,
            limit: res.map(|r| r as f64 - 1e-5),
            min: [bounds.min_x, bounds.min_y, bounds.min_z],
            bins: vec![Vec::new(); res[0] * res[1] * res[2]],
            point_bins: Vec::new(),
            search_order,
        }
    }

    /// Picks a block shape so that each block holds about `points_per_block` points.
    pub fn with_occupancy(count: usize, points_per_block: usize, bounds: &BoundingBox) -> Self {
        let extent = [
            bounds.max_x - bounds.min_x,
            bounds.max_y - bounds.min_y,
            bounds.max_z - bounds.min_z,
        ];
        let volume = extent[0] * extent[1] * extent[2];
        let per_block = points_per_block.max(1) as f64;
        let res = if volume > 0.0 {
            let inv_len = (count as f64 / (per_block * volume)).cbrt();
            extent.map(|e| ((e * inv_len) as usize + 1).min(1 << 10))
        } else {
            [1, 1, 1]
        };
        Self::new(res[0], res[1], res[2], bounds)
    }

    pub fn shape(&self) -> [usize; 3] {
        self.res
    }

    fn block_coords(&self, p: &[f64; 3]) -> [usize; 3] {
        [0usize, 1, 2].map(|a| ((p[a] - self.min[a]) * self.scale[a]).clamp(0.0, self.limit[a]) as usize)
    }

    /// Linear index of the block holding `p`.
    pub fn block_index(&self, p: &[f64; 3]) -> usize {
        let [ix, iy, iz] = self.block_coords(p);
        ix + iy * self.res[0] + iz * self.res[0] * self.res[1]
    }

    /// Re-bins all points of a flat `[x, y, z, ...]` buffer.
    pub fn insert_all(&mut self, points: &[f64]) {
        self.bins.iter_mut().for_each(|bin| bin.clear());
        let count = points.len() / 3;
        self.point_bins = Vec::with_capacity(count);
        for i in 0..count {
            let bin = self.block_index(&[points[i * 3], points[i * 3 + 1], points[i * 3 + 2]]);
            self.bins[bin].push(i);
            self.point_bins.push(bin);
        }
    }

    /// Visits candidate neighbors of point `index` nearest blocks first.
    ///
    /// The visitor receives the neighbor's index, its position and the
    /// current squared search radius, and returns the updated radius. Blocks
    /// further than twice the radius are never visited.
    pub fn visit_neighbors<F>(&self, points: &[f64], index: usize, pos: [f64; 3], max_dist_sq: &mut f64, mut visitor: F)
    where
        F: FnMut(usize, [f64; 3], f64) -> f64,
    {
        let bin_idx = self.point_bins[index];
        let plane = self.res[0] * self.res[1];
        let origin = [bin_idx % self.res[0], (bin_idx % plane) / self.res[0], bin_idx / plane];
        let rel = [0usize, 1, 2].map(|a| (pos[a] - self.min[a]) * self.scale[a] - origin[a] as f64);

        for &(dx, dy, dz, min_d2) in &self.search_order {
            if min_d2 > 4.0 * *max_dist_sq {
                break;
            }

            let offset = [dx, dy, dz];
            let b = [0usize, 1, 2].map(|a| origin[a] as isize + offset[a]);
            if (0..3).any(|a| b[a] < 0 || b[a] >= self.res[a] as isize) {
                continue;
            }

            // Exact gap between the point and the block
            let mut gap_sq = 0.0;
            for a in 0..3 {
                let o = offset[a];
                let steps = if o > 0 {
                    o as f64 - rel[a]
                } else if o < 0 {
                    -(o + 1) as f64 + rel[a]
                } else {
                    0.0
                };
                let gap = if self.scale[a] > 0.0 { (steps / self.scale[a]).max(0.0) } else { 0.0 };
                gap_sq += gap * gap;
            }
            if gap_sq > 4.0 * *max_dist_sq {
                continue;
            }

            let bin = b[0] as usize + b[1] as usize * self.res[0] + b[2] as usize * plane;
            for &j in &self.bins[bin] {
                if j == index {
                    continue;
                }
                let other = [points[j * 3], points[j * 3 + 1], points[j * 3 + 2]];
                *max_dist_sq = visitor(j, other, *max_dist_sq);
            }
        }
    }
}

fn min_block_dist_sq(offset: [isize; 3], block_size: [f64; 3]) -> f64 {
    let mut d2 = 0.0;
    for a in 0..3 {
        let steps = (offset[a].unsigned_abs() as f64 - 1.0).max(0.0);
        let d = steps * block_size[a];
        d2 += d * d;
    }
    d2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_bounds() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 0.0, 100.0, 100.0, 100.0)
    }

    #[test]
    fn test_block_indices() {
        let grid = BlockGrid::new(10, 10, 10, &mock_bounds());
        assert_eq!(grid.block_index(&[5.0, 5.0, 5.0]), 0);
        assert_eq!(grid.block_index(&[15.0, 5.0, 5.0]), 1);
        assert_eq!(grid.block_index(&[5.0, 15.0, 5.0]), 10);
        assert_eq!(grid.block_index(&[5.0, 5.0, 15.0]), 100);
        // Upper bound is clamped into the last block
        assert_eq!(grid.block_index(&[100.0, 100.0, 100.0]), 999);
    }

    #[test]
    fn test_occupancy_sizing() {
        let bounds = mock_bounds();
        assert_eq!(BlockGrid::with_occupancy(2, 8, &bounds).shape(), [1, 1, 1]);
        assert_eq!(BlockGrid::with_occupancy(9261, 8, &bounds).shape(), [11, 11, 11]);
    }

    #[test]
    fn test_visit_finds_all_with_large_radius() {
        let bounds = mock_bounds();
        let mut grid = BlockGrid::new(4, 4, 4, &bounds);
        let points = vec![
            10.0, 10.0, 10.0,
            90.0, 90.0, 90.0,
            50.0, 50.0, 50.0,
        ];
        grid.insert_all(&points);

        let mut seen = Vec::new();
        let mut r2 = f64::MAX / 8.0;
        grid.visit_neighbors(&points, 0, [10.0, 10.0, 10.0], &mut r2, |j, _, r| {
            seen.push(j);
            r
        });
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_visit_prunes_distant_blocks() {
        let bounds = mock_bounds();
        let mut grid = BlockGrid::new(10, 10, 10, &bounds);
        let points = vec![
            5.0, 5.0, 5.0,
            7.0, 5.0, 5.0,
            95.0, 95.0, 95.0,
        ];
        grid.insert_all(&points);

        let mut seen = Vec::new();
        let mut r2 = 4.0;
        grid.visit_neighbors(&points, 0, [5.0, 5.0, 5.0], &mut r2, |j, _, r| {
            seen.push(j);
            r
        });
        assert_eq!(seen, vec![1]);
    }
}
