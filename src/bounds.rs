/// Wall ID for the bottom face, it is negative to prevent conflicts with generator IDs.
pub const BOX_ID_BOTTOM: i32 = -1;
/// Wall ID for the top face, it is negative to prevent conflicts with generator IDs.
pub const BOX_ID_TOP: i32 = -2;
/// Wall ID for the front face, it is negative to prevent conflicts with generator IDs.
pub const BOX_ID_FRONT: i32 = -3;
/// Wall ID for the back face, it is negative to prevent conflicts with generator IDs.
pub const BOX_ID_BACK: i32 = -4;
/// Wall ID for the left face, it is negative to prevent conflicts with generator IDs.
pub const BOX_ID_LEFT: i32 = -5;
/// Wall ID for the right face, it is negative to prevent conflicts with generator IDs.
pub const BOX_ID_RIGHT: i32 = -6;

/// Returns true if a face neighbor ID denotes a container wall rather than another cell.
#[inline]
pub fn is_wall(neighbor_id: i32) -> bool {
    neighbor_id < 0
}

/// Axis-aligned box defining the valid coordinate domain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_z: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, min_z: f64, max_x: f64, max_y: f64, max_z: f64) -> Self {
        Self { min_x, min_y, min_z, max_x, max_y, max_z }
    }

    /// Builds a box from per-axis ranges, in the `(xmin, xmax, ymin, ymax, zmin, zmax)` order.
    pub fn from_ranges(xmin: f64, xmax: f64, ymin: f64, ymax: f64, zmin: f64, zmax: f64) -> Self {
        Self::new(xmin, ymin, zmin, xmax, ymax, zmax)
    }

    /// Inclusive membership test on all three axes.
    pub fn contains(&self, x: f64, y: f64, z: f64) -> bool {
        x >= self.min_x
            && x <= self.max_x
            && y >= self.min_y
            && y <= self.max_y
            && z >= self.min_z
            && z <= self.max_z
    }

    pub fn volume(&self) -> f64 {
        (self.max_x - self.min_x) * (self.max_y - self.min_y) * (self.max_z - self.min_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive() {
        let bounds = BoundingBox::new(0.0, 0.0, 0.0, 1.0, 1.0, 1.0);
        assert!(bounds.contains(0.0, 0.0, 0.0));
        assert!(bounds.contains(1.0, 1.0, 1.0));
        assert!(bounds.contains(0.5, 0.2, 0.9));
        assert!(!bounds.contains(1.0 + 1e-12, 0.5, 0.5));
        assert!(!bounds.contains(0.5, -0.1, 0.5));
        assert!(!bounds.contains(0.5, 0.5, 2.0));
    }

    #[test]
    fn test_from_ranges_order() {
        let bounds = BoundingBox::from_ranges(0.0, 10.0, 1.0, 20.0, 2.0, 30.0);
        assert_eq!(bounds, BoundingBox::new(0.0, 1.0, 2.0, 10.0, 20.0, 30.0));
        assert!((bounds.volume() - 10.0 * 19.0 * 28.0).abs() < 1e-9);
    }

    #[test]
    fn test_wall_ids_are_sentinels() {
        for id in [BOX_ID_BOTTOM, BOX_ID_TOP, BOX_ID_FRONT, BOX_ID_BACK, BOX_ID_LEFT, BOX_ID_RIGHT] {
            assert!(is_wall(id));
        }
        assert!(!is_wall(0));
        assert!(!is_wall(7));
    }
}
