/// Indexed coordinate lookup for a fixed number of points.
///
/// Implementations make no assumption about backing storage: arrays of
/// `[f64; 3]`, flat `[x, y, z, x, y, z, ...]` buffers, or generators that
/// compute coordinates on demand through [`FnPoints`].
pub trait PointSource {
    /// Number of points available.
    fn count(&self) -> usize;

    /// Coordinate `axis` (0 = x, 1 = y, 2 = z) of point `index`.
    fn coord(&self, index: usize, axis: usize) -> f64;

    /// Convenience accessor for all three coordinates of a point.
    fn point(&self, index: usize) -> [f64; 3] {
        [self.coord(index, 0), self.coord(index, 1), self.coord(index, 2)]
    }
}

impl PointSource for [[f64; 3]] {
    fn count(&self) -> usize {
        self.len()
    }

    fn coord(&self, index: usize, axis: usize) -> f64 {
        self[index][axis]
    }
}

impl PointSource for Vec<[f64; 3]> {
    fn count(&self) -> usize {
        self.len()
    }

    fn coord(&self, index: usize, axis: usize) -> f64 {
        self[index][axis]
    }
}

impl<const N: usize> PointSource for [[f64; 3]; N] {
    fn count(&self) -> usize {
        N
    }

    fn coord(&self, index: usize, axis: usize) -> f64 {
        self[index][axis]
    }
}

/// Flat coordinate buffer `[x, y, z, x, y, z, ...]`.
///
/// Trailing values that do not form a full triple are ignored.
#[derive(Clone, Copy, Debug)]
pub struct FlatPoints<'a>(pub &'a [f64]);

impl PointSource for FlatPoints<'_> {
    fn count(&self) -> usize {
        self.0.len() / 3
    }

    fn coord(&self, index: usize, axis: usize) -> f64 {
        self.0[index * 3 + axis]
    }
}

/// Points produced by a callback `f(index, axis)`.
pub struct FnPoints<F> {
    count: usize,
    f: F,
}

impl<F> FnPoints<F>
where
    F: Fn(usize, usize) -> f64,
{
    pub fn new(count: usize, f: F) -> Self {
        Self { count, f }
    }
}

impl<F> PointSource for FnPoints<F>
where
    F: Fn(usize, usize) -> f64,
{
    fn count(&self) -> usize {
        self.count
    }

    fn coord(&self, index: usize, axis: usize) -> f64 {
        (self.f)(index, axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_sources_agree() {
        let arr = [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]];
        let vec = arr.to_vec();
        let flat = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];

        assert_eq!(arr.count(), 2);
        assert_eq!(vec.count(), 2);
        assert_eq!(FlatPoints(&flat).count(), 2);

        for i in 0..2 {
            assert_eq!(arr.point(i), vec.point(i));
            assert_eq!(arr.point(i), FlatPoints(&flat).point(i));
        }
    }

    #[test]
    fn test_fn_points() {
        let points = FnPoints::new(4, |i, axis| (i * 3 + axis) as f64);
        assert_eq!(points.count(), 4);
        assert_eq!(points.point(2), [6.0, 7.0, 8.0]);
    }
}
