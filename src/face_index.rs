use std::ops::Range;

/// One planar face shared by exactly two cells.
///
/// Points are in the order the engine lists them: a closed boundary, but
/// without a winding convention that holds across faces.
#[derive(Clone, Debug, PartialEq)]
pub struct InterfacePolygon {
    pub(crate) points: Vec<[f64; 3]>,
}

impl InterfacePolygon {
    pub fn new(points: Vec<[f64; 3]>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Area by fan triangulation around the first point.
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let p0 = self.points[0];
        let mut area = 0.0;
        for w in self.points[1..].windows(2) {
            let v1 = [w[0][0] - p0[0], w[0][1] - p0[1], w[0][2] - p0[2]];
            let v2 = [w[1][0] - p0[0], w[1][1] - p0[1], w[1][2] - p0[2]];
            let cross = [
                v1[1] * v2[2] - v1[2] * v2[1],
                v1[2] * v2[0] - v1[0] * v2[2],
                v1[0] * v2[1] - v1[1] * v2[0],
            ];
            area += 0.5 * (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt();
        }
        area
    }

    /// Mean of the polygon's points.
    pub fn centroid(&self) -> [f64; 3] {
        if self.points.is_empty() {
            return [0.0; 3];
        }
        let n = self.points.len() as f64;
        let mut c = [0.0; 3];
        for p in &self.points {
            c[0] += p[0];
            c[1] += p[1];
            c[2] += p[2];
        }
        c.map(|v| v / n)
    }
}

/// Append-only registry of interface polygons.
///
/// Every polygon carries the `(owner, neighbor)` pair of cell IDs that share
/// it, and each cell ID maps to the half-open range of polygons first emitted
/// while its cell was processed. Cells that were never processed (rejected
/// points, failed cells) have no range.
#[derive(Clone, Debug, Default)]
pub struct FaceIndex {
    faces: Vec<InterfacePolygon>,
    pairs: Vec<(usize, usize)>,
    ranges: Vec<Option<Range<usize>>>,
}

impl FaceIndex {
    /// Creates an empty registry with range slots for `cell_count` cell IDs.
    pub fn new(cell_count: usize) -> Self {
        Self {
            faces: Vec::new(),
            pairs: Vec::new(),
            ranges: vec![None; cell_count],
        }
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Number of cell ID slots.
    pub fn cell_count(&self) -> usize {
        self.ranges.len()
    }

    pub fn faces(&self) -> &[InterfacePolygon] {
        &self.faces
    }

    /// `(owner, neighbor)` cell IDs, parallel to [`Self::faces`].
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InterfacePolygon, (usize, usize))> + '_ {
        self.faces.iter().zip(self.pairs.iter().copied())
    }

    /// Range of registry positions emitted while processing cell `id`.
    pub fn range(&self, id: usize) -> Option<Range<usize>> {
        self.ranges.get(id).cloned().flatten()
    }

    /// Polygons first emitted by cell `id`, empty if it has none.
    pub fn cell_faces(&self, id: usize) -> &[InterfacePolygon] {
        match self.range(id) {
            Some(range) => &self.faces[range],
            None => &[],
        }
    }

    /// Total number of polygon points, i.e. the number of `v` records in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.faces.iter().map(InterfacePolygon::len).sum()
    }

    pub(crate) fn push(&mut self, polygon: InterfacePolygon, owner: usize, neighbor: usize) {
        self.faces.push(polygon);
        self.pairs.push((owner, neighbor));
    }

    pub(crate) fn set_range(&mut self, id: usize, range: Range<usize>) {
        if id >= self.ranges.len() {
            self.ranges.resize(id + 1, None);
        }
        self.ranges[id] = Some(range);
    }
}
