use crate::domains::crowding::{BoundingBox, Point3, SurfaceDomain};

/// Horizontal polygonal surface at a fixed elevation, with optional holes
/// (e.g. a block outline minus its building lots).
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarSurface {
    exterior: Vec<(f64, f64)>,
    holes: Vec<Vec<(f64, f64)>>,
    elevation: f64,
}

impl PlanarSurface {
    pub fn new(exterior: Vec<(f64, f64)>, holes: Vec<Vec<(f64, f64)>>, elevation: f64) -> Self {
        Self {
            exterior: strip_closing_vertex(exterior),
            holes: holes.into_iter().map(strip_closing_vertex).collect(),
            elevation,
        }
    }

    /// Axis-aligned rectangle from `(x0, y0)` to `(x1, y1)`.
    pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64, elevation: f64) -> Self {
        Self::new(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)], Vec::new(), elevation)
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    fn rings(&self) -> impl Iterator<Item = &Vec<(f64, f64)>> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }

    fn contains_xy(&self, x: f64, y: f64) -> bool {
        ring_contains(&self.exterior, x, y) && !self.holes.iter().any(|h| ring_contains(h, x, y))
    }
}

fn strip_closing_vertex(mut ring: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Even-odd crossing test.
fn ring_contains(ring: &[(f64, f64)], x: f64, y: f64) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn closest_on_segment(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> (f64, f64) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return a;
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0);
    (a.0 + t * dx, a.1 + t * dy)
}

impl SurfaceDomain for PlanarSurface {
    fn bounding_box(&self) -> Option<BoundingBox> {
        if self.exterior.len() < 3 {
            return None;
        }
        let corners: Vec<Point3> = self
            .exterior
            .iter()
            .map(|&(x, y)| Point3::new(x, y, self.elevation))
            .collect();
        BoundingBox::from_points(&corners)
    }

    fn closest_point(&self, p: &Point3) -> Point3 {
        if self.contains_xy(p.x, p.y) {
            return Point3::new(p.x, p.y, self.elevation);
        }
        let target = (p.x, p.y);
        let mut best = (p.x, p.y);
        let mut best_d = f64::INFINITY;
        for ring in self.rings() {
            for (i, &a) in ring.iter().enumerate() {
                let b = ring[(i + 1) % ring.len()];
                let c = closest_on_segment(a, b, target);
                let d = (c.0 - target.0).powi(2) + (c.1 - target.1).powi(2);
                if d < best_d {
                    best_d = d;
                    best = c;
                }
            }
        }
        Point3::new(best.0, best.1, self.elevation)
    }

    fn project_vertical(&self, p: &Point3) -> Option<Point3> {
        self.contains_xy(p.x, p.y)
            .then(|| Point3::new(p.x, p.y, self.elevation))
    }

    fn contains(&self, p: &Point3) -> bool {
        self.contains_xy(p.x, p.y)
    }
}
