use serde::{Deserialize, Serialize};

/// Radius used when a group has no attractors, or an unusable radius.
pub const NEUTRAL_ATTRACTOR_RADIUS: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Point3 = Point3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_squared(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance_to(&self, other: &Point3) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Point3 {
        Point3::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// Axis-aligned 3D box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing all `points`; `None` for an empty iterator.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bbox = BoundingBox::new(first, first);
        for p in iter {
            bbox.include(p);
        }
        Some(bbox)
    }

    pub fn include(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut merged = *self;
        merged.include(&other.min);
        merged.include(&other.max);
        merged
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn diagonal(&self) -> f64 {
        self.min.distance_to(&self.max)
    }

    /// Zero (or negative / non-finite) XY extent.
    pub fn is_degenerate(&self) -> bool {
        let (w, h) = (self.width(), self.height());
        !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0)
    }
}

/// Attractor points of one group together with their shared radius and exponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractorField {
    pub points: Vec<Point3>,
    pub radius: f64,
    pub exponent: f64,
}

impl AttractorField {
    /// Field that leaves the sampler unbiased: `(x / r)^0 == 1` for every candidate.
    pub fn neutral() -> Self {
        Self {
            points: vec![Point3::ORIGIN],
            radius: NEUTRAL_ATTRACTOR_RADIUS,
            exponent: 0.0,
        }
    }

    /// Builds the field for a group, degrading to [`AttractorField::neutral`] when
    /// there are no attractor points.
    pub fn for_group(points: &[Point3], radius: f64, exponent: f64) -> Self {
        if points.is_empty() {
            return Self::neutral();
        }
        let radius = if radius.is_finite() && radius > 0.0 {
            radius
        } else {
            NEUTRAL_ATTRACTOR_RADIUS
        };
        Self {
            points: points.to_vec(),
            radius,
            exponent,
        }
    }

    pub fn nearest_distance(&self, p: &Point3) -> f64 {
        self.points
            .iter()
            .map(|a| a.distance_to(p))
            .fold(f64::INFINITY, f64::min)
    }

    /// Multiplier applied to a candidate's spacing score. Closer to an attractor
    /// yields a larger factor for positive exponents.
    pub fn factor(&self, p: &Point3) -> f64 {
        let clipped = self.nearest_distance(p).min(self.radius);
        (clipped / self.radius).powf(-self.exponent)
    }
}

/// One crowding value for one grid cell of one (segment, iteration) pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CrowdingSample {
    Measured(f64),
    /// Too few sample points to estimate; carries the segment's bounding-box diagonal.
    NoData(f64),
}

impl CrowdingSample {
    pub fn value(&self) -> f64 {
        match self {
            CrowdingSample::Measured(v) | CrowdingSample::NoData(v) => *v,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, CrowdingSample::NoData(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Tunables of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub desired_spacing: f64,
    pub grid_pitch: f64,
    pub iterations: u32,
    pub attractor_radius: f64,
    pub attractor_strength: f64,
    pub seed: u64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            desired_spacing: 6.0,
            grid_pitch: 3.0,
            iterations: 5,
            attractor_radius: 30.0,
            attractor_strength: 2.0,
            seed: 42,
        }
    }
}

/// Host-style integer conversion of a pedestrian count: round half to even.
pub fn pedestrian_target(count: f64) -> usize {
    if !count.is_finite() {
        return 0;
    }
    let rounded = count.round_ties_even();
    if rounded <= 0.0 {
        0
    } else {
        rounded as usize
    }
}
