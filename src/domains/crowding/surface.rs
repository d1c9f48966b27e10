use std::sync::Arc;

use crate::domains::crowding::ports::SurfaceDomain;
use crate::domains::crowding::types::{BoundingBox, Point3};

/// All valid segments of one group seen as a single surface.
#[derive(Clone)]
pub struct SurfaceGroup {
    members: Vec<Arc<dyn SurfaceDomain>>,
    bbox: Option<BoundingBox>,
}

impl SurfaceGroup {
    /// Invalid segments are left out; check [`SurfaceDomain::is_valid`] beforehand
    /// to report them.
    pub fn new(segments: &[Arc<dyn SurfaceDomain>]) -> Self {
        let members: Vec<Arc<dyn SurfaceDomain>> =
            segments.iter().filter(|s| s.is_valid()).cloned().collect();
        let bbox = members
            .iter()
            .filter_map(|m| m.bounding_box())
            .reduce(|a, b| a.union(&b));
        Self { members, bbox }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl SurfaceDomain for SurfaceGroup {
    fn bounding_box(&self) -> Option<BoundingBox> {
        self.bbox
    }

    fn closest_point(&self, p: &Point3) -> Point3 {
        self.members
            .iter()
            .map(|m| m.closest_point(p))
            .min_by(|a, b| a.distance_squared(p).total_cmp(&b.distance_squared(p)))
            .unwrap_or(*p)
    }

    fn project_vertical(&self, p: &Point3) -> Option<Point3> {
        self.members
            .iter()
            .filter_map(|m| m.project_vertical(p))
            .min_by(|a, b| (a.z - p.z).abs().total_cmp(&(b.z - p.z).abs()))
    }

    fn contains(&self, p: &Point3) -> bool {
        self.members.iter().any(|m| m.contains(p))
    }
}
