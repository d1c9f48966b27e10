use crate::common::DomainResult;
use crate::domains::crowding::types::{BoundingBox, Point3};

/// Geometry capability the crowding core depends on. Implementations wrap
/// whatever surface representation the host uses; the core never mutates one.
pub trait SurfaceDomain: Send + Sync {
    /// `None` for a null or otherwise unusable surface.
    fn bounding_box(&self) -> Option<BoundingBox>;

    fn closest_point(&self, p: &Point3) -> Point3;

    /// Hit of the vertical line through `p`, nearest to `p` along z.
    fn project_vertical(&self, p: &Point3) -> Option<Point3>;

    /// Planar (XY) point-in-region test.
    fn contains(&self, p: &Point3) -> bool;

    fn is_valid(&self) -> bool {
        self.bounding_box().is_some_and(|b| !b.is_degenerate())
    }
}

/// Port for reading scenario documents (sidewalk segments, attractors, counts).
pub trait ScenarioSource: Send + Sync {
    fn load_geojson(&self, name: &str) -> DomainResult<String>;
}
