//! Attractor-biased best-candidate ("blue noise") pedestrian placement.

use rand::Rng;

use crate::domains::crowding::ports::SurfaceDomain;
use crate::domains::crowding::types::{AttractorField, BoundingBox, Point3};

/// Lower bound on random candidates drawn per accepted point.
pub const MIN_CANDIDATES: usize = 10;

/// Number of candidates tried for the next point, given the pass's iteration
/// index and the number of points accepted so far.
pub fn candidate_count(iteration: usize, accepted: usize) -> usize {
    iteration.min(accepted).max(MIN_CANDIDATES)
}

pub struct PointSampler<'a> {
    domain: &'a dyn SurfaceDomain,
    field: &'a AttractorField,
}

impl<'a> PointSampler<'a> {
    pub fn new(domain: &'a dyn SurfaceDomain, field: &'a AttractorField) -> Self {
        Self { domain, field }
    }

    /// Places up to `target` points on the domain. Returns an empty vector for an
    /// invalid domain or a zero target.
    pub fn populate<R: Rng + ?Sized>(
        &self,
        target: usize,
        iteration: usize,
        rng: &mut R,
    ) -> Vec<Point3> {
        let bbox = match self.domain.bounding_box() {
            Some(b) if !b.is_degenerate() => b,
            _ => return Vec::new(),
        };
        if target == 0 {
            return Vec::new();
        }

        let mut accepted = Vec::with_capacity(target);
        accepted.push(self.random_point(&bbox, rng));

        while accepted.len() < target {
            let trials = candidate_count(iteration, accepted.len());
            let mut best_score = -1.0;
            let mut best: Option<Point3> = None;

            for _ in 0..trials {
                let candidate = self.random_point(&bbox, rng);
                let score = self.score(&candidate, &accepted);
                // first candidate is the fallback when every score is NaN
                if best.is_none() {
                    best = Some(candidate);
                }
                if score > best_score {
                    best_score = score;
                    best = Some(candidate);
                }
            }

            if let Some(p) = best {
                accepted.push(p);
            }
        }

        accepted
    }

    /// Spacing to the nearest accepted point, scaled by the attraction factor.
    fn score(&self, candidate: &Point3, accepted: &[Point3]) -> f64 {
        let spacing = accepted
            .iter()
            .map(|p| p.distance_to(candidate))
            .fold(f64::INFINITY, f64::min);
        spacing * self.field.factor(candidate)
    }

    fn random_point<R: Rng + ?Sized>(&self, bbox: &BoundingBox, rng: &mut R) -> Point3 {
        let raw = Point3::new(
            remap(rng.gen::<f64>(), bbox.min.x, bbox.max.x),
            remap(rng.gen::<f64>(), bbox.min.y, bbox.max.y),
            remap(rng.gen::<f64>(), bbox.min.z, bbox.max.z),
        );
        self.domain.closest_point(&raw)
    }
}

fn remap(t: f64, lo: f64, hi: f64) -> f64 {
    lo + t * (hi - lo)
}
