//! Local personal-space estimate at grid points from one sampled point set.

use crate::domains::crowding::grid::ProjectedGrid;
use crate::domains::crowding::types::{CrowdingSample, Point3};

/// Minimum distinct sample positions for a meaningful estimate.
pub const MIN_DISTINCT_SAMPLES: usize = 3;

/// Read-only nearest-neighbour index over a sample set (linear scan).
pub struct SampleIndex<'a> {
    points: &'a [Point3],
    nearest_other: Vec<f64>,
}

impl<'a> SampleIndex<'a> {
    pub fn new(points: &'a [Point3]) -> Self {
        let nearest_other = (0..points.len())
            .map(|i| {
                points
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, q)| q.distance_to(&points[i]))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        Self {
            points,
            nearest_other,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Indices of the two closest samples to `p`, closest first. Ties keep the
    /// lower index first.
    pub fn nearest_two(&self, p: &Point3) -> Option<(usize, usize)> {
        let mut first: Option<(usize, f64)> = None;
        let mut second: Option<(usize, f64)> = None;

        for (i, q) in self.points.iter().enumerate() {
            let d = q.distance_squared(p);
            match first {
                Some((_, fd)) if d >= fd => {
                    if second.map_or(true, |(_, sd)| d < sd) {
                        second = Some((i, d));
                    }
                }
                _ => {
                    second = first;
                    first = Some((i, d));
                }
            }
        }

        match (first, second) {
            (Some((a, _)), Some((b, _))) => Some((a, b)),
            _ => None,
        }
    }

    /// Distance from sample `i` to its nearest other sample.
    pub fn nearest_other_distance(&self, i: usize) -> f64 {
        self.nearest_other[i]
    }

    pub fn point(&self, i: usize) -> &Point3 {
        &self.points[i]
    }
}

pub fn distinct_count_at_least(points: &[Point3], n: usize) -> bool {
    let mut distinct: Vec<&Point3> = Vec::with_capacity(n);
    for p in points {
        if !distinct.iter().any(|q| *q == p) {
            distinct.push(p);
            if distinct.len() >= n {
                return true;
            }
        }
    }
    distinct.len() >= n
}

pub struct DistanceEstimator<'a> {
    index: SampleIndex<'a>,
    sufficient: bool,
    no_data_value: f64,
}

impl<'a> DistanceEstimator<'a> {
    /// `no_data_value` is reported for every cell when the set has fewer than
    /// [`MIN_DISTINCT_SAMPLES`] distinct positions.
    pub fn new(samples: &'a [Point3], no_data_value: f64) -> Self {
        Self {
            sufficient: distinct_count_at_least(samples, MIN_DISTINCT_SAMPLES),
            index: SampleIndex::new(samples),
            no_data_value,
        }
    }

    /// Mean of the grid point's distances to its two nearest samples and of
    /// those samples' own nearest-neighbour distances.
    pub fn estimate(&self, grid_point: &Point3) -> CrowdingSample {
        if !self.sufficient {
            return CrowdingSample::NoData(self.no_data_value);
        }
        let (a, b) = match self.index.nearest_two(grid_point) {
            Some(pair) => pair,
            None => return CrowdingSample::NoData(self.no_data_value),
        };
        let total = grid_point.distance_to(self.index.point(a))
            + grid_point.distance_to(self.index.point(b))
            + self.index.nearest_other_distance(a)
            + self.index.nearest_other_distance(b);
        CrowdingSample::Measured(total / 4.0)
    }

    pub fn estimate_grid(&self, grid: &ProjectedGrid) -> Vec<Option<CrowdingSample>> {
        grid.cells
            .iter()
            .map(|cell| cell.map(|c| self.estimate(&c.position)))
            .collect()
    }
}
