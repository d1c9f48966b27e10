//! Sample -> Project -> Estimate -> Aggregate -> Classify for each group.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{DomainError, DomainResult};
use crate::domains::crowding::aggregator::{aggregate_passes, PassKey};
use crate::domains::crowding::classifier::{classify, CellClass};
use crate::domains::crowding::estimator::DistanceEstimator;
use crate::domains::crowding::grid::{lattice_cell_count, project_grid, ProjectedGrid, MAX_GRID_CELLS};
use crate::domains::crowding::mesh::{build_meshes, ColorMesh};
use crate::domains::crowding::ports::SurfaceDomain;
use crate::domains::crowding::sampler::PointSampler;
use crate::domains::crowding::surface::SurfaceGroup;
use crate::domains::crowding::types::{
    pedestrian_target, AnalysisParams, AttractorField, CrowdingSample, Point3,
};

/// One analysis unit (e.g. a city block) and its sidewalk segments.
#[derive(Clone)]
pub struct GroupInput {
    pub name: String,
    pub pedestrian_count: f64,
    pub segments: Vec<Arc<dyn SurfaceDomain>>,
    pub attractors: Vec<Point3>,
}

impl fmt::Debug for GroupInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupInput")
            .field("name", &self.name)
            .field("pedestrian_count", &self.pedestrian_count)
            .field("segments", &self.segments.len())
            .field("attractors", &self.attractors.len())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub groups: Vec<GroupInput>,
    pub params: AnalysisParams,
}

impl AnalysisParams {
    pub fn validate(&self) -> DomainResult<()> {
        if !(self.grid_pitch.is_finite() && self.grid_pitch > 0.0) {
            return Err(DomainError::invalid_parameter(
                "grid_pitch",
                format!("must be a positive number, got {}", self.grid_pitch),
            ));
        }
        if self.iterations == 0 {
            return Err(DomainError::invalid_parameter(
                "iterations",
                "at least one iteration is required",
            ));
        }
        if !(self.desired_spacing.is_finite() && self.desired_spacing >= 0.0) {
            return Err(DomainError::invalid_parameter(
                "desired_spacing",
                format!("must be a non-negative number, got {}", self.desired_spacing),
            ));
        }
        if !(self.attractor_radius.is_finite() && self.attractor_radius >= 0.0) {
            return Err(DomainError::invalid_parameter(
                "attractor_radius",
                format!("must be a non-negative number, got {}", self.attractor_radius),
            ));
        }
        if !self.attractor_strength.is_finite() {
            return Err(DomainError::invalid_parameter(
                "attractor_strength",
                "must be finite",
            ));
        }
        Ok(())
    }
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed of one (group, segment, iteration) pass, independent of execution order.
pub fn pass_seed(seed: u64, group: usize, segment: usize, iteration: usize) -> u64 {
    [group, segment, iteration]
        .into_iter()
        .fold(splitmix64(seed), |h, part| splitmix64(h ^ part as u64))
}

/// Everything the passes of one group share. Cheap to clone.
#[derive(Clone)]
pub struct GroupPlan {
    pub group_index: usize,
    pub name: String,
    pub target: usize,
    pub segments: Vec<Arc<dyn SurfaceDomain>>,
    pub valid_segments: Vec<usize>,
    pub skipped_segments: Vec<usize>,
    pub grid: Arc<ProjectedGrid>,
    pub field: Arc<AttractorField>,
}

impl GroupPlan {
    /// Fails when the group's lattice at `params.grid_pitch` would exceed [`MAX_GRID_CELLS`].
    pub fn prepare(
        group_index: usize,
        group: &GroupInput,
        params: &AnalysisParams,
    ) -> DomainResult<Self> {
        let (valid_segments, skipped_segments): (Vec<usize>, Vec<usize>) =
            (0..group.segments.len()).partition(|&i| group.segments[i].is_valid());

        let surface = SurfaceGroup::new(&group.segments);
        if let Some(bbox) = surface.bounding_box() {
            if lattice_cell_count(&bbox, params.grid_pitch).is_none() {
                return Err(DomainError::invalid_parameter(
                    "grid_pitch",
                    format!(
                        "pitch {} over group {} needs more than {} cells",
                        params.grid_pitch, group.name, MAX_GRID_CELLS
                    ),
                ));
            }
        }
        let grid = project_grid(&surface, params.grid_pitch);
        let field = AttractorField::for_group(
            &group.attractors,
            params.attractor_radius,
            params.attractor_strength,
        );

        Ok(Self {
            group_index,
            name: group.name.clone(),
            target: pedestrian_target(group.pedestrian_count),
            segments: group.segments.clone(),
            valid_segments,
            skipped_segments,
            grid: Arc::new(grid),
            field: Arc::new(field),
        })
    }

    /// Pass keys in blend order.
    pub fn pass_keys(&self, iterations: u32) -> Vec<PassKey> {
        self.valid_segments
            .iter()
            .flat_map(|&segment| (0..iterations as usize).map(move |k| PassKey::new(segment, k)))
            .collect()
    }

    /// Estimates the cells lying on the pass's segment; every other cell is `None`.
    pub fn run_pass(&self, key: PassKey, seed: u64) -> Vec<Option<CrowdingSample>> {
        let segment = self.segments[key.segment].as_ref();
        let no_data = segment
            .bounding_box()
            .map(|b| b.diagonal())
            .unwrap_or_default();

        let mut rng = StdRng::seed_from_u64(pass_seed(
            seed,
            self.group_index,
            key.segment,
            key.iteration,
        ));
        let samples = PointSampler::new(segment, &self.field).populate(
            self.target,
            key.iteration,
            &mut rng,
        );

        let estimator = DistanceEstimator::new(&samples, no_data);
        self.grid
            .cells
            .iter()
            .map(|cell| {
                cell.filter(|c| segment.contains(&c.position))
                    .map(|c| estimator.estimate(&c.position))
            })
            .collect()
    }

    pub fn finish(
        &self,
        passes: &BTreeMap<PassKey, Vec<Option<CrowdingSample>>>,
        desired_spacing: f64,
    ) -> DomainResult<GroupReport> {
        let metrics = aggregate_passes(self.grid.len(), passes)?;
        let classification = classify(&metrics, desired_spacing);
        let (colored_grid, problem_area) = build_meshes(&self.grid, &classification);

        Ok(GroupReport {
            name: self.name.clone(),
            rows: self.grid.rows,
            columns: self.grid.columns,
            grid: self.grid.as_ref().clone(),
            metrics,
            cells: classification.cells,
            collision_count: classification.collision_count,
            collision_indices: classification.collision_indices,
            color_range: classification.range,
            colored_grid,
            problem_area,
            passes: passes.len(),
            skipped_segments: self.skipped_segments.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReport {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    pub grid: ProjectedGrid,
    pub metrics: Vec<Option<f64>>,
    pub cells: Vec<Option<CellClass>>,
    pub collision_count: usize,
    pub collision_indices: Vec<usize>,
    pub color_range: f64,
    pub colored_grid: ColorMesh,
    pub problem_area: ColorMesh,
    pub passes: usize,
    pub skipped_segments: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub params: AnalysisParams,
    pub groups: Vec<GroupReport>,
}

impl AnalysisReport {
    pub fn total_collisions(&self) -> usize {
        self.groups.iter().map(|g| g.collision_count).sum()
    }

    pub fn to_json(&self) -> DomainResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs one group's passes in canonical order.
pub fn analyze_group(plan: &GroupPlan, params: &AnalysisParams) -> DomainResult<GroupReport> {
    let passes: BTreeMap<PassKey, Vec<Option<CrowdingSample>>> = plan
        .pass_keys(params.iterations)
        .into_iter()
        .map(|key| (key, plan.run_pass(key, params.seed)))
        .collect();
    plan.finish(&passes, params.desired_spacing)
}

pub fn analyze(request: &AnalysisRequest) -> DomainResult<AnalysisReport> {
    request.params.validate()?;
    let groups = request
        .groups
        .iter()
        .enumerate()
        .map(|(i, g)| analyze_group(&GroupPlan::prepare(i, g, &request.params)?, &request.params))
        .collect::<DomainResult<Vec<_>>>()?;

    Ok(AnalysisReport {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        params: request.params.clone(),
        groups,
    })
}
