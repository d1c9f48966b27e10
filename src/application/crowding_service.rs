// Crowding Service - runs analysis requests serially or on a blocking worker pool
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, Semaphore};
use uuid::Uuid;

use crate::common::{ApplicationError, ApplicationResult};
use crate::domains::crowding::{
    AnalysisEvent, AnalysisReport, AnalysisRequest, CrowdingSample, GroupPlan, GroupReport,
    PassKey,
};
use crate::domains::logger::DynLogger;

type PassMap = BTreeMap<PassKey, Vec<Option<CrowdingSample>>>;

pub struct CrowdingService {
    logger: DynLogger,
    events: Option<mpsc::Sender<AnalysisEvent>>,
    workers: usize,
}

impl CrowdingService {
    pub fn new(logger: DynLogger) -> Self {
        Self {
            logger,
            events: None,
            workers: 4,
        }
    }

    /// Progress events are offered with `try_send`; a full or closed channel drops them.
    pub fn with_events(mut self, sender: mpsc::Sender<AnalysisEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub async fn execute(
        &self,
        request: &AnalysisRequest,
        parallel: bool,
    ) -> ApplicationResult<AnalysisReport> {
        if parallel {
            self.run_parallel(request).await
        } else {
            self.run(request)
        }
    }

    pub fn run(&self, request: &AnalysisRequest) -> ApplicationResult<AnalysisReport> {
        let run_id = self.start(request)?;
        let params = &request.params;

        let mut groups = Vec::with_capacity(request.groups.len());
        for plan in self.plans(run_id, request)? {
            let passes: PassMap = plan
                .pass_keys(params.iterations)
                .into_iter()
                .map(|key| {
                    self.logger.debug(&format!(
                        "group {} segment {} iteration {}",
                        plan.name, key.segment, key.iteration
                    ));
                    (key, plan.run_pass(key, params.seed))
                })
                .collect();
            groups.push(self.finish_group(run_id, &plan, &passes, params.desired_spacing)?);
        }

        Ok(self.complete(run_id, request, groups))
    }

    /// Same result as [`CrowdingService::run`]: passes run on `spawn_blocking`
    /// workers, but are blended in segment/iteration order.
    pub async fn run_parallel(&self, request: &AnalysisRequest) -> ApplicationResult<AnalysisReport> {
        let run_id = self.start(request)?;
        let params = &request.params;
        let plans: Vec<Arc<GroupPlan>> = self.plans(run_id, request)?.into_iter().map(Arc::new).collect();
        let semaphore = Arc::new(Semaphore::new(self.workers));

        let mut handles = Vec::new();
        for plan in &plans {
            for key in plan.pass_keys(params.iterations) {
                let permit = semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| ApplicationError::Worker(e.to_string()))?;
                let group = plan.group_index;
                let worker_plan = Arc::clone(plan);
                let seed = params.seed;
                let handle = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    worker_plan.run_pass(key, seed)
                });
                handles.push((group, key, handle));
            }
        }

        let mut pass_maps: Vec<PassMap> = vec![PassMap::new(); plans.len()];
        for (group, key, handle) in handles {
            let pass = handle.await.map_err(|e| {
                ApplicationError::Worker(format!("pass {:?} of group {} failed: {}", key, group, e))
            })?;
            pass_maps[group].insert(key, pass);
        }

        let mut groups = Vec::with_capacity(plans.len());
        for (plan, passes) in plans.iter().zip(&pass_maps) {
            groups.push(self.finish_group(run_id, plan, passes, params.desired_spacing)?);
        }

        Ok(self.complete(run_id, request, groups))
    }

    fn start(&self, request: &AnalysisRequest) -> ApplicationResult<Uuid> {
        request.params.validate()?;
        let run_id = Uuid::new_v4();
        self.logger.info(&format!(
            "run {} started: {} groups, {} iterations, pitch {}",
            run_id,
            request.groups.len(),
            request.params.iterations,
            request.params.grid_pitch
        ));
        self.emit(AnalysisEvent::RunStarted {
            run_id,
            group_count: request.groups.len(),
            timestamp: Utc::now(),
        });
        Ok(run_id)
    }

    fn plans(&self, run_id: Uuid, request: &AnalysisRequest) -> ApplicationResult<Vec<GroupPlan>> {
        request
            .groups
            .iter()
            .enumerate()
            .map(|(i, group)| -> ApplicationResult<GroupPlan> {
                let plan = GroupPlan::prepare(i, group, &request.params)?;
                for &segment in &plan.skipped_segments {
                    self.logger.warn(&format!(
                        "group {} segment {} has no usable surface, skipping",
                        plan.name, segment
                    ));
                    self.emit(AnalysisEvent::SegmentSkipped {
                        run_id,
                        group: plan.name.clone(),
                        segment,
                        timestamp: Utc::now(),
                    });
                }
                if plan.target == 0 {
                    self.logger.warn(&format!(
                        "group {} has no pedestrians, every cell reports no data",
                        plan.name
                    ));
                }
                Ok(plan)
            })
            .collect()
    }

    fn finish_group(
        &self,
        run_id: Uuid,
        plan: &GroupPlan,
        passes: &PassMap,
        desired_spacing: f64,
    ) -> ApplicationResult<GroupReport> {
        let report = plan.finish(passes, desired_spacing)?;
        let present = report.metrics.iter().filter(|m| m.is_some()).count();
        self.logger.info(&format!(
            "group {}: {} of {} cells below {}",
            report.name, report.collision_count, present, desired_spacing
        ));
        self.emit(AnalysisEvent::GroupCompleted {
            run_id,
            group: report.name.clone(),
            cell_count: present,
            collision_count: report.collision_count,
            timestamp: Utc::now(),
        });
        Ok(report)
    }

    fn complete(&self, run_id: Uuid, request: &AnalysisRequest, groups: Vec<GroupReport>) -> AnalysisReport {
        let report = AnalysisReport {
            run_id,
            generated_at: Utc::now(),
            params: request.params.clone(),
            groups,
        };
        let total_collisions = report.total_collisions();
        self.logger.info(&format!("run {} completed: {} crowded cells", run_id, total_collisions));
        self.emit(AnalysisEvent::RunCompleted {
            run_id,
            total_collisions,
            timestamp: Utc::now(),
        });
        report
    }

    fn emit(&self, event: AnalysisEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.try_send(event);
        }
    }
}
