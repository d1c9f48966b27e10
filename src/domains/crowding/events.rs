use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnalysisEvent {
    RunStarted {
        run_id: Uuid,
        group_count: usize,
        timestamp: DateTime<Utc>,
    },
    SegmentSkipped {
        run_id: Uuid,
        group: String,
        segment: usize,
        timestamp: DateTime<Utc>,
    },
    GroupCompleted {
        run_id: Uuid,
        group: String,
        cell_count: usize,
        collision_count: usize,
        timestamp: DateTime<Utc>,
    },
    RunCompleted {
        run_id: Uuid,
        total_collisions: usize,
        timestamp: DateTime<Utc>,
    },
}

impl AnalysisEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            AnalysisEvent::RunStarted { .. } => "RunStarted",
            AnalysisEvent::SegmentSkipped { .. } => "SegmentSkipped",
            AnalysisEvent::GroupCompleted { .. } => "GroupCompleted",
            AnalysisEvent::RunCompleted { .. } => "RunCompleted",
        }
    }

    pub fn run_id(&self) -> Uuid {
        match self {
            AnalysisEvent::RunStarted { run_id, .. }
            | AnalysisEvent::SegmentSkipped { run_id, .. }
            | AnalysisEvent::GroupCompleted { run_id, .. }
            | AnalysisEvent::RunCompleted { run_id, .. } => *run_id,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AnalysisEvent::RunStarted { timestamp, .. }
            | AnalysisEvent::SegmentSkipped { timestamp, .. }
            | AnalysisEvent::GroupCompleted { timestamp, .. }
            | AnalysisEvent::RunCompleted { timestamp, .. } => *timestamp,
        }
    }
}
