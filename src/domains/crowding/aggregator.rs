use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::{DomainError, DomainResult};
use crate::domains::crowding::types::CrowdingSample;

/// Position of one pass in a group. Orders segment-major, iteration-minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PassKey {
    pub segment: usize,
    pub iteration: usize,
}

impl PassKey {
    pub fn new(segment: usize, iteration: usize) -> Self {
        Self { segment, iteration }
    }
}

/// Running pairwise blend of per-cell values: the first value seeds a cell,
/// each later value `v` updates it as `a = (a + v) / 2`.
///
/// The blend is not associative, so passes must arrive in [`PassKey`] order.
#[derive(Debug, Clone)]
pub struct IterationAggregator {
    running: Vec<Option<f64>>,
    passes: usize,
}

impl IterationAggregator {
    pub fn new(cell_count: usize) -> Self {
        Self {
            running: vec![None; cell_count],
            passes: 0,
        }
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn push(&mut self, pass: &[Option<CrowdingSample>]) -> DomainResult<()> {
        if pass.len() != self.running.len() {
            return Err(DomainError::PassLengthMismatch {
                expected: self.running.len(),
                actual: pass.len(),
            });
        }
        for (slot, sample) in self.running.iter_mut().zip(pass) {
            if let Some(sample) = sample {
                let v = sample.value();
                *slot = Some(match *slot {
                    None => v,
                    Some(a) => (a + v) / 2.0,
                });
            }
        }
        self.passes += 1;
        Ok(())
    }

    pub fn finish(self) -> Vec<Option<f64>> {
        self.running
    }
}

/// Blends every pass of a group in canonical order.
pub fn aggregate_passes(
    cell_count: usize,
    passes: &BTreeMap<PassKey, Vec<Option<CrowdingSample>>>,
) -> DomainResult<Vec<Option<f64>>> {
    let mut aggregator = IterationAggregator::new(cell_count);
    for pass in passes.values() {
        aggregator.push(pass)?;
    }
    Ok(aggregator.finish())
}
