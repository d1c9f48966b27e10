use serde::{Deserialize, Serialize};

use crate::domains::crowding::types::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellClass {
    pub collision: bool,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub cells: Vec<Option<CellClass>>,
    pub collision_count: usize,
    pub collision_indices: Vec<usize>,
    pub range: f64,
}

/// Largest deviation of any present metric from `desired`; 1 when that is zero
/// or no metric is present.
pub fn color_range(metrics: &[Option<f64>], desired: f64) -> f64 {
    let present = metrics.iter().flatten().copied();
    let (min, max) = present.fold(None, |acc: Option<(f64, f64)>, m| match acc {
        None => Some((m, m)),
        Some((lo, hi)) => Some((lo.min(m), hi.max(m))),
    })
    .unwrap_or((desired, desired));

    let range = (min - desired).abs().max((max - desired).abs());
    if range == 0.0 || !range.is_finite() {
        1.0
    } else {
        range
    }
}

/// Crowded cells (`metric <= desired`) shade red in, spacious cells shade blue in;
/// green is always full.
pub fn cell_color(metric: f64, desired: f64, range: f64) -> Rgb {
    let dif = (desired - metric).abs().min(range);
    let shade = (dif / range * 255.0).round_ties_even().clamp(0.0, 255.0) as u8;
    if metric <= desired {
        Rgb::new(shade, 255, 0)
    } else {
        Rgb::new(0, 255, shade)
    }
}

pub fn classify(metrics: &[Option<f64>], desired: f64) -> Classification {
    let range = color_range(metrics, desired);
    let mut collision_indices = Vec::new();

    let cells = metrics
        .iter()
        .enumerate()
        .map(|(i, m)| {
            m.map(|metric| {
                let collision = metric < desired;
                if collision {
                    collision_indices.push(i);
                }
                CellClass {
                    collision,
                    color: cell_color(metric, desired, range),
                }
            })
        })
        .collect();

    Classification {
        cells,
        collision_count: collision_indices.len(),
        collision_indices,
        range,
    }
}
