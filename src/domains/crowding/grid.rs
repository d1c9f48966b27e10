use serde::{Deserialize, Serialize};

use crate::domains::crowding::ports::SurfaceDomain;
use crate::domains::crowding::types::{BoundingBox, Point3};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
    /// Lattice point after vertical projection onto the surface.
    pub position: Point3,
    pub half_width: f64,
}

/// Row-major lattice over a surface footprint. Cells whose vertical projection
/// missed the surface are kept as `None` so indices stay aligned with per-cell metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedGrid {
    pub rows: usize,
    pub columns: usize,
    pub pitch: f64,
    pub cells: Vec<Option<GridCell>>,
}

impl ProjectedGrid {
    pub fn empty(pitch: f64) -> Self {
        Self {
            rows: 0,
            columns: 0,
            pitch,
            cells: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn index_of(&self, row: usize, column: usize) -> usize {
        row * self.columns + column
    }

    pub fn projected_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Largest lattice a single group grid may hold.
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// Lattice dimensions `(rows, columns)` for a box and pitch.
pub fn lattice_size(bbox: &BoundingBox, pitch: f64) -> (usize, usize) {
    if !(pitch.is_finite() && pitch > 0.0) || bbox.is_degenerate() {
        return (0, 0);
    }
    let columns = (bbox.width() / pitch).ceil() as usize;
    let rows = (bbox.height() / pitch).ceil() as usize;
    (rows, columns)
}

/// Cell count of the lattice, or `None` when it overflows or exceeds [`MAX_GRID_CELLS`].
pub fn lattice_cell_count(bbox: &BoundingBox, pitch: f64) -> Option<usize> {
    let (rows, columns) = lattice_size(bbox, pitch);
    rows.checked_mul(columns).filter(|&n| n <= MAX_GRID_CELLS)
}

/// Unprojected lattice points, rows (y ascending) outer, columns (x ascending) inner.
/// Empty when the lattice is over the cell cap.
pub fn lattice_points(bbox: &BoundingBox, pitch: f64) -> Vec<Point3> {
    if lattice_cell_count(bbox, pitch).is_none() {
        return Vec::new();
    }
    let (rows, columns) = lattice_size(bbox, pitch);
    let mut points = Vec::with_capacity(rows * columns);
    for row in 0..rows {
        for column in 0..columns {
            points.push(bbox.min.offset(column as f64 * pitch, row as f64 * pitch, 0.0));
        }
    }
    points
}

pub fn project_grid(surface: &dyn SurfaceDomain, pitch: f64) -> ProjectedGrid {
    let bbox = match surface.bounding_box() {
        Some(b) => b,
        None => return ProjectedGrid::empty(pitch),
    };
    if lattice_cell_count(&bbox, pitch).is_none() {
        return ProjectedGrid::empty(pitch);
    }
    let (rows, columns) = lattice_size(&bbox, pitch);
    let half_width = pitch / 2.0;

    let cells = lattice_points(&bbox, pitch)
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            surface.project_vertical(&p).map(|position| GridCell {
                row: i / columns,
                column: i % columns,
                position,
                half_width,
            })
        })
        .collect();

    ProjectedGrid {
        rows,
        columns,
        pitch,
        cells,
    }
}
