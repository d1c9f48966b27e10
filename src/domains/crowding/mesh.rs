use serde::{Deserialize, Serialize};

use crate::domains::crowding::classifier::Classification;
use crate::domains::crowding::grid::{GridCell, ProjectedGrid};
use crate::domains::crowding::types::{Point3, Rgb};

/// Quad mesh with per-vertex colours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorMesh {
    pub vertices: Vec<Point3>,
    pub colors: Vec<Rgb>,
    pub faces: Vec<[usize; 4]>,
}

impl ColorMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Appends the cell's square footprint in a single colour.
    pub fn push_cell(&mut self, cell: &GridCell, color: Rgb) {
        let base = self.vertices.len();
        let h = cell.half_width;
        let c = cell.position;
        self.vertices.extend([
            Point3::new(c.x - h, c.y - h, c.z),
            Point3::new(c.x + h, c.y - h, c.z),
            Point3::new(c.x + h, c.y + h, c.z),
            Point3::new(c.x - h, c.y + h, c.z),
        ]);
        self.colors.extend([color; 4]);
        self.faces.push([base, base + 1, base + 2, base + 3]);
    }
}

/// Full coloured grid plus the subset of colliding cells.
pub fn build_meshes(grid: &ProjectedGrid, classification: &Classification) -> (ColorMesh, ColorMesh) {
    let mut colored = ColorMesh::new();
    let mut problem = ColorMesh::new();

    for (cell, class) in grid.cells.iter().zip(&classification.cells) {
        if let (Some(cell), Some(class)) = (cell, class) {
            colored.push_cell(cell, class.color);
            if class.collision {
                problem.push_cell(cell, class.color);
            }
        }
    }

    (colored, problem)
}
