// Spatial hash grid for hit-testing laid-out nodes.
//
// Instead of scanning every node on each pointer event, the layout space is
// divided into cells and each node rectangle is registered in the cells it
// covers.

use super::{PointI, RectI};
use crate::family::PersonId;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct SpatialGrid {
    /// Size of each cell in the grid.
    cell_size: i32,
    /// Map from cell coordinates to the nodes overlapping that cell.
    cells: HashMap<(i32, i32), Vec<(PersonId, RectI)>>,
}

impl SpatialGrid {
    /// Cell size should be roughly the size of the largest expected node.
    pub fn new(cell_size: i32) -> Self {
        Self {
            cell_size: cell_size.max(1), // Avoid division by zero
            cells: HashMap::new(),
        }
    }

    fn cell_of(&self, p: PointI) -> (i32, i32) {
        (p.x.div_euclid(self.cell_size), p.y.div_euclid(self.cell_size))
    }

    /// Compute which cells a rectangle overlaps.
    fn cell_range(&self, rect: &RectI) -> Vec<(i32, i32)> {
        let min_x = rect.x.div_euclid(self.cell_size);
        let max_x = (rect.right() - 1).div_euclid(self.cell_size);
        let min_y = rect.y.div_euclid(self.cell_size);
        let max_y = (rect.bottom() - 1).div_euclid(self.cell_size);

        let mut cells = Vec::new();
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                cells.push((cx, cy));
            }
        }
        cells
    }

    pub fn insert(&mut self, id: PersonId, rect: RectI) {
        if rect.w <= 0 || rect.h <= 0 {
            return;
        }
        for cell in self.cell_range(&rect) {
            self.cells.entry(cell).or_default().push((id, rect));
        }
    }

    /// Node containing `p`. Later insertions win where nodes overlap.
    pub fn hit(&self, p: PointI) -> Option<PersonId> {
        self.cells
            .get(&self.cell_of(p))?
            .iter()
            .rev()
            .find(|(_, r)| r.contains(p))
            .map(|(id, _)| *id)
    }
}
