//! Mapping mesh entities onto their nearest source-grid point.
//!
//! The search is a brute-force scan over every grid point per entity,
//! O(entities x grid cells). It is run once per (mesh, grid) pair and the
//! result is reused for every field and time step, so the cost is paid once.
//! Entities outside the grid envelope saturate to the nearest boundary
//! point; that is accepted behavior, not an error.
//!
//! Tie-break: when two grid points are equidistant the lowest row-major
//! index wins (the first minimum found in a row-major scan).

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use mesh::Mesh;

use crate::error::{RegridError, Result};
use crate::types::{Series, SourceGrid};

/// A (row, col) index into the source grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridIndex {
    pub row: usize,
    pub col: usize,
}

/// Per-entity nearest source-grid indices.
///
/// Built once per (mesh, grid) pair and immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityGridMap {
    entries: Vec<GridIndex>,
}

impl EntityGridMap {
    /// Map arbitrary planar coordinates onto the grid.
    ///
    /// Each entity's scan is independent, so the build fans out per entity;
    /// the ordered collect keeps the result deterministic.
    pub fn build(coords: &[(f64, f64)], grid: &SourceGrid) -> Self {
        let entries = coords
            .par_iter()
            .map(|&(x0, y0)| nearest_grid_index(grid, x0, y0))
            .collect();
        Self { entries }
    }

    /// Map every mesh node onto the grid.
    pub fn for_nodes(mesh: &Mesh, grid: &SourceGrid) -> Self {
        let coords: Vec<(f64, f64)> = mesh.nodes().iter().map(|n| (n.x, n.y)).collect();
        let map = Self::build(&coords, grid);
        info!(nodes = coords.len(), "built node-to-grid map");
        map
    }

    /// Map every cell center onto the grid.
    pub fn for_cells(mesh: &Mesh, grid: &SourceGrid) -> Self {
        let coords: Vec<(f64, f64)> = mesh.cell_centers().iter().map(|c| (c.x, c.y)).collect();
        let map = Self::build(&coords, grid);
        info!(cells = coords.len(), "built cell-to-grid map");
        map
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, entity: usize) -> GridIndex {
        self.entries[entity]
    }

    pub fn entries(&self) -> &[GridIndex] {
        &self.entries
    }
}

/// Row-major scan for the minimum squared distance; strict `<` keeps the
/// first minimum, which is the documented tie-break.
fn nearest_grid_index(grid: &SourceGrid, x0: f64, y0: f64) -> GridIndex {
    let mut best = GridIndex { row: 0, col: 0 };
    let mut best_d2 = f64::INFINITY;
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let dx = grid.x.get(row, col) - x0;
            let dy = grid.y.get(row, col) - y0;
            let d2 = dx * dx + dy * dy;
            if d2 < best_d2 {
                best_d2 = d2;
                best = GridIndex { row, col };
            }
        }
    }
    best
}

/// For each node, the lowest-indexed cell that touches it.
///
/// Used to broadcast element-placed series onto nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementToNodeMap {
    owner: Vec<usize>,
}

impl ElementToNodeMap {
    pub fn build(mesh: &Mesh) -> Result<Self> {
        let mut owner = vec![usize::MAX; mesh.node_count()];
        for (cell_index, cell) in mesh.cells().iter().enumerate() {
            for &node in cell {
                if cell_index < owner[node] {
                    owner[node] = cell_index;
                }
            }
        }
        if let Some(orphan) = owner.iter().position(|&o| o == usize::MAX) {
            return Err(RegridError::data_shape(format!(
                "node {} is not referenced by any cell",
                orphan
            )));
        }
        info!(nodes = owner.len(), "built element-to-node map");
        Ok(Self { owner })
    }

    /// The owning cell of a node.
    pub fn owner(&self, node: usize) -> usize {
        self.owner[node]
    }

    pub fn len(&self) -> usize {
        self.owner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owner.is_empty()
    }

    /// Copy an element-placed series onto nodes via the owning cell.
    pub fn broadcast(&self, element_series: &Series) -> Series {
        let steps = element_series.steps();
        let mut out = Series::zeros(self.owner.len(), steps);
        for (node, &cell) in self.owner.iter().enumerate() {
            out.row_mut(node).copy_from_slice(element_series.row(cell));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Grid2;
    use mesh::MeshNode;

    /// 3x4 grid with 1 km spacing.
    fn test_grid() -> SourceGrid {
        SourceGrid::new(
            Grid2::from_fn(3, 4, |_, c| c as f64 * 1000.0),
            Grid2::from_fn(3, 4, |r, _| r as f64 * 1000.0),
        )
        .unwrap()
    }

    fn test_mesh() -> Mesh {
        let nodes = vec![
            MeshNode { x: 0.0, y: 0.0 },
            MeshNode { x: 3000.0, y: 0.0 },
            MeshNode { x: 0.0, y: 2000.0 },
            MeshNode { x: 3000.0, y: 2000.0 },
        ];
        Mesh::from_tables(nodes, vec![[1, 2, 3], [2, 4, 3]]).unwrap()
    }

    #[test]
    fn test_nearest_matches_brute_force_oracle() {
        let grid = test_grid();
        let probes = [
            (0.0, 0.0),
            (1499.0, 0.0),
            (2600.0, 1700.0),
            (-500.0, -500.0),
            (10_000.0, 10_000.0),
        ];
        for &(x0, y0) in &probes {
            let got = nearest_grid_index(&grid, x0, y0);
            // Oracle: exhaustive minimum.
            let mut best = (0, 0);
            let mut best_d2 = f64::INFINITY;
            for r in 0..grid.rows() {
                for c in 0..grid.cols() {
                    let dx = grid.x.get(r, c) - x0;
                    let dy = grid.y.get(r, c) - y0;
                    let d2 = dx * dx + dy * dy;
                    if d2 < best_d2 {
                        best_d2 = d2;
                        best = (r, c);
                    }
                }
            }
            assert_eq!((got.row, got.col), best, "probe ({}, {})", x0, y0);
        }
    }

    #[test]
    fn test_equidistant_tie_breaks_to_lowest_row_major() {
        let grid = test_grid();
        // Exactly between (0,0) and (0,1).
        let got = nearest_grid_index(&grid, 500.0, 0.0);
        assert_eq!((got.row, got.col), (0, 0));
    }

    #[test]
    fn test_out_of_envelope_saturates_to_boundary() {
        let grid = test_grid();
        let got = nearest_grid_index(&grid, 1.0e6, 1.0e6);
        assert_eq!((got.row, got.col), (2, 3));
    }

    #[test]
    fn test_node_and_cell_maps() {
        let grid = test_grid();
        let mesh = test_mesh();
        let nodes = EntityGridMap::for_nodes(&mesh, &grid);
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes.get(0), GridIndex { row: 0, col: 0 });
        assert_eq!(nodes.get(3), GridIndex { row: 2, col: 3 });

        let cells = EntityGridMap::for_cells(&mesh, &grid);
        assert_eq!(cells.len(), 2);
        // First centroid is (1000, 666.7) -> nearest (1, 1).
        assert_eq!(cells.get(0), GridIndex { row: 1, col: 1 });
    }

    #[test]
    fn test_element_to_node_map_picks_lowest_cell() {
        let mesh = test_mesh();
        let map = ElementToNodeMap::build(&mesh).unwrap();
        // Nodes 0 and 2 only touch cell 0; nodes 1 and 2 touch both.
        assert_eq!(map.owner(0), 0);
        assert_eq!(map.owner(1), 0);
        assert_eq!(map.owner(2), 0);
        assert_eq!(map.owner(3), 1);
    }

    #[test]
    fn test_orphan_node_is_rejected() {
        let nodes = vec![
            MeshNode { x: 0.0, y: 0.0 },
            MeshNode { x: 1.0, y: 0.0 },
            MeshNode { x: 0.0, y: 1.0 },
            MeshNode { x: 5.0, y: 5.0 },
        ];
        let mesh = Mesh::from_tables(nodes, vec![[1, 2, 3]]).unwrap();
        assert!(ElementToNodeMap::build(&mesh).is_err());
    }

    #[test]
    fn test_broadcast_copies_owner_rows() {
        let mesh = test_mesh();
        let map = ElementToNodeMap::build(&mesh).unwrap();
        let mut elements = Series::zeros(2, 2);
        elements.row_mut(0).copy_from_slice(&[1.0, 2.0]);
        elements.row_mut(1).copy_from_slice(&[3.0, 4.0]);
        let nodes = map.broadcast(&elements);
        assert_eq!(nodes.row(0), &[1.0, 2.0]);
        assert_eq!(nodes.row(3), &[3.0, 4.0]);
    }
}
