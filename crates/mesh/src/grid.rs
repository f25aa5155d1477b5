//! Mesh model and loader for the ocean-model grid text format.
//!
//! The persisted format is line-oriented:
//!
//! ```text
//! Node Number = 4
//! Cell Number = 2
//! 1 1 2 3
//! 2 2 4 3
//! 1 0.0 0.0 0.0
//! 2 1000.0 0.0 0.0
//! ...
//! ```
//!
//! The two header lines may appear in either order. Cell records come first
//! (`index n1 n2 n3`, node ids 1-based), then node records
//! (`index x y z`). The z column is a bathymetry placeholder and is not kept.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MeshError, Result};

/// A mesh vertex in local planar coordinates (metres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub x: f64,
    pub y: f64,
}

/// An unstructured triangular mesh.
///
/// Connectivity is stored 0-based. Cell centers are the centroid of the
/// three corner nodes and are computed once at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    nodes: Vec<MeshNode>,
    cells: Vec<[usize; 3]>,
    cell_centers: Vec<MeshNode>,
}

impl Mesh {
    /// Build a mesh from a node table and 1-based cell connectivity, as read
    /// from the persisted format.
    pub fn from_tables(nodes: Vec<MeshNode>, cells_one_based: Vec<[i64; 3]>) -> Result<Self> {
        let node_count = nodes.len();
        let mut cells = Vec::with_capacity(cells_one_based.len());
        for (ci, raw) in cells_one_based.iter().enumerate() {
            let mut cell = [0usize; 3];
            for (k, &n) in raw.iter().enumerate() {
                if n < 1 || n as usize > node_count {
                    return Err(MeshError::NodeIndexOutOfRange {
                        cell: ci + 1,
                        node: n,
                        count: node_count,
                    });
                }
                cell[k] = (n - 1) as usize;
            }
            cells.push(cell);
        }

        let cell_centers = cells
            .iter()
            .map(|c| MeshNode {
                x: (nodes[c[0]].x + nodes[c[1]].x + nodes[c[2]].x) / 3.0,
                y: (nodes[c[0]].y + nodes[c[1]].y + nodes[c[2]].y) / 3.0,
            })
            .collect();

        Ok(Self {
            nodes,
            cells,
            cell_centers,
        })
    }

    /// Load a mesh from the persisted text format.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mesh = Self::parse(&content)?;
        info!(
            path = %path.as_ref().display(),
            nodes = mesh.node_count(),
            cells = mesh.cell_count(),
            "loaded mesh"
        );
        Ok(mesh)
    }

    /// Parse the persisted text format from an in-memory string.
    pub fn parse(content: &str) -> Result<Self> {
        let lines: Vec<&str> = content.lines().collect();
        if lines.len() < 2 {
            return Err(MeshError::InvalidHeader(
                "expected two header lines".to_string(),
            ));
        }

        let mut node_count = None;
        let mut cell_count = None;
        for line in &lines[..2] {
            let value = header_value(line)?;
            if line.contains("Node Number") {
                node_count = Some(value);
            } else {
                cell_count = Some(value);
            }
        }
        let node_count = node_count
            .ok_or_else(|| MeshError::InvalidHeader("missing node count".to_string()))?;
        let cell_count = cell_count
            .ok_or_else(|| MeshError::InvalidHeader("missing cell count".to_string()))?;

        // Cell records follow the header, node records follow the cells.
        let cell_lines = &lines[2..];
        if cell_lines.len() < cell_count {
            return Err(MeshError::Truncated {
                kind: "cell",
                expected: cell_count,
                found: cell_lines.len(),
            });
        }
        let mut cells = Vec::with_capacity(cell_count);
        for (i, line) in cell_lines[..cell_count].iter().enumerate() {
            let fields = split_fields(line, 4, 2 + i + 1)?;
            let parse = |s: &str| -> Result<i64> {
                s.parse().map_err(|_| MeshError::InvalidRecord {
                    line: 2 + i + 1,
                    message: format!("bad node index '{}'", s),
                })
            };
            cells.push([parse(fields[1])?, parse(fields[2])?, parse(fields[3])?]);
        }

        let node_lines = &lines[2 + cell_count..];
        if node_lines.len() < node_count {
            return Err(MeshError::Truncated {
                kind: "node",
                expected: node_count,
                found: node_lines.len(),
            });
        }
        let mut nodes = Vec::with_capacity(node_count);
        for (i, line) in node_lines[..node_count].iter().enumerate() {
            let lineno = 2 + cell_count + i + 1;
            let fields = split_fields(line, 4, lineno)?;
            let parse = |s: &str| -> Result<f64> {
                s.parse().map_err(|_| MeshError::InvalidRecord {
                    line: lineno,
                    message: format!("bad coordinate '{}'", s),
                })
            };
            nodes.push(MeshNode {
                x: parse(fields[1])?,
                y: parse(fields[2])?,
            });
        }

        Self::from_tables(nodes, cells)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn nodes(&self) -> &[MeshNode] {
        &self.nodes
    }

    /// Cell connectivity, 0-based.
    pub fn cells(&self) -> &[[usize; 3]] {
        &self.cells
    }

    /// Centroids of the triangles, same order as [`cells`](Self::cells).
    pub fn cell_centers(&self) -> &[MeshNode] {
        &self.cell_centers
    }

    pub fn node(&self, index: usize) -> MeshNode {
        self.nodes[index]
    }

    pub fn cell_center(&self, index: usize) -> MeshNode {
        self.cell_centers[index]
    }
}

fn header_value(line: &str) -> Result<usize> {
    let (_, value) = line
        .split_once('=')
        .ok_or_else(|| MeshError::InvalidHeader(line.to_string()))?;
    value
        .trim()
        .parse()
        .map_err(|_| MeshError::InvalidHeader(line.to_string()))
}

fn split_fields(line: &str, expected: usize, lineno: usize) -> Result<Vec<&str>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < expected {
        return Err(MeshError::InvalidRecord {
            line: lineno,
            message: format!("expected {} fields, found {}", expected, fields.len()),
        });
    }
    Ok(fields)
}
