//! Unstructured triangular mesh for the coastal-forcing pipeline.
//!
//! The target of the regridding engine is an unstructured ocean-model mesh:
//! a table of nodes in local planar coordinates and a table of triangles
//! referencing them. Persisted connectivity is 1-based; everything in this
//! crate is 0-based after loading.

pub mod error;
pub mod grid;

pub use error::{MeshError, Result};
pub use grid::{Mesh, MeshNode};
