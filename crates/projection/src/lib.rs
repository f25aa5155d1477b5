//! Coordinate projection for the coastal-forcing pipeline.
//!
//! The consuming ocean model works in a local planar coordinate system in
//! metres, while atmospheric source grids are sampled on geographic
//! latitude/longitude. This crate provides the tangent-plane approximation
//! used to move between the two.

pub mod tangent;

pub use tangent::TangentPlane;
