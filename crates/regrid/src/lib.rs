//! Regridding and temporal-ramping engine for atmospheric forcing.
//!
//! Takes fields sampled on a regular latitude/longitude grid at sparse,
//! irregular instants and produces per-mesh-entity series at a dense,
//! uniform cadence for an unstructured coastal-ocean model.
//!
//! # Architecture
//!
//! ```text
//! ForcingSource (grid coords + field cubes + sparse MJD axis)
//!      │
//!      ├─► derive wind speed/direction from u/v
//!      ├─► unwrap direction across 0/360 (AngularContinuityCorrector)
//!      ├─► cut the requested window, pad the end (held value)
//!      │
//!      ▼
//! EntityGridMap (nearest grid point per node / cell center)
//!      │
//!      ▼
//! SpatialInterpolator (nearest / inverse-distance / Gaussian)
//!      │
//!      ▼
//! TemporalRamper (linear segments joined without duplicate instants)
//!      │
//!      ├─► wrap direction back into [0, 360)
//!      ├─► regenerate planar wind components from speed/direction
//!      └─► broadcast element wind speed onto nodes
//!      │
//!      ▼
//! ForcingResult (dense axis + entity-by-step series per field)
//! ```
//!
//! The entity maps are the expensive part (brute-force nearest neighbor,
//! O(entities x grid cells)); they are built once per mesh/grid pair and
//! reused across all fields and time steps.

pub mod angular;
pub mod config;
pub mod error;
pub mod fields;
pub mod interpolate;
pub mod mapper;
pub mod pipeline;
pub mod ramp;
pub mod types;
pub mod wind;

// Re-export commonly used types at crate root
pub use config::RegridConfig;
pub use error::{RegridError, Result};
pub use fields::{FieldKind, Placement};
pub use interpolate::{InterpolationMethod, SpatialInterpolator};
pub use mapper::{ElementToNodeMap, EntityGridMap, GridIndex};
pub use pipeline::{ForcingPipeline, ForcingResult, RampedField};
pub use ramp::{RampedSeries, TemporalRamper};
pub use types::{Cube, ForcingSource, Grid2, Series, SourceField, SourceGrid};
