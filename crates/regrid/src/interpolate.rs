//! Spatial interpolation from the source grid onto mesh entities.
//!
//! Three interchangeable strategies over the same neighborhood gather:
//! nearest point, inverse-distance weighting, and a Gaussian kernel. The
//! neighborhood and weights depend only on geometry, so they are computed
//! once per entity and applied across every time step and every field,
//! keeping paired vector fields aligned sample for sample.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RegridConfig;
use crate::error::{RegridError, Result};
use crate::fields::FieldKind;
use crate::mapper::EntityGridMap;
use crate::types::{Cube, ForcingSource, Series, SourceGrid};

/// Spatial interpolation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterpolationMethod {
    /// Value of the mapped grid point.
    Nearest,
    /// 1/d^2 weighting over the neighborhood, with a distance floor.
    InverseDistance,
    /// exp(-d^2/sigma^2) weighting over the neighborhood.
    #[default]
    Gaussian,
}

impl InterpolationMethod {
    /// Parse a method name from configuration. Unknown names are fatal.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "nearest" | "simple" => Ok(Self::Nearest),
            "inverse-distance" | "idw" => Ok(Self::InverseDistance),
            "gaussian" | "gauss" => Ok(Self::Gaussian),
            other => Err(RegridError::configuration(format!(
                "unknown interpolation method: {}",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::InverseDistance => "inverse-distance",
            Self::Gaussian => "gaussian",
        }
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-entity interpolation weights over a clipped square neighborhood.
struct EntityWeights {
    row_start: usize,
    col_start: usize,
    rows: usize,
    cols: usize,
    /// Normalized weights, row-major over the neighborhood.
    weights: Vec<f64>,
}

/// Interpolates source fields onto a fixed set of mesh entities.
///
/// Holds the entity-to-grid map and the entity coordinates; one instance is
/// reused for every field sharing the same placement.
pub struct SpatialInterpolator<'a> {
    config: &'a RegridConfig,
    grid: &'a SourceGrid,
    map: &'a EntityGridMap,
    coords: &'a [(f64, f64)],
}

impl<'a> SpatialInterpolator<'a> {
    pub fn new(
        config: &'a RegridConfig,
        grid: &'a SourceGrid,
        map: &'a EntityGridMap,
        coords: &'a [(f64, f64)],
    ) -> Result<Self> {
        if map.len() != coords.len() {
            return Err(RegridError::data_shape(format!(
                "entity map has {} entries but {} coordinates were given",
                map.len(),
                coords.len()
            )));
        }
        Ok(Self {
            config,
            grid,
            map,
            coords,
        })
    }

    /// Interpolate one field cube to a (entities x time) series.
    pub fn interpolate(&self, cube: &Cube) -> Result<Series> {
        if cube.rows() != self.grid.rows() || cube.cols() != self.grid.cols() {
            return Err(RegridError::data_shape(format!(
                "cube is {}x{} but grid is {}x{}",
                cube.rows(),
                cube.cols(),
                self.grid.rows(),
                self.grid.cols()
            )));
        }
        match self.config.method {
            InterpolationMethod::Nearest => Ok(self.nearest(cube)),
            InterpolationMethod::InverseDistance | InterpolationMethod::Gaussian => {
                Ok(self.weighted(cube))
            }
        }
    }

    /// Interpolate a list of fields, preserving order and alignment.
    pub fn interpolate_fields(
        &self,
        source: &ForcingSource,
        kinds: &[FieldKind],
    ) -> Result<Vec<(FieldKind, Series)>> {
        let mut out = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let field = source.require(kind)?;
            out.push((kind, self.interpolate(&field.values)?));
        }
        Ok(out)
    }

    fn nearest(&self, cube: &Cube) -> Series {
        let steps = cube.steps();
        let mut out = Series::zeros(self.map.len(), steps);
        for entity in 0..self.map.len() {
            let index = self.map.get(entity);
            for t in 0..steps {
                out.set(entity, t, cube.get(index.row, index.col, t));
            }
        }
        out
    }

    fn weighted(&self, cube: &Cube) -> Series {
        let steps = cube.steps();
        let mut out = Series::zeros(self.map.len(), steps);
        let mut floor_hits = 0usize;
        for entity in 0..self.map.len() {
            let weights = self.entity_weights(entity, &mut floor_hits);
            for t in 0..steps {
                let mut acc = 0.0;
                let mut w_iter = weights.weights.iter();
                for r in weights.row_start..weights.row_start + weights.rows {
                    for c in weights.col_start..weights.col_start + weights.cols {
                        // weights is exactly rows*cols long
                        let w = w_iter.next().copied().unwrap_or(0.0);
                        acc += w * cube.get(r, c, t);
                    }
                }
                out.set(entity, t, acc);
            }
        }
        if floor_hits > 0 {
            debug!(floor_hits, "distance floor applied");
        }
        out
    }

    /// Gather the clipped neighborhood around the mapped grid index and
    /// compute normalized weights for this entity.
    fn entity_weights(&self, entity: usize, floor_hits: &mut usize) -> EntityWeights {
        let index = self.map.get(entity);
        let (x0, y0) = self.coords[entity];
        let half = self.config.neighborhood_half_width;

        let row_start = index.row.saturating_sub(half);
        let row_end = (index.row + half).min(self.grid.rows() - 1);
        let col_start = index.col.saturating_sub(half);
        let col_end = (index.col + half).min(self.grid.cols() - 1);

        let sigma2 = {
            let sigma = self.config.gaussian_sigma();
            sigma * sigma
        };

        let mut weights = Vec::with_capacity((row_end - row_start + 1) * (col_end - col_start + 1));
        for r in row_start..=row_end {
            for c in col_start..=col_end {
                let dx = self.grid.x.get(r, c) - x0;
                let dy = self.grid.y.get(r, c) - y0;
                let d2 = dx * dx + dy * dy;
                let w = match self.config.method {
                    InterpolationMethod::InverseDistance => {
                        let mut d = d2.sqrt();
                        if d < self.config.distance_floor_m {
                            d = self.config.distance_floor_m;
                            *floor_hits += 1;
                        }
                        1.0 / (d * d)
                    }
                    InterpolationMethod::Gaussian => (-d2 / sigma2).exp(),
                    InterpolationMethod::Nearest => unreachable!("nearest has no weights"),
                };
                weights.push(w);
            }
        }
        let total: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= total;
        }

        EntityWeights {
            row_start,
            col_start,
            rows: row_end - row_start + 1,
            cols: col_end - col_start + 1,
            weights,
        }
    }
}
