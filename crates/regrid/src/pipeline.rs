//! End-to-end orchestration of the regridding run.
//!
//! Order matters: the direction cube is unwrapped before anything
//! interpolates across its time axis, the window is cut (and padded) before
//! the entity maps are consulted, and planar wind components are regenerated
//! from the ramped speed/direction pair so the serialized components stay
//! self-consistent.

use tracing::info;

use forcing_common::Unit;
use mesh::Mesh;

use crate::angular;
use crate::config::RegridConfig;
use crate::error::{RegridError, Result};
use crate::fields::{FieldKind, Placement};
use crate::interpolate::SpatialInterpolator;
use crate::mapper::{ElementToNodeMap, EntityGridMap};
use crate::ramp::TemporalRamper;
use crate::types::{ForcingSource, Series, SourceField};
use crate::wind;

/// One regridded, ramped output field.
#[derive(Debug, Clone)]
pub struct RampedField {
    pub kind: FieldKind,
    pub unit: Unit,
    pub placement: Placement,
    pub values: Series,
}

/// The complete output of a run, ready for the serialization collaborator.
#[derive(Debug, Clone)]
pub struct ForcingResult {
    /// Dense MJD axis shared by every field.
    pub times: Vec<f64>,
    /// Requested fields, in configuration order.
    pub fields: Vec<RampedField>,
    /// Element wind speed broadcast onto nodes, present when both wind
    /// speed and a node-placed field were requested.
    pub wind_speed_on_nodes: Option<Series>,
    /// Number of 360-degree shifts applied while unwrapping direction.
    pub direction_corrections: usize,
}

impl ForcingResult {
    pub fn field(&self, kind: FieldKind) -> Option<&RampedField> {
        self.fields.iter().find(|f| f.kind == kind)
    }
}

/// Drives a source dataset through the full regrid-and-ramp sequence for
/// one mesh.
pub struct ForcingPipeline<'a> {
    mesh: &'a Mesh,
    config: &'a RegridConfig,
}

impl<'a> ForcingPipeline<'a> {
    pub fn new(mesh: &'a Mesh, config: &'a RegridConfig) -> Self {
        Self { mesh, config }
    }

    /// Run the pipeline. The source must already be in canonical units.
    pub fn run(&self, source: &ForcingSource) -> Result<ForcingResult> {
        self.config.validate()?;
        source.validate_shapes()?;

        let mut source = source.clone();
        let interp_kinds = self.config.fields.clone();

        // Derived wind fields are materialized as source cubes first, then
        // treated like any other field: the component pair rides through
        // interpolation and ramping component-wise, never as blended
        // magnitude/direction.
        let wants_polar = interp_kinds
            .iter()
            .any(|k| matches!(k, FieldKind::WindSpeed | FieldKind::WindDirection));
        let wants_components = interp_kinds
            .iter()
            .any(|k| matches!(k, FieldKind::WindX | FieldKind::WindY));
        if wants_polar || wants_components {
            self.derive_wind_polar(&mut source)?;
        }

        let direction_corrections = if let Some(field) = source.field_mut(FieldKind::WindDirection)
        {
            let changes = angular::unwrap_cube(&mut field.values);
            info!(changes, "direction continuity check done");
            changes
        } else {
            0
        };

        if wants_components {
            self.derive_wind_components(&mut source)?;
        }

        let source = source.select_window(
            self.config.window_start_mjd,
            self.config.window_end_mjd,
            self.config.window_pad_days,
        )?;
        info!(
            instants = source.times.len(),
            start = source.times[0],
            end = source.times[source.times.len() - 1],
            "source window selected"
        );

        // Entity maps, built once per placement actually used.
        let node_coords: Vec<(f64, f64)> = self.mesh.nodes().iter().map(|n| (n.x, n.y)).collect();
        let cell_coords: Vec<(f64, f64)> = self
            .mesh
            .cell_centers()
            .iter()
            .map(|c| (c.x, c.y))
            .collect();
        let needs_elements = interp_kinds
            .iter()
            .any(|k| k.placement() == Placement::Element);
        let needs_nodes = interp_kinds.iter().any(|k| k.placement() == Placement::Node);
        let cell_map = needs_elements.then(|| EntityGridMap::for_cells(self.mesh, &source.grid));
        let node_map = needs_nodes.then(|| EntityGridMap::for_nodes(self.mesh, &source.grid));

        // Spatial interpolation, field by field in a stable order.
        let mut interpolated: Vec<(FieldKind, Series)> = Vec::with_capacity(interp_kinds.len());
        for &kind in &interp_kinds {
            let (map, coords) = match kind.placement() {
                Placement::Element => (cell_map.as_ref(), &cell_coords),
                Placement::Node => (node_map.as_ref(), &node_coords),
            };
            let map = map.ok_or_else(|| {
                RegridError::configuration(format!("no entity map for field {}", kind))
            })?;
            let interpolator = SpatialInterpolator::new(self.config, &source.grid, map, coords)?;
            let series = interpolator.interpolate(&source.require(kind)?.values)?;
            interpolated.push((kind, series));
        }
        info!(
            fields = interpolated.len(),
            method = %self.config.method,
            "spatial interpolation done"
        );

        // Temporal ramping onto the shared dense axis.
        let ramper = TemporalRamper::new(self.config.steps_per_day);
        let times = ramper.dense_axis(&source.times)?;
        let mut ramped: Vec<(FieldKind, Series)> = Vec::with_capacity(interpolated.len());
        for (kind, series) in &interpolated {
            ramped.push((*kind, ramper.ramp_values(series, &source.times)?));
        }
        info!(steps = times.len(), "temporal ramping done");

        if self.config.wrap_direction_output {
            if let Some((_, series)) = ramped
                .iter_mut()
                .find(|(k, _)| *k == FieldKind::WindDirection)
            {
                for e in 0..series.entities() {
                    angular::wrap_into_circle(series.row_mut(e));
                }
            }
        }

        // Element wind speed onto nodes, for node-placed consumers.
        let wind_speed_on_nodes = if self.contains(FieldKind::WindSpeed)
            && self
                .config
                .fields
                .iter()
                .any(|k| k.placement() == Placement::Node)
        {
            let map = ElementToNodeMap::build(self.mesh)?;
            let speed = self.ramped_series(&ramped, FieldKind::WindSpeed)?;
            Some(map.broadcast(&speed))
        } else {
            None
        };

        // Assemble outputs in the requested order.
        let mut fields = Vec::with_capacity(self.config.fields.len());
        for &kind in &self.config.fields {
            fields.push(RampedField {
                kind,
                unit: kind.unit(),
                placement: kind.placement(),
                values: self.ramped_series(&ramped, kind)?,
            });
        }

        Ok(ForcingResult {
            times,
            fields,
            wind_speed_on_nodes,
            direction_corrections,
        })
    }

    fn contains(&self, kind: FieldKind) -> bool {
        self.config.fields.contains(&kind)
    }

    fn ramped_series(&self, ramped: &[(FieldKind, Series)], kind: FieldKind) -> Result<Series> {
        ramped
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, s)| s.clone())
            .ok_or_else(|| RegridError::MissingField(kind.short_name().to_string()))
    }

    /// Derive speed and FROM-direction cubes from the u/v source pair when
    /// they are not already present.
    fn derive_wind_polar(&self, source: &mut ForcingSource) -> Result<()> {
        if source.field(FieldKind::WindSpeed).is_some()
            && source.field(FieldKind::WindDirection).is_some()
        {
            return Ok(());
        }
        let u = source.require(FieldKind::WindU)?;
        let v = source.require(FieldKind::WindV)?;
        let (speed, direction) = wind::speed_direction_cubes(&u.values, &v.values)?;
        source.insert(SourceField {
            kind: FieldKind::WindSpeed,
            unit: Unit::MetresPerSecond,
            values: speed,
        });
        source.insert(SourceField {
            kind: FieldKind::WindDirection,
            unit: Unit::Degrees,
            values: direction,
        });
        info!("derived wind speed and direction from u/v");
        Ok(())
    }

    /// Materialize the planar component cubes from the polar pair.
    fn derive_wind_components(&self, source: &mut ForcingSource) -> Result<()> {
        if source.field(FieldKind::WindX).is_some() && source.field(FieldKind::WindY).is_some() {
            return Ok(());
        }
        let speed = source.require(FieldKind::WindSpeed)?;
        let direction = source.require(FieldKind::WindDirection)?;
        let (x, y) = wind::component_cubes(&speed.values, &direction.values)?;
        source.insert(SourceField {
            kind: FieldKind::WindX,
            unit: Unit::MetresPerSecond,
            values: x,
        });
        source.insert(SourceField {
            kind: FieldKind::WindY,
            unit: Unit::MetresPerSecond,
            values: y,
        });
        info!("derived planar wind components");
        Ok(())
    }
}
