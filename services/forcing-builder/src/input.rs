//! Source dataset loader.
//!
//! The downloader/extraction collaborator hands over a JSON document with
//! the geographic coordinate arrays, the sparse MJD axis, and one cube per
//! field, time-major: `values[time][row][col]`. Fields are converted to the
//! engine's canonical units here so the numerical core never sees
//! accumulated or offset-based units.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use forcing_common::units::{conversion_factor, KELVIN_OFFSET};
use forcing_common::Unit;
use projection::TangentPlane;
use regrid::{Cube, FieldKind, ForcingSource, Grid2, SourceField, SourceGrid};

#[derive(Debug, Deserialize)]
struct SourceDocument {
    /// Sparse MJD instants.
    times: Vec<f64>,
    /// Latitude per grid point, row-major.
    lat: Vec<Vec<f64>>,
    /// Longitude per grid point, row-major.
    lon: Vec<Vec<f64>>,
    fields: Vec<FieldDocument>,
}

#[derive(Debug, Deserialize)]
struct FieldDocument {
    /// Field short name (u10, v10, mslp, ...).
    name: String,
    /// Unit as delivered by the archive.
    unit: String,
    /// Cube values, `values[time][row][col]`.
    values: Vec<Vec<Vec<f64>>>,
}

/// Load a source dataset and project its grid onto the mesh plane.
pub fn load_source(path: &str, plane: &TangentPlane) -> Result<ForcingSource> {
    let content = std::fs::read_to_string(path)?;
    let doc: SourceDocument = serde_json::from_str(&content)?;

    let lat = nested_to_grid(&doc.lat).context("lat array")?;
    let lon = nested_to_grid(&doc.lon).context("lon array")?;
    let grid = SourceGrid::from_geographic(&lat, &lon, plane)?;

    let mut fields = Vec::with_capacity(doc.fields.len());
    for field in &doc.fields {
        let kind = FieldKind::parse(&field.name)?;
        let unit = Unit::parse(&field.unit)?;
        let mut cube = nested_to_cube(&field.values, lat.rows(), lat.cols())
            .with_context(|| format!("field {}", field.name))?;
        let unit = convert_to_canonical(kind, unit, &mut cube)?;
        fields.push(SourceField {
            kind,
            unit,
            values: cube,
        });
    }

    let source = ForcingSource {
        grid,
        times: doc.times,
        fields,
    };
    source.validate_shapes()?;
    info!(path, fields = source.fields.len(), "source dataset loaded");
    Ok(source)
}

/// Bring a field to the unit the engine expects for its kind.
fn convert_to_canonical(kind: FieldKind, unit: Unit, cube: &mut Cube) -> Result<Unit> {
    let target = kind.unit();
    if unit == target {
        return Ok(unit);
    }
    match (unit, target) {
        (Unit::Kelvin, Unit::Celsius) => {
            cube.map_in_place(|v| v - KELVIN_OFFSET);
        }
        _ => {
            let factor = conversion_factor(unit, target).with_context(|| {
                format!("field {} delivered as {} but needs {}", kind, unit, target)
            })?;
            cube.map_in_place(|v| v * factor);
        }
    }
    info!(field = %kind, from = %unit, to = %target, "converted field unit");
    Ok(target)
}

fn nested_to_grid(rows: &[Vec<f64>]) -> Result<Grid2> {
    if rows.is_empty() || rows[0].is_empty() {
        bail!("empty coordinate array");
    }
    let cols = rows[0].len();
    let mut data = Vec::with_capacity(rows.len() * cols);
    for row in rows {
        if row.len() != cols {
            bail!("ragged coordinate array: {} vs {} columns", row.len(), cols);
        }
        data.extend_from_slice(row);
    }
    Ok(Grid2::new(rows.len(), cols, data)?)
}

fn nested_to_cube(steps: &[Vec<Vec<f64>>], rows: usize, cols: usize) -> Result<Cube> {
    let mut data = Vec::with_capacity(steps.len() * rows * cols);
    for (t, slab) in steps.iter().enumerate() {
        if slab.len() != rows {
            bail!("step {} has {} rows, expected {}", t, slab.len(), rows);
        }
        for row in slab {
            if row.len() != cols {
                bail!("step {} has {} columns, expected {}", t, row.len(), cols);
            }
            data.extend_from_slice(row);
        }
    }
    Ok(Cube::new(rows, cols, steps.len(), data)?)
}
