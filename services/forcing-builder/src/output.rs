//! Result writer.
//!
//! Serializes the ramped series for the templating collaborator that
//! renders the ocean model's input files. Values are laid out time-major
//! (`values[time][entity]`), which is the order the downstream generator
//! consumes.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use forcing_common::Mjd;
use regrid::{ForcingResult, Placement, Series};

#[derive(Debug, Serialize)]
struct OutputDocument<'a> {
    /// Dense MJD axis.
    times: &'a [f64],
    /// The same instants as ISO datetimes, for human inspection.
    iso_times: Vec<String>,
    fields: Vec<OutputField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wind_speed_on_nodes: Option<OutputField>,
    direction_corrections: usize,
}

#[derive(Debug, Serialize)]
struct OutputField {
    name: String,
    unit: String,
    placement: String,
    entities: usize,
    /// Time-major values: one row per dense instant.
    values: Vec<Vec<f64>>,
}

fn placement_name(placement: Placement) -> &'static str {
    match placement {
        Placement::Element => "element",
        Placement::Node => "node",
    }
}

/// Transpose an entity-major series into time-major rows.
fn time_major(series: &Series) -> Vec<Vec<f64>> {
    (0..series.steps())
        .map(|t| (0..series.entities()).map(|e| series.get(e, t)).collect())
        .collect()
}

/// Write the run result as JSON.
pub fn write_result(path: &str, result: &ForcingResult) -> Result<()> {
    let iso_times = result
        .times
        .iter()
        .map(|&t| Mjd(t).to_datetime().format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .collect();

    let fields = result
        .fields
        .iter()
        .map(|field| OutputField {
            name: field.kind.short_name().to_string(),
            unit: field.unit.as_str().to_string(),
            placement: placement_name(field.placement).to_string(),
            entities: field.values.entities(),
            values: time_major(&field.values),
        })
        .collect();

    let wind_speed_on_nodes = result.wind_speed_on_nodes.as_ref().map(|series| OutputField {
        name: "ws_on_nodes".to_string(),
        unit: "m/s".to_string(),
        placement: "node".to_string(),
        entities: series.entities(),
        values: time_major(series),
    });

    let document = OutputDocument {
        times: &result.times,
        iso_times,
        fields,
        wind_speed_on_nodes,
        direction_corrections: result.direction_corrections,
    };

    let json = serde_json::to_string_pretty(&document)?;
    std::fs::write(path, json)?;
    info!(path, fields = document.fields.len(), "result written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regrid::Series;

    #[test]
    fn test_time_major_transpose() {
        let mut series = Series::zeros(2, 3);
        series.row_mut(0).copy_from_slice(&[1.0, 2.0, 3.0]);
        series.row_mut(1).copy_from_slice(&[4.0, 5.0, 6.0]);
        let rows = time_major(&series);
        assert_eq!(rows, vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
    }
}
