//! Run configuration for the forcing builder.
//!
//! A YAML document naming the input files and the regridding parameters.
//! Window bounds accept either MJD day counts or `YYYY-MM-DD` dates.

use serde::{Deserialize, Serialize};

use forcing_common::time::date_str_to_mjd;
use projection::TangentPlane;
use regrid::{FieldKind, InterpolationMethod, RegridConfig};

/// A window bound: a raw MJD value or a calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeBound {
    Mjd(f64),
    Date(String),
}

impl TimeBound {
    fn to_mjd(&self) -> anyhow::Result<f64> {
        match self {
            Self::Mjd(v) => Ok(*v),
            Self::Date(s) => Ok(date_str_to_mjd(s)?),
        }
    }
}

/// The YAML run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Mesh file in the ocean model's grid text format.
    pub mesh_file: String,
    /// Source dataset (JSON).
    pub source_file: String,
    /// Output file (JSON).
    pub output_file: String,

    /// Requested window start.
    pub window_start: TimeBound,
    /// Requested window end.
    pub window_end: TimeBound,

    /// Interpolation method name: nearest, inverse-distance or gaussian.
    #[serde(default = "default_method")]
    pub method: String,

    /// Output cadence in steps per day.
    #[serde(default = "default_steps_per_day")]
    pub steps_per_day: f64,

    /// Field short names to produce.
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,

    /// Projection origin latitude (degrees).
    #[serde(default = "default_origin_lat")]
    pub origin_lat: f64,

    /// Projection origin longitude (degrees).
    #[serde(default = "default_origin_lon")]
    pub origin_lon: f64,

    /// Neighborhood half-width for the weighted methods.
    #[serde(default = "default_half_width")]
    pub neighborhood_half_width: usize,

    /// Distance floor for inverse-distance weighting (metres).
    #[serde(default = "default_distance_floor")]
    pub distance_floor_m: f64,

    /// Source grid cell width (degrees), feeds the Gaussian kernel width.
    #[serde(default = "default_cell_width")]
    pub grid_cell_width_deg: f64,

    /// Fold output wind direction back into [0, 360).
    #[serde(default = "default_true")]
    pub wrap_direction: bool,
}

fn default_method() -> String {
    "gaussian".to_string()
}

fn default_steps_per_day() -> f64 {
    24.0
}

fn default_fields() -> Vec<String> {
    vec!["ws".to_string(), "wd".to_string()]
}

fn default_origin_lat() -> f64 {
    62.0
}

fn default_origin_lon() -> f64 {
    -7.0
}

fn default_half_width() -> usize {
    1
}

fn default_distance_floor() -> f64 {
    250.0
}

fn default_cell_width() -> f64 {
    0.2
}

fn default_true() -> bool {
    true
}

impl RunConfig {
    /// Load and parse the YAML run configuration.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// The tangent plane shared by the mesh and the projected source grid.
    pub fn projection_plane(&self) -> TangentPlane {
        TangentPlane::centered(self.origin_lat, self.origin_lon)
    }

    /// Translate into the engine configuration.
    pub fn to_regrid_config(&self) -> anyhow::Result<RegridConfig> {
        let fields = self
            .fields
            .iter()
            .map(|name| FieldKind::parse(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RegridConfig {
            method: InterpolationMethod::parse(&self.method)?,
            neighborhood_half_width: self.neighborhood_half_width,
            distance_floor_m: self.distance_floor_m,
            grid_cell_width_deg: self.grid_cell_width_deg,
            origin_lat: self.origin_lat,
            origin_lon: self.origin_lon,
            steps_per_day: self.steps_per_day,
            window_start_mjd: self.window_start.to_mjd()?,
            window_end_mjd: self.window_end.to_mjd()?,
            wrap_direction_output: self.wrap_direction,
            fields,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
mesh_file: mesh.dat
source_file: source.json
output_file: forcing.json
window_start: 60636.0
window_end: 2024-12-01
method: gaussian
steps_per_day: 24
fields: [ws, wd, wx, wy, mslp]
";

    #[test]
    fn test_parse_sample_config() {
        let run: RunConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let config = run.to_regrid_config().unwrap();
        assert_eq!(config.method, InterpolationMethod::Gaussian);
        assert_eq!(config.window_start_mjd, 60636.0);
        // 2024-12-01 is MJD 60645.
        assert_eq!(config.window_end_mjd, 60645.0);
        assert_eq!(config.fields.len(), 5);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let bad = SAMPLE.replacen("mslp", "salinity", 1);
        let run: RunConfig = serde_yaml::from_str(&bad).unwrap();
        assert!(run.to_regrid_config().is_err());
    }

    #[test]
    fn test_unknown_method_rejected() {
        let bad = SAMPLE.replacen("gaussian", "bicubic", 1);
        let run: RunConfig = serde_yaml::from_str(&bad).unwrap();
        assert!(run.to_regrid_config().is_err());
    }

    #[test]
    fn test_defaults_fill_optional_knobs() {
        let minimal = "\
mesh_file: mesh.dat
source_file: source.json
output_file: forcing.json
window_start: 60636.0
window_end: 60640.0
";
        let run: RunConfig = serde_yaml::from_str(minimal).unwrap();
        let config = run.to_regrid_config().unwrap();
        assert_eq!(config.neighborhood_half_width, 1);
        assert_eq!(config.distance_floor_m, 250.0);
        assert!(config.wrap_direction_output);
        assert_eq!(config.fields, vec![FieldKind::WindSpeed, FieldKind::WindDirection]);
    }
}
