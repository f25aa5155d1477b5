//! Configuration for the regridding engine.
//!
//! Every knob that used to be a module-level constant in older tooling is an
//! explicit field here with a documented default, so two runs with the same
//! config value are guaranteed to agree.

use serde::{Deserialize, Serialize};

use crate::error::{RegridError, Result};
use crate::fields::FieldKind;
use crate::interpolate::InterpolationMethod;

/// Configuration for a regridding run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegridConfig {
    /// Spatial interpolation strategy.
    pub method: InterpolationMethod,

    /// Half-width of the square source-grid neighborhood gathered around the
    /// mapped index (1 = 3x3).
    pub neighborhood_half_width: usize,

    /// Floor on the entity-to-grid-point distance in inverse-distance
    /// weighting (metres). Guards the 1/d^2 weight against an entity landing
    /// exactly on a grid point.
    pub distance_floor_m: f64,

    /// Gaussian kernel width multiplier.
    pub gauss_correction_factor: f64,

    /// Gaussian base length scale (metres); one nautical mile pairs with the
    /// arc-minute factor in the sigma formula.
    pub gauss_base_scale_m: f64,

    /// Source grid cell width in degrees of longitude.
    pub grid_cell_width_deg: f64,

    /// Projection origin latitude (degrees).
    pub origin_lat: f64,

    /// Projection origin longitude (degrees).
    pub origin_lon: f64,

    /// Dense output cadence in steps per day.
    pub steps_per_day: f64,

    /// Requested window start (MJD).
    pub window_start_mjd: f64,

    /// Requested window end (MJD).
    pub window_end_mjd: f64,

    /// Pad beyond the window end for the synthetic held-value sample (days).
    pub window_pad_days: f64,

    /// Fold ramped wind direction back into [0, 360) for output.
    pub wrap_direction_output: bool,

    /// Fields to produce.
    pub fields: Vec<FieldKind>,
}

impl Default for RegridConfig {
    fn default() -> Self {
        Self {
            method: InterpolationMethod::Gaussian,
            neighborhood_half_width: 1,
            distance_floor_m: 250.0,
            gauss_correction_factor: 2.0,
            gauss_base_scale_m: 1852.0,
            grid_cell_width_deg: 0.2,
            origin_lat: 62.0,
            origin_lon: -7.0,
            steps_per_day: 24.0,
            window_start_mjd: 60636.0,
            window_end_mjd: 60640.0,
            window_pad_days: 0.1,
            wrap_direction_output: true,
            fields: vec![FieldKind::WindSpeed, FieldKind::WindDirection],
        }
    }
}

impl RegridConfig {
    /// Load configuration from environment variables on top of the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("REGRID_METHOD") {
            config.method = InterpolationMethod::parse(&val)?;
        }

        if let Ok(val) = std::env::var("REGRID_HALF_WIDTH") {
            if let Ok(width) = val.parse() {
                config.neighborhood_half_width = width;
            }
        }

        if let Ok(val) = std::env::var("REGRID_DISTANCE_FLOOR_M") {
            if let Ok(floor) = val.parse() {
                config.distance_floor_m = floor;
            }
        }

        if let Ok(val) = std::env::var("REGRID_STEPS_PER_DAY") {
            if let Ok(steps) = val.parse() {
                config.steps_per_day = steps;
            }
        }

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(RegridError::configuration("field list is empty"));
        }
        if self.neighborhood_half_width == 0 {
            return Err(RegridError::configuration(
                "neighborhood_half_width must be >= 1",
            ));
        }
        if self.distance_floor_m <= 0.0 {
            return Err(RegridError::configuration("distance_floor_m must be > 0"));
        }
        if self.gauss_correction_factor <= 0.0 || self.gauss_base_scale_m <= 0.0 {
            return Err(RegridError::configuration(
                "Gaussian kernel parameters must be > 0",
            ));
        }
        if self.grid_cell_width_deg <= 0.0 {
            return Err(RegridError::configuration(
                "grid_cell_width_deg must be > 0",
            ));
        }
        if self.steps_per_day <= 0.0 {
            return Err(RegridError::configuration("steps_per_day must be > 0"));
        }
        if self.window_end_mjd <= self.window_start_mjd {
            return Err(RegridError::configuration(format!(
                "window end {} is not after window start {}",
                self.window_end_mjd, self.window_start_mjd
            )));
        }
        if self.window_pad_days <= 0.0 {
            return Err(RegridError::configuration("window_pad_days must be > 0"));
        }
        Ok(())
    }

    /// Width of the Gaussian kernel in metres.
    ///
    /// `sigma = factor * cos(lat0) * (half cell width in arc-minutes) * base`
    /// with the base scale one nautical mile, i.e. one arc-minute of
    /// latitude. The cosine models the shrinking of a degree of longitude at
    /// the working latitude.
    pub fn gaussian_sigma(&self) -> f64 {
        let cos_lat = (self.origin_lat.to_radians()).cos();
        self.gauss_correction_factor
            * cos_lat
            * (0.5 * self.grid_cell_width_deg * 60.0)
            * self.gauss_base_scale_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RegridConfig::default().validate().is_ok());
    }

    #[test]
    fn test_gaussian_sigma_reference_value() {
        let config = RegridConfig::default();
        let sigma = config.gaussian_sigma();
        // 2 * cos(62 deg) * (0.5 * 0.2 * 60) * 1852 ~ 10 430 m.
        let expected = 10_428.0;
        assert!(
            (sigma - expected).abs() / expected < 0.01,
            "sigma {}",
            sigma
        );
    }

    #[test]
    fn test_empty_field_list_rejected() {
        let config = RegridConfig {
            fields: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let config = RegridConfig {
            window_start_mjd: 60640.0,
            window_end_mjd: 60636.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_distance_floor_rejected() {
        let config = RegridConfig {
            distance_floor_m: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
