//! The closed set of forcing fields the engine knows how to process.
//!
//! Field identity is an enum rather than a string so that dispatch over the
//! field set is checked at compile time. The short names match the source
//! archive's conventions and are what configuration files and output
//! variables use.

use forcing_common::Unit;
use serde::{Deserialize, Serialize};

use crate::error::{RegridError, Result};

/// Where a field lands on the target mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Cell-centered (wind-family fields driving surface stress).
    Element,
    /// Node-centered (scalar heating/precipitation fields).
    Node,
}

/// A forcing field the engine can regrid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Mean sea level pressure
    Mslp,
    /// 10 m eastward wind component
    WindU,
    /// 10 m northward wind component
    WindV,
    /// Wind speed magnitude (derived from u/v)
    WindSpeed,
    /// Wind FROM-direction in degrees (derived from u/v)
    WindDirection,
    /// Planar x wind component regenerated from ramped speed/direction
    WindX,
    /// Planar y wind component regenerated from ramped speed/direction
    WindY,
    /// 2 m air temperature
    AirTemperature,
    /// 2 m dewpoint temperature
    DewpointTemperature,
    /// Clear-sky direct solar radiation rate
    Radiation,
    /// Precipitation rate
    Precipitation,
    /// Total cloud cover
    CloudCover,
}

impl FieldKind {
    /// Canonical short name used in configuration and output.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Mslp => "mslp",
            Self::WindU => "u10",
            Self::WindV => "v10",
            Self::WindSpeed => "ws",
            Self::WindDirection => "wd",
            Self::WindX => "wx",
            Self::WindY => "wy",
            Self::AirTemperature => "t2",
            Self::DewpointTemperature => "dpt2",
            Self::Radiation => "cdrx",
            Self::Precipitation => "tpx",
            Self::CloudCover => "tcc",
        }
    }

    /// Parse a short name from configuration.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "mslp" => Ok(Self::Mslp),
            "u10" => Ok(Self::WindU),
            "v10" => Ok(Self::WindV),
            "ws" => Ok(Self::WindSpeed),
            "wd" => Ok(Self::WindDirection),
            "wx" => Ok(Self::WindX),
            "wy" => Ok(Self::WindY),
            "t2" => Ok(Self::AirTemperature),
            "dpt2" => Ok(Self::DewpointTemperature),
            "cdrx" => Ok(Self::Radiation),
            "tpx" => Ok(Self::Precipitation),
            "tcc" => Ok(Self::CloudCover),
            other => Err(RegridError::configuration(format!(
                "unknown field name: {}",
                other
            ))),
        }
    }

    /// Default physical unit after load-time conversions.
    pub fn unit(&self) -> Unit {
        match self {
            Self::Mslp => Unit::Pascal,
            Self::WindU | Self::WindV | Self::WindSpeed | Self::WindX | Self::WindY => {
                Unit::MetresPerSecond
            }
            Self::WindDirection => Unit::Degrees,
            Self::AirTemperature | Self::DewpointTemperature => Unit::Celsius,
            Self::Radiation => Unit::WattsPerSquareMetre,
            Self::Precipitation => Unit::MetresPerSecond,
            Self::CloudCover => Unit::Fraction,
        }
    }

    /// Target placement on the mesh.
    pub fn placement(&self) -> Placement {
        match self {
            Self::WindU
            | Self::WindV
            | Self::WindSpeed
            | Self::WindDirection
            | Self::WindX
            | Self::WindY => Placement::Element,
            Self::Mslp
            | Self::AirTemperature
            | Self::DewpointTemperature
            | Self::Radiation
            | Self::Precipitation
            | Self::CloudCover => Placement::Node,
        }
    }

    /// Whether the field is a cyclic angle and needs branch-cut correction
    /// before any interpolation across its time axis.
    pub fn is_angular(&self) -> bool {
        matches!(self, Self::WindDirection)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for kind in [
            FieldKind::Mslp,
            FieldKind::WindU,
            FieldKind::WindV,
            FieldKind::WindSpeed,
            FieldKind::WindDirection,
            FieldKind::AirTemperature,
            FieldKind::Radiation,
            FieldKind::Precipitation,
        ] {
            assert_eq!(FieldKind::parse(kind.short_name()).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_name_is_configuration_error() {
        assert!(matches!(
            FieldKind::parse("humidity"),
            Err(RegridError::Configuration(_))
        ));
    }

    #[test]
    fn test_wind_fields_are_element_placed() {
        assert_eq!(FieldKind::WindSpeed.placement(), Placement::Element);
        assert_eq!(FieldKind::Mslp.placement(), Placement::Node);
    }

    #[test]
    fn test_only_direction_is_angular() {
        assert!(FieldKind::WindDirection.is_angular());
        assert!(!FieldKind::WindSpeed.is_angular());
        assert!(!FieldKind::Radiation.is_angular());
    }
}
