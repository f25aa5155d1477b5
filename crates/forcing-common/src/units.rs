//! Physical units carried by forcing fields, and the fixed set of
//! conversions applied when source data arrive in accumulated or
//! offset-based units.

use serde::{Deserialize, Serialize};

use crate::error::CommonError;

/// Offset between Kelvin and Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Seconds in the three-hour accumulation window used by the source archive
/// for radiation and precipitation fields.
pub const ACCUMULATION_WINDOW_SECONDS: f64 = 3.0 * 3600.0;

const SECONDS_PER_HOUR: f64 = 3600.0;
const MILLI: f64 = 1e-3;
const MICRO: f64 = 1e-6;

/// Physical unit of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Pascal (pressure).
    Pascal,
    /// Degrees Celsius (temperature).
    Celsius,
    /// Kelvin (temperature as delivered by the archive).
    Kelvin,
    /// Metres per second (wind components, precipitation rate).
    MetresPerSecond,
    /// Millimetres per hour (precipitation rate).
    MillimetresPerHour,
    /// Micrometres per hour (precipitation rate).
    MicrometresPerHour,
    /// Degrees of arc (wind direction).
    Degrees,
    /// Watts per square metre (radiative flux).
    WattsPerSquareMetre,
    /// Joules per square metre (accumulated radiation).
    JoulesPerSquareMetre,
    /// Metres (accumulated precipitation depth, heights).
    Metres,
    /// Dimensionless fraction in [0, 1] (cloud cover).
    Fraction,
    /// Modified Julian Day count.
    ModifiedJulianDay,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pascal => "Pa",
            Self::Celsius => "degC",
            Self::Kelvin => "K",
            Self::MetresPerSecond => "m/s",
            Self::MillimetresPerHour => "mm/h",
            Self::MicrometresPerHour => "um/h",
            Self::Degrees => "deg",
            Self::WattsPerSquareMetre => "W/m2",
            Self::JoulesPerSquareMetre => "J/m2",
            Self::Metres => "m",
            Self::Fraction => "0-1",
            Self::ModifiedJulianDay => "MJD",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CommonError> {
        match s {
            "Pa" => Ok(Self::Pascal),
            "degC" | "C" | "°C" => Ok(Self::Celsius),
            "K" => Ok(Self::Kelvin),
            "m/s" => Ok(Self::MetresPerSecond),
            "mm/h" => Ok(Self::MillimetresPerHour),
            "um/h" | "μm/h" => Ok(Self::MicrometresPerHour),
            "deg" => Ok(Self::Degrees),
            "W/m2" => Ok(Self::WattsPerSquareMetre),
            "J/m2" => Ok(Self::JoulesPerSquareMetre),
            "m" => Ok(Self::Metres),
            "0-1" => Ok(Self::Fraction),
            "MJD" => Ok(Self::ModifiedJulianDay),
            other => Err(CommonError::UnknownUnit(other.to_string())),
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Multiplicative factor converting `from` into `to`.
///
/// Only rate-style conversions are multiplicative; Kelvin/Celsius is an
/// offset and is rejected here (use [`KELVIN_OFFSET`] directly).
pub fn conversion_factor(from: Unit, to: Unit) -> Result<f64, CommonError> {
    use Unit::*;
    if from == to {
        return Ok(1.0);
    }
    match (from, to) {
        (MetresPerSecond, MillimetresPerHour) => Ok(SECONDS_PER_HOUR / MILLI),
        (MetresPerSecond, MicrometresPerHour) => Ok(SECONDS_PER_HOUR / MICRO),
        (MillimetresPerHour, MetresPerSecond) => Ok(MILLI / SECONDS_PER_HOUR),
        (MicrometresPerHour, MetresPerSecond) => Ok(MICRO / SECONDS_PER_HOUR),
        // Accumulated over the archive's 3 h window -> mean rate.
        (JoulesPerSquareMetre, WattsPerSquareMetre) => Ok(1.0 / ACCUMULATION_WINDOW_SECONDS),
        (Metres, MetresPerSecond) => Ok(1.0 / ACCUMULATION_WINDOW_SECONDS),
        (from, to) => Err(CommonError::UnsupportedConversion {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        }),
    }
}
