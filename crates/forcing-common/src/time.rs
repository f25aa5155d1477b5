//! Modified Julian Day time handling.
//!
//! All time axes in the forcing pipeline are continuous day counts referenced
//! to the MJD epoch 1858-11-17 00:00:00 UTC. Fractional days carry the time
//! of day (0.5 = noon).

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CommonError;

/// The MJD epoch as an ISO date string.
pub const MJD_EPOCH: &str = "1858-11-17";

/// Days expressed in seconds.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// A point in time as a Modified Julian Day count.
///
/// Thin wrapper so MJD values are not confused with other f64 quantities in
/// signatures. Ordering and arithmetic go through [`Mjd::value`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mjd(pub f64);

impl Mjd {
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Convert to a UTC datetime.
    pub fn to_datetime(&self) -> DateTime<Utc> {
        mjd_to_datetime(self.0)
    }
}

impl From<f64> for Mjd {
    fn from(v: f64) -> Self {
        Mjd(v)
    }
}

impl std::fmt::Display for Mjd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1858, 11, 17)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_else(|| NaiveDateTime::default())
}

/// Convert a UTC datetime to a fractional MJD value.
pub fn datetime_to_mjd(dt: DateTime<Utc>) -> f64 {
    let delta = dt.naive_utc() - epoch();
    delta.num_days() as f64
        + (delta - Duration::days(delta.num_days())).num_seconds() as f64 / SECONDS_PER_DAY
}

/// Convert a fractional MJD value to a UTC datetime (second resolution).
pub fn mjd_to_datetime(mjd: f64) -> DateTime<Utc> {
    let secs = (mjd * SECONDS_PER_DAY).round() as i64;
    Utc.from_utc_datetime(&(epoch() + Duration::seconds(secs)))
}

/// Parse a `YYYY-MM-DD` date string into a whole-day MJD value.
pub fn date_str_to_mjd(s: &str) -> Result<f64, CommonError> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| CommonError::InvalidTime(s.to_string()))?;
    let dt = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| CommonError::InvalidTime(s.to_string()))?;
    Ok(datetime_to_mjd(Utc.from_utc_datetime(&dt)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_is_mjd_zero() {
        assert_eq!(date_str_to_mjd(MJD_EPOCH).unwrap(), 0.0);
    }

    #[test]
    fn test_known_mjd_value() {
        // 2000-01-01 00:00 UTC is MJD 51544.
        assert_eq!(date_str_to_mjd("2000-01-01").unwrap(), 51544.0);
    }

    #[test]
    fn test_fractional_day_roundtrip() {
        let mjd = 60636.25; // 06:00 UTC
        let dt = mjd_to_datetime(mjd);
        assert!((datetime_to_mjd(dt) - mjd).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_date_string() {
        assert!(date_str_to_mjd("not-a-date").is_err());
    }
}
