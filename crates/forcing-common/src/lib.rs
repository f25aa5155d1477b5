//! Common types and utilities shared across the coastal-forcing workspace.

pub mod error;
pub mod time;
pub mod units;

pub use error::{CommonError, CommonResult};
pub use time::{datetime_to_mjd, mjd_to_datetime, Mjd, MJD_EPOCH};
pub use units::{conversion_factor, Unit};
