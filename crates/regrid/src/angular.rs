//! Branch-cut correction for cyclic angle series.
//!
//! Wind direction lives on a circle; a physical rotation through north shows
//! up in the raw data as a 350 -> 10 jump. Interpolating or ramping through
//! that jump would sweep the long way around the circle, so the series is
//! unwrapped first: any step larger than 180 degrees gets a whole number of
//! 360-degree turns folded out. The corrected series may leave [0, 360);
//! [`wrap_into_circle`] restores the output range after ramping and is
//! idempotent on any already-wrapped run.

use tracing::debug;

use crate::types::Cube;

/// Unwrap one angle time series in place.
///
/// Whenever a step exceeds +/-180 degrees the later sample is shifted by
/// 360 until the step is inside the band. Returns the number of shifts.
pub fn unwrap_series(angles: &mut [f64]) -> usize {
    let mut changes = 0;
    for i in 1..angles.len() {
        while angles[i] - angles[i - 1] > 180.0 {
            angles[i] -= 360.0;
            changes += 1;
        }
        while angles[i] - angles[i - 1] < -180.0 {
            angles[i] += 360.0;
            changes += 1;
        }
    }
    changes
}

/// Unwrap every grid point's time series in a (rows x cols x time) cube.
///
/// Must run on the raw source data before spatial interpolation or ramping
/// crosses the time axis. Returns the total number of shifts, reported for
/// diagnostics.
pub fn unwrap_cube(cube: &mut Cube) -> usize {
    let mut changes = 0;
    let steps = cube.steps();
    if steps < 2 {
        return 0;
    }
    for row in 0..cube.rows() {
        for col in 0..cube.cols() {
            for t in 1..steps {
                let prev = cube.get(row, col, t - 1);
                let mut cur = cube.get(row, col, t);
                while cur - prev > 180.0 {
                    cur -= 360.0;
                    changes += 1;
                }
                while cur - prev < -180.0 {
                    cur += 360.0;
                    changes += 1;
                }
                cube.set(row, col, t, cur);
            }
        }
    }
    debug!(changes, "unwrapped direction cube");
    changes
}

/// Fold angles back into [0, 360) for output.
pub fn wrap_into_circle(angles: &mut [f64]) {
    for a in angles.iter_mut() {
        *a = a.rem_euclid(360.0);
    }
}
