//! Temporal upsampling of sparse series onto a dense, uniform cadence.
//!
//! Each consecutive pair of source instants becomes a linear ramp with
//! `max(1, round(dt * steps_per_day))` steps. Segments share their boundary
//! sample, so every segment except the last contributes its samples without
//! the final one; the joined axis carries each instant exactly once.
//!
//! Vector fields are ramped component-wise by the caller (never as
//! magnitude/direction pairs), which is what keeps the unwrapped direction
//! series meaningful through the ramp.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RegridError, Result};
use crate::types::Series;

/// A dense, uniformly ramped series with its time axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RampedSeries {
    /// Dense MJD instants, strictly increasing, duplicate-free.
    pub times: Vec<f64>,
    /// One row per entity, one column per dense instant.
    pub values: Series,
}

/// Upsamples sparse per-entity series onto the dense cadence.
#[derive(Debug, Clone, Copy)]
pub struct TemporalRamper {
    steps_per_day: f64,
}

impl TemporalRamper {
    pub fn new(steps_per_day: f64) -> Self {
        Self { steps_per_day }
    }

    /// Number of ramp steps for one source segment.
    fn segment_steps(&self, from: f64, to: f64) -> usize {
        (((to - from) * self.steps_per_day).round() as i64).max(1) as usize
    }

    /// Build the dense time axis for a sparse axis.
    ///
    /// The last sample of every segment except the final one is dropped at
    /// the join, so shared boundary instants appear exactly once.
    pub fn dense_axis(&self, times: &[f64]) -> Result<Vec<f64>> {
        if times.is_empty() {
            return Err(RegridError::configuration("cannot ramp an empty time axis"));
        }
        for w in times.windows(2) {
            if w[1] <= w[0] {
                return Err(RegridError::data_shape(format!(
                    "time axis not strictly increasing at {} -> {}",
                    w[0], w[1]
                )));
            }
        }
        let mut dense = Vec::new();
        for w in times.windows(2) {
            let steps = self.segment_steps(w[0], w[1]);
            let delta = (w[1] - w[0]) / steps as f64;
            for j in 0..steps {
                dense.push(w[0] + delta * j as f64);
            }
        }
        dense.push(times[times.len() - 1]);
        debug!(
            sparse = times.len(),
            dense = dense.len(),
            "built dense time axis"
        );
        Ok(dense)
    }

    /// Ramp every entity row of `series` (sampled at `times`) onto the dense
    /// axis. The dense layout mirrors [`dense_axis`](Self::dense_axis) for
    /// the same sparse axis.
    pub fn ramp_values(&self, series: &Series, times: &[f64]) -> Result<Series> {
        if series.steps() != times.len() {
            return Err(RegridError::data_shape(format!(
                "series has {} steps but the time axis has {}",
                series.steps(),
                times.len()
            )));
        }
        let dense_len = self.dense_axis(times)?.len();
        let entities = series.entities();
        let mut out = Series::zeros(entities, dense_len);
        for e in 0..entities {
            let row = series.row(e);
            let dense_row = out.row_mut(e);
            let mut k = 0;
            for i in 0..times.len() - 1 {
                let steps = self.segment_steps(times[i], times[i + 1]);
                let delta = (row[i + 1] - row[i]) / steps as f64;
                for j in 0..steps {
                    dense_row[k] = row[i] + delta * j as f64;
                    k += 1;
                }
            }
            dense_row[k] = row[times.len() - 1];
        }
        Ok(out)
    }

    /// Ramp a series together with its axis.
    pub fn ramp(&self, series: &Series, times: &[f64]) -> Result<RampedSeries> {
        Ok(RampedSeries {
            times: self.dense_axis(times)?,
            values: self.ramp_values(series, times)?,
        })
    }
}
