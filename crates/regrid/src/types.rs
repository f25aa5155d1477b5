//! Core array containers and the source-data model.
//!
//! Arrays are plain row-major `Vec<f64>` with explicit dimensions; the
//! shapes involved are small enough that index arithmetic beats pulling in a
//! tensor library. Cubes store the time axis slab-major so that appending a
//! time step (boundary extension) is a single `extend_from_within`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use forcing_common::Unit;
use projection::TangentPlane;

use crate::error::{RegridError, Result};
use crate::fields::FieldKind;

/// Scan tolerance on the MJD axis (about 0.1 s).
pub const TIME_EPSILON: f64 = 1e-6;

/// A 2-D array over the source grid (rows x cols, row-major).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid2 {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Grid2 {
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(RegridError::data_shape(format!(
                "grid array has {} values, expected {}x{}",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { data, rows, cols })
    }

    /// Build by evaluating `f(row, col)`.
    pub fn from_fn(rows: usize, cols: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { data, rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }
}

/// A 3-D field array (rows x cols x time).
///
/// Layout is time-slab-major: `data[t * rows * cols + r * cols + c]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cube {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
    steps: usize,
}

impl Cube {
    pub fn new(rows: usize, cols: usize, steps: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols * steps {
            return Err(RegridError::data_shape(format!(
                "field array has {} values, expected {}x{}x{}",
                data.len(),
                rows,
                cols,
                steps
            )));
        }
        Ok(Self {
            data,
            rows,
            cols,
            steps,
        })
    }

    pub fn zeros(rows: usize, cols: usize, steps: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols * steps],
            rows,
            cols,
            steps,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize, step: usize) -> f64 {
        self.data[step * self.rows * self.cols + row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, step: usize, value: f64) {
        self.data[step * self.rows * self.cols + row * self.cols + col] = value;
    }

    /// Apply `f` to every value.
    pub fn map_in_place(&mut self, f: impl Fn(f64) -> f64) {
        for v in &mut self.data {
            *v = f(*v);
        }
    }

    /// Keep only time steps `start..=end`.
    pub fn slice_steps(&self, start: usize, end: usize) -> Self {
        let slab = self.rows * self.cols;
        Self {
            data: self.data[start * slab..(end + 1) * slab].to_vec(),
            rows: self.rows,
            cols: self.cols,
            steps: end - start + 1,
        }
    }

    /// Append one time step that repeats the final slab (boundary
    /// extension: hold the last observed value constant).
    pub fn append_last_step(&mut self) {
        let slab = self.rows * self.cols;
        let from = (self.steps - 1) * slab;
        self.data.extend_from_within(from..from + slab);
        self.steps += 1;
    }
}

/// Dense 2-D result array (entities x time steps, entity rows contiguous).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    data: Vec<f64>,
    entities: usize,
    steps: usize,
}

impl Series {
    pub fn zeros(entities: usize, steps: usize) -> Self {
        Self {
            data: vec![0.0; entities * steps],
            entities,
            steps,
        }
    }

    pub fn entities(&self) -> usize {
        self.entities
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    #[inline]
    pub fn get(&self, entity: usize, step: usize) -> f64 {
        self.data[entity * self.steps + step]
    }

    #[inline]
    pub fn set(&mut self, entity: usize, step: usize, value: f64) {
        self.data[entity * self.steps + step] = value;
    }

    /// One entity's full time series.
    pub fn row(&self, entity: usize) -> &[f64] {
        &self.data[entity * self.steps..(entity + 1) * self.steps]
    }

    pub fn row_mut(&mut self, entity: usize) -> &mut [f64] {
        &mut self.data[entity * self.steps..(entity + 1) * self.steps]
    }
}

/// Projected coordinates of the regular source grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceGrid {
    pub x: Grid2,
    pub y: Grid2,
}

impl SourceGrid {
    pub fn new(x: Grid2, y: Grid2) -> Result<Self> {
        if x.rows() != y.rows() || x.cols() != y.cols() {
            return Err(RegridError::data_shape(format!(
                "grid x is {}x{} but grid y is {}x{}",
                x.rows(),
                x.cols(),
                y.rows(),
                y.cols()
            )));
        }
        Ok(Self { x, y })
    }

    /// Project geographic coordinate arrays into the mesh plane.
    pub fn from_geographic(lat: &Grid2, lon: &Grid2, plane: &TangentPlane) -> Result<Self> {
        if lat.rows() != lon.rows() || lat.cols() != lon.cols() {
            return Err(RegridError::data_shape(format!(
                "lat is {}x{} but lon is {}x{}",
                lat.rows(),
                lat.cols(),
                lon.rows(),
                lon.cols()
            )));
        }
        let x = Grid2::from_fn(lat.rows(), lat.cols(), |r, c| {
            plane.to_plane(lat.get(r, c), lon.get(r, c)).0
        });
        let y = Grid2::from_fn(lat.rows(), lat.cols(), |r, c| {
            plane.to_plane(lat.get(r, c), lon.get(r, c)).1
        });
        Ok(Self { x, y })
    }

    pub fn rows(&self) -> usize {
        self.x.rows()
    }

    pub fn cols(&self) -> usize {
        self.x.cols()
    }
}

/// One named field sampled on the source grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceField {
    pub kind: FieldKind,
    pub unit: Unit,
    pub values: Cube,
}

/// The complete source-side input: grid coordinates, the sparse MJD time
/// axis, and the field cubes sharing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForcingSource {
    pub grid: SourceGrid,
    /// Strictly increasing MJD instants, one per cube time step.
    pub times: Vec<f64>,
    pub fields: Vec<SourceField>,
}

impl ForcingSource {
    /// Check every field cube against the grid dimensions and the time axis.
    pub fn validate_shapes(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(RegridError::configuration("empty source field list"));
        }
        for w in self.times.windows(2) {
            if w[1] <= w[0] {
                return Err(RegridError::data_shape(format!(
                    "time axis not strictly increasing at {} -> {}",
                    w[0], w[1]
                )));
            }
        }
        for field in &self.fields {
            let cube = &field.values;
            if cube.rows() != self.grid.rows() || cube.cols() != self.grid.cols() {
                return Err(RegridError::data_shape(format!(
                    "field {} is {}x{} but grid is {}x{}",
                    field.kind,
                    cube.rows(),
                    cube.cols(),
                    self.grid.rows(),
                    self.grid.cols()
                )));
            }
            if cube.steps() != self.times.len() {
                return Err(RegridError::data_shape(format!(
                    "field {} has {} time steps but the axis has {}",
                    field.kind,
                    cube.steps(),
                    self.times.len()
                )));
            }
        }
        Ok(())
    }

    pub fn field(&self, kind: FieldKind) -> Option<&SourceField> {
        self.fields.iter().find(|f| f.kind == kind)
    }

    pub fn field_mut(&mut self, kind: FieldKind) -> Option<&mut SourceField> {
        self.fields.iter_mut().find(|f| f.kind == kind)
    }

    /// Fetch a field or fail with a MissingField error.
    pub fn require(&self, kind: FieldKind) -> Result<&SourceField> {
        self.field(kind)
            .ok_or_else(|| RegridError::MissingField(kind.short_name().to_string()))
    }

    /// Insert a field, replacing any existing cube of the same kind.
    pub fn insert(&mut self, field: SourceField) {
        self.fields.retain(|f| f.kind != field.kind);
        self.fields.push(field);
    }

    /// Cut the source down to the requested window and apply the boundary
    /// extension.
    ///
    /// The start index is the greatest instant at or before `start`; a first
    /// instant after `start` is fatal since backward extrapolation is not
    /// defined. The end index is the greatest instant at or before `end`.
    /// One synthetic sample at `end + textra` repeating the final values is
    /// appended so the ramp covers the whole window without inventing trend.
    pub fn select_window(&self, start: f64, end: f64, textra: f64) -> Result<ForcingSource> {
        if self.times.is_empty() {
            return Err(RegridError::configuration("source time axis is empty"));
        }
        if self.times[0] > start + TIME_EPSILON {
            return Err(RegridError::configuration(format!(
                "window start {} precedes first source instant {}",
                start, self.times[0]
            )));
        }

        let mut start_index = 0;
        for (i, &t) in self.times.iter().enumerate() {
            if t <= start + TIME_EPSILON {
                start_index = i;
            } else {
                break;
            }
        }

        let mut end_index = start_index;
        for (i, &t) in self.times.iter().enumerate().skip(start_index) {
            if t < end + TIME_EPSILON {
                end_index = i;
            } else {
                break;
            }
        }

        let mut times = self.times[start_index..=end_index].to_vec();
        let mut fields: Vec<SourceField> = self
            .fields
            .iter()
            .map(|f| SourceField {
                kind: f.kind,
                unit: f.unit,
                values: f.values.slice_steps(start_index, end_index),
            })
            .collect();

        // The selected axis never reaches past `end`, so the window always
        // gets the held-value end pad.
        if times[times.len() - 1] <= end + TIME_EPSILON {
            times.push(end + textra);
            for field in &mut fields {
                field.values.append_last_step();
            }
        }

        debug!(
            start_index,
            end_index,
            selected = times.len(),
            "selected source window"
        );

        Ok(ForcingSource {
            grid: self.grid.clone(),
            times,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_with_steps(values: &[f64]) -> Cube {
        // 1x1 grid, one value per step.
        Cube::new(1, 1, values.len(), values.to_vec()).unwrap()
    }

    fn source(times: &[f64], values: &[f64]) -> ForcingSource {
        ForcingSource {
            grid: SourceGrid::new(
                Grid2::new(1, 1, vec![0.0]).unwrap(),
                Grid2::new(1, 1, vec![0.0]).unwrap(),
            )
            .unwrap(),
            times: times.to_vec(),
            fields: vec![SourceField {
                kind: FieldKind::Mslp,
                unit: Unit::Pascal,
                values: cube_with_steps(values),
            }],
        }
    }

    #[test]
    fn test_cube_layout_and_append() {
        let mut cube = Cube::new(2, 2, 1, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(cube.get(0, 1, 0), 2.0);
        assert_eq!(cube.get(1, 0, 0), 3.0);
        cube.append_last_step();
        assert_eq!(cube.steps(), 2);
        assert_eq!(cube.get(1, 1, 1), 4.0);
    }

    #[test]
    fn test_series_rows() {
        let mut s = Series::zeros(2, 3);
        s.set(1, 2, 9.0);
        assert_eq!(s.row(1), &[0.0, 0.0, 9.0]);
    }

    #[test]
    fn test_shape_validation_rejects_bad_cube() {
        let mut src = source(&[0.0, 1.0], &[5.0, 6.0]);
        src.fields[0].values = Cube::new(2, 1, 2, vec![0.0; 4]).unwrap();
        assert!(matches!(
            src.validate_shapes(),
            Err(RegridError::DataShape(_))
        ));
    }

    #[test]
    fn test_shape_validation_rejects_unsorted_axis() {
        let src = source(&[1.0, 0.5], &[5.0, 6.0]);
        assert!(src.validate_shapes().is_err());
    }

    #[test]
    fn test_window_start_before_first_instant_is_fatal() {
        let src = source(&[10.0, 11.0], &[5.0, 6.0]);
        assert!(matches!(
            src.select_window(9.0, 11.0, 0.1),
            Err(RegridError::Configuration(_))
        ));
    }

    #[test]
    fn test_window_selection_and_extension() {
        let src = source(&[10.0, 10.5, 11.0, 11.5, 12.0], &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let cut = src.select_window(10.5, 11.5, 0.1).unwrap();
        // Selected 10.5, 11.0, 11.5 plus the synthetic pad at 11.6.
        assert_eq!(cut.times, vec![10.5, 11.0, 11.5, 11.6]);
        let cube = &cut.fields[0].values;
        assert_eq!(cube.steps(), 4);
        assert_eq!(cube.get(0, 0, 0), 2.0);
        // The pad repeats the last real value.
        assert_eq!(cube.get(0, 0, 3), 4.0);
    }

    #[test]
    fn test_window_start_between_instants_backs_up() {
        let src = source(&[10.0, 11.0, 12.0], &[1.0, 2.0, 3.0]);
        let cut = src.select_window(10.5, 12.0, 0.1).unwrap();
        // Starts at the instant at or before the requested start.
        assert_eq!(cut.times[0], 10.0);
    }
}
