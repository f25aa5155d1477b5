//! Conversions between polar and Cartesian wind representations.
//!
//! Meteorological convention: direction is the bearing the wind blows FROM,
//! measured clockwise from north. The planar components are mathematical
//! east/north TO-vectors, so the conversion both flips FROM to TO and swaps
//! the north-clockwise bearing for an east-counterclockwise angle:
//! `theta = 90 - (direction - 180)` degrees.

use std::f64::consts::PI;

use crate::error::{RegridError, Result};
use crate::types::Cube;

const DEG2RAD: f64 = PI / 180.0;
const RAD2DEG: f64 = 180.0 / PI;

/// Convert speed and FROM-direction (degrees) to planar (x, y) components.
pub fn to_components(speed: f64, direction_deg: f64) -> (f64, f64) {
    let theta = (90.0 - (direction_deg - 180.0)) * DEG2RAD;
    (speed * theta.cos(), speed * theta.sin())
}

/// Convert planar (x, y) components to speed and FROM-direction in [0, 360).
pub fn to_polar(x: f64, y: f64) -> (f64, f64) {
    let speed = x.hypot(y);
    let bearing = y.atan2(x) * RAD2DEG; // east-counterclockwise TO-angle
    let direction = (270.0 - bearing).rem_euclid(360.0);
    (speed, direction)
}

/// Derive speed and FROM-direction cubes from u/v component cubes.
///
/// The two cubes must share their shape; this is the paired-vector-field
/// check from the shape-error taxonomy.
pub fn speed_direction_cubes(u: &Cube, v: &Cube) -> Result<(Cube, Cube)> {
    if u.rows() != v.rows() || u.cols() != v.cols() || u.steps() != v.steps() {
        return Err(RegridError::data_shape(format!(
            "u cube is {}x{}x{} but v cube is {}x{}x{}",
            u.rows(),
            u.cols(),
            u.steps(),
            v.rows(),
            v.cols(),
            v.steps()
        )));
    }
    let mut speed = Cube::zeros(u.rows(), u.cols(), u.steps());
    let mut direction = Cube::zeros(u.rows(), u.cols(), u.steps());
    for t in 0..u.steps() {
        for r in 0..u.rows() {
            for c in 0..u.cols() {
                let (s, d) = to_polar(u.get(r, c, t), v.get(r, c, t));
                speed.set(r, c, t, s);
                direction.set(r, c, t, d);
            }
        }
    }
    Ok((speed, direction))
}

/// Derive planar component cubes from speed/direction cubes.
///
/// The component pair is carried as its own fields from here on, so it is
/// spatially interpolated and temporally ramped component-wise: linear
/// blends of (x, y) never sweep the long way around the circle, which
/// magnitude/direction blending would.
pub fn component_cubes(speed: &Cube, direction: &Cube) -> Result<(Cube, Cube)> {
    if speed.rows() != direction.rows()
        || speed.cols() != direction.cols()
        || speed.steps() != direction.steps()
    {
        return Err(RegridError::data_shape(format!(
            "speed cube is {}x{}x{} but direction cube is {}x{}x{}",
            speed.rows(),
            speed.cols(),
            speed.steps(),
            direction.rows(),
            direction.cols(),
            direction.steps()
        )));
    }
    let mut x = Cube::zeros(speed.rows(), speed.cols(), speed.steps());
    let mut y = Cube::zeros(speed.rows(), speed.cols(), speed.steps());
    for t in 0..speed.steps() {
        for r in 0..speed.rows() {
            for c in 0..speed.cols() {
                let (wx, wy) = to_components(speed.get(r, c, t), direction.get(r, c, t));
                x.set(r, c, t, wx);
                y.set(r, c, t, wy);
            }
        }
    }
    Ok((x, y))
}
