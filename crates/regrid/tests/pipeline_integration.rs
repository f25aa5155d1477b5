//! End-to-end pipeline tests on a small synthetic grid and mesh.

use forcing_common::Unit;
use mesh::{Mesh, MeshNode};
use projection::TangentPlane;
use regrid::{
    Cube, FieldKind, ForcingPipeline, ForcingSource, Grid2, InterpolationMethod, RegridConfig,
    RegridError, SourceField, SourceGrid,
};

const T0: f64 = 60636.0;

/// 4x4 geographic grid around the projection origin, projected to the mesh
/// plane.
fn synthetic_grid(plane: &TangentPlane) -> SourceGrid {
    let lat = Grid2::from_fn(4, 4, |r, _| 61.8 + 0.2 * r as f64);
    let lon = Grid2::from_fn(4, 4, |_, c| -7.4 + 0.4 * c as f64);
    SourceGrid::from_geographic(&lat, &lon, plane).unwrap()
}

/// Two triangles spanning a ~20 km square near the origin.
fn synthetic_mesh() -> Mesh {
    let nodes = vec![
        MeshNode { x: 0.0, y: 0.0 },
        MeshNode {
            x: 20_000.0,
            y: 0.0,
        },
        MeshNode {
            x: 0.0,
            y: 20_000.0,
        },
        MeshNode {
            x: 20_000.0,
            y: 20_000.0,
        },
    ];
    Mesh::from_tables(nodes, vec![[1, 2, 3], [2, 4, 3]]).unwrap()
}

/// Wind that swings through north: FROM 350, 10, 30 degrees at 8 m/s,
/// spatially uniform; pressure falling linearly in time.
fn synthetic_source(grid: SourceGrid) -> ForcingSource {
    let times = vec![T0, T0 + 0.5, T0 + 1.0];
    let directions = [350.0, 10.0, 30.0];
    let speed = 8.0;

    let mut u = Cube::zeros(4, 4, 3);
    let mut v = Cube::zeros(4, 4, 3);
    for (t, &d) in directions.iter().enumerate() {
        let (x, y) = regrid::wind::to_components(speed, d);
        for r in 0..4 {
            for c in 0..4 {
                u.set(r, c, t, x);
                v.set(r, c, t, y);
            }
        }
    }

    let mslp = Cube::new(
        4,
        4,
        3,
        (0..3)
            .flat_map(|t| std::iter::repeat(101_300.0 - 100.0 * t as f64).take(16))
            .collect(),
    )
    .unwrap();

    ForcingSource {
        grid,
        times,
        fields: vec![
            SourceField {
                kind: FieldKind::WindU,
                unit: Unit::MetresPerSecond,
                values: u,
            },
            SourceField {
                kind: FieldKind::WindV,
                unit: Unit::MetresPerSecond,
                values: v,
            },
            SourceField {
                kind: FieldKind::Mslp,
                unit: Unit::Pascal,
                values: mslp,
            },
        ],
    }
}

fn test_config() -> RegridConfig {
    RegridConfig {
        method: InterpolationMethod::Gaussian,
        window_start_mjd: T0,
        window_end_mjd: T0 + 1.0,
        steps_per_day: 24.0,
        fields: vec![
            FieldKind::WindSpeed,
            FieldKind::WindDirection,
            FieldKind::WindX,
            FieldKind::WindY,
            FieldKind::Mslp,
        ],
        ..Default::default()
    }
}

fn run_pipeline(config: &RegridConfig) -> regrid::ForcingResult {
    let plane = TangentPlane::centered(62.0, -7.0);
    let mesh = synthetic_mesh();
    let source = synthetic_source(synthetic_grid(&plane));
    ForcingPipeline::new(&mesh, config).run(&source).unwrap()
}

#[test]
fn test_dense_axis_is_strictly_increasing_and_covers_window() {
    let config = test_config();
    let result = run_pipeline(&config);
    assert!(result.times[0] <= config.window_start_mjd);
    assert!(*result.times.last().unwrap() >= config.window_end_mjd);
    for w in result.times.windows(2) {
        assert!(w[1] > w[0], "duplicate or reversed instants {:?}", w);
    }
}

#[test]
fn test_hourly_cadence_between_source_instants() {
    let result = run_pipeline(&test_config());
    let step = result.times[1] - result.times[0];
    assert!((step - 1.0 / 24.0).abs() < 1e-9, "step {}", step);
}

#[test]
fn test_requested_fields_in_order_with_shared_shape() {
    let config = test_config();
    let result = run_pipeline(&config);
    let kinds: Vec<FieldKind> = result.fields.iter().map(|f| f.kind).collect();
    assert_eq!(kinds, config.fields);
    for field in &result.fields {
        assert_eq!(field.values.steps(), result.times.len());
    }
    // Element-placed fields have one row per cell, node-placed per node.
    assert_eq!(result.field(FieldKind::WindSpeed).unwrap().values.entities(), 2);
    assert_eq!(result.field(FieldKind::Mslp).unwrap().values.entities(), 4);
}

#[test]
fn test_uniform_wind_keeps_speed_everywhere() {
    let result = run_pipeline(&test_config());
    let speed = &result.field(FieldKind::WindSpeed).unwrap().values;
    for e in 0..speed.entities() {
        for t in 0..speed.steps() {
            assert!(
                (speed.get(e, t) - 8.0).abs() < 1e-6,
                "speed at ({}, {}) = {}",
                e,
                t,
                speed.get(e, t)
            );
        }
    }
}

#[test]
fn test_direction_ramps_through_north_without_sweep() {
    let result = run_pipeline(&test_config());
    assert!(result.direction_corrections > 0);
    let direction = &result.field(FieldKind::WindDirection).unwrap().values;
    for e in 0..direction.entities() {
        let row = direction.row(e);
        for t in 0..row.len() {
            assert!(
                (0.0..360.0).contains(&row[t]),
                "direction {} not wrapped",
                row[t]
            );
        }
        // The 350 -> 10 swing is 20 degrees of rotation; consecutive hourly
        // samples must move by small angular distances, never the long way
        // around the circle.
        for w in row.windows(2) {
            let diff = (w[1] - w[0]).abs();
            let circular = diff.min(360.0 - diff);
            assert!(circular < 10.0, "jump {} -> {}", w[0], w[1]);
        }
    }
}

#[test]
fn test_components_ramped_component_wise() {
    let result = run_pipeline(&test_config());
    let speed = &result.field(FieldKind::WindSpeed).unwrap().values;
    let x = &result.field(FieldKind::WindX).unwrap().values;
    let y = &result.field(FieldKind::WindY).unwrap().values;

    // Source instants land at dense indices 0, 12, 24 (hourly cadence over
    // two half-day segments) and the held pad ends the axis.
    let source_indices = [0, 12, 24, result.times.len() - 1];
    for e in 0..speed.entities() {
        for t in 0..speed.steps() {
            let magnitude = x.get(e, t).hypot(y.get(e, t));
            // Linear blends of rotating unit vectors shorten, never grow:
            // between samples the magnitude dips below the ramped speed by
            // at most 1 - cos(10 deg) for the 20-degree swings here.
            assert!(
                magnitude <= speed.get(e, t) + 1e-9,
                "magnitude {} exceeds speed {}",
                magnitude,
                speed.get(e, t)
            );
            assert!(
                magnitude >= speed.get(e, t) * (10.0_f64.to_radians().cos()) - 1e-9,
                "magnitude {} dipped too far below speed {}",
                magnitude,
                speed.get(e, t)
            );
        }
        for &t in &source_indices {
            let magnitude = x.get(e, t).hypot(y.get(e, t));
            assert!(
                (magnitude - speed.get(e, t)).abs() < 1e-6,
                "magnitude {} vs speed {} at source instant {}",
                magnitude,
                speed.get(e, t),
                t
            );
        }
    }
}

#[test]
fn test_scalar_endpoints_and_held_end_pad() {
    let config = test_config();
    let result = run_pipeline(&config);
    let mslp = &result.field(FieldKind::Mslp).unwrap().values;
    for e in 0..mslp.entities() {
        let row = mslp.row(e);
        // Uniform source field: first sample is the first source value and
        // the pad holds the final value constant.
        assert!((row[0] - 101_300.0).abs() < 1e-6);
        let last = row[row.len() - 1];
        let second_last = row[row.len() - 2];
        assert!((last - 101_100.0).abs() < 1e-6);
        assert!((last - second_last).abs() < 1e-9, "pad not held constant");
    }
}

#[test]
fn test_wind_speed_broadcast_onto_nodes() {
    let result = run_pipeline(&test_config());
    let on_nodes = result.wind_speed_on_nodes.as_ref().unwrap();
    let speed = &result.field(FieldKind::WindSpeed).unwrap().values;
    assert_eq!(on_nodes.entities(), 4);
    // Node 0 is owned by cell 0, node 3 by cell 1.
    assert_eq!(on_nodes.row(0), speed.row(0));
    assert_eq!(on_nodes.row(3), speed.row(1));
}

#[test]
fn test_window_before_first_instant_fails() {
    let plane = TangentPlane::centered(62.0, -7.0);
    let mesh = synthetic_mesh();
    let source = synthetic_source(synthetic_grid(&plane));
    let config = RegridConfig {
        window_start_mjd: T0 - 1.0,
        window_end_mjd: T0 + 1.0,
        ..test_config()
    };
    let err = ForcingPipeline::new(&mesh, &config).run(&source).unwrap_err();
    assert!(matches!(err, RegridError::Configuration(_)));
}

#[test]
fn test_mismatched_field_shape_fails() {
    let plane = TangentPlane::centered(62.0, -7.0);
    let mesh = synthetic_mesh();
    let mut source = synthetic_source(synthetic_grid(&plane));
    source.fields[2].values = Cube::zeros(3, 4, 3);
    let config = test_config();
    let err = ForcingPipeline::new(&mesh, &config).run(&source).unwrap_err();
    assert!(matches!(err, RegridError::DataShape(_)));
}

#[test]
fn test_all_methods_agree_on_uniform_fields() {
    // A spatially uniform source is reproduced exactly by every strategy.
    for method in [
        InterpolationMethod::Nearest,
        InterpolationMethod::InverseDistance,
        InterpolationMethod::Gaussian,
    ] {
        let config = RegridConfig {
            method,
            ..test_config()
        };
        let result = run_pipeline(&config);
        let mslp = &result.field(FieldKind::Mslp).unwrap().values;
        assert!(
            (mslp.get(0, 0) - 101_300.0).abs() < 1e-6,
            "method {}",
            method
        );
    }
}
