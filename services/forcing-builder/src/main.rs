//! Forcing builder service.
//!
//! Loads a mesh and a gridded atmospheric source dataset, runs the
//! regridding and ramping pipeline, and writes the per-entity forcing
//! series for the ocean model's input generator.

mod config;
mod input;
mod output;

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::RunConfig;
use regrid::ForcingPipeline;

#[derive(Parser, Debug)]
#[command(name = "forcing-builder")]
#[command(about = "Atmospheric forcing generator for unstructured coastal meshes")]
struct Args {
    /// Run configuration file (YAML)
    #[arg(short, long)]
    config: String,

    /// Mesh file (overrides the config entry)
    #[arg(long)]
    mesh: Option<String>,

    /// Source dataset file (overrides the config entry)
    #[arg(long)]
    source: Option<String>,

    /// Output file (overrides the config entry)
    #[arg(long)]
    output: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting forcing builder");

    let mut run = RunConfig::load(&args.config)
        .with_context(|| format!("loading run configuration {}", args.config))?;
    if let Some(mesh) = args.mesh {
        run.mesh_file = mesh;
    }
    if let Some(source) = args.source {
        run.source_file = source;
    }
    if let Some(output) = args.output {
        run.output_file = output;
    }

    let regrid_config = run.to_regrid_config()?;
    regrid_config.validate()?;
    info!(
        method = %regrid_config.method,
        window_start = regrid_config.window_start_mjd,
        window_end = regrid_config.window_end_mjd,
        steps_per_day = regrid_config.steps_per_day,
        "run configuration loaded"
    );

    let started = Instant::now();
    let mesh = mesh::Mesh::load(&run.mesh_file)
        .with_context(|| format!("loading mesh {}", run.mesh_file))?;

    let source = input::load_source(&run.source_file, &run.projection_plane())
        .with_context(|| format!("loading source dataset {}", run.source_file))?;
    info!(
        rows = source.grid.rows(),
        cols = source.grid.cols(),
        instants = source.times.len(),
        fields = source.fields.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "inputs loaded"
    );

    let pipeline_started = Instant::now();
    let result = ForcingPipeline::new(&mesh, &regrid_config).run(&source)?;
    info!(
        dense_steps = result.times.len(),
        direction_corrections = result.direction_corrections,
        elapsed_ms = pipeline_started.elapsed().as_millis() as u64,
        "pipeline finished"
    );

    output::write_result(&run.output_file, &result)
        .with_context(|| format!("writing output {}", run.output_file))?;
    info!(
        output = %run.output_file,
        total_elapsed_ms = started.elapsed().as_millis() as u64,
        "done"
    );

    Ok(())
}
