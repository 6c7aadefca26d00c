//! bingrid CLI - re-tile a storage bin STL into a new grid size

use anyhow::{Context, Result};
use bingrid::debug::{ArtifactSink, DirectorySink, NullSink};
use bingrid::float_types::Real;
use bingrid::mesh::bsp::BspEngine;
use bingrid::{GenerateOptions, GridSize, pipeline};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bingrid")]
#[command(about = "Re-tile a pre-modelled grid storage bin into another grid size", long_about = None)]
struct Cli {
    /// Input STL (ASCII or binary)
    #[arg(short, long)]
    input: PathBuf,

    /// Output STL (binary); parent directories are created
    #[arg(short, long)]
    output: PathBuf,

    /// Cell layout of the input model, e.g. 4x2 (at least 2x2)
    #[arg(short = 'g', long)]
    input_grids: GridSize,

    /// Corner radius of the bin, in model units
    #[arg(short = 'r', long)]
    corner_radius: Real,

    /// Height of the output bin
    #[arg(short = 'H', long)]
    height: Real,

    /// Cell layout of the output bin, e.g. 2x6
    #[arg(short = 'G', long)]
    output_grids: GridSize,

    /// Rescale the cell so one grid pitch equals this size
    #[arg(short = 's', long)]
    output_grid_size: Option<Real>,

    /// Divider wall thickness (accepted, dividers are not generated)
    #[arg(short = 'd', long)]
    divider_thickness: Option<Real>,

    /// Fuse pieces with boolean unions instead of welding
    #[arg(short = 'u', long)]
    union_all: bool,

    /// Write intermediate meshes to the debug directory
    #[arg(short = 'D', long)]
    debug: bool,

    /// Directory for debug meshes
    #[arg(long, default_value = "debug")]
    debug_dir: PathBuf,

    /// Re-cut the input by its own bounds before extracting a cell
    #[arg(long)]
    sanity_recut: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let options = GenerateOptions::new(cli.input_grids, cli.corner_radius, cli.height, cli.output_grids)
        .with_output_grid_size(cli.output_grid_size)
        .with_divider_thickness(cli.divider_thickness)
        .with_union_all(cli.union_all)
        .with_debug(cli.debug)
        .with_sanity_recut(cli.sanity_recut);

    let input = fs::read(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    let mut directory_sink;
    let mut null_sink = NullSink;
    let sink: &mut dyn ArtifactSink = if cli.debug {
        directory_sink = DirectorySink::new(&cli.debug_dir);
        &mut directory_sink
    } else {
        &mut null_sink
    };

    let stl = pipeline::generate_with(&input, &options, &BspEngine::new(), sink)
        .with_context(|| format!("re-tiling {}", cli.input.display()))?;

    if let Some(parent) = cli.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&cli.output, stl)
        .with_context(|| format!("writing {}", cli.output.display()))?;

    log::info!(
        "wrote {} ({} grid)",
        cli.output.display(),
        cli.output_grids
    );
    Ok(())
}
