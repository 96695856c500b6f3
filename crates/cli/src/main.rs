//! Spillway CLI - watershed segmentation and basin spill heights

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use spillway_algorithms::hydrology::{
    segment, BasinGraph, BasinPartition, ExitPoint, Preference, SegmentationParams,
};
use spillway_core::io::{read_height_field, write_label_grid};
use spillway_core::HeightField;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "spillway")]
#[command(author, version, about = "Watershed segmentation and basin spill heights", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a height grid
    Info {
        /// Input height grid (.tif, or .asc for ESRI ASCII)
        input: PathBuf,
    },
    /// Segment a height grid into basins and write a label grid
    Segment {
        /// Input height grid (.tif, or .asc for ESRI ASCII)
        input: PathBuf,
        /// Output label grid (Gray32 .tif, or .asc), one basin id per cell
        output: PathBuf,
        /// Depth a basin must have below a ridge to stay separate
        #[arg(short, long, default_value = "0")]
        max_z_diff: u32,
        /// Label ridge cells with their highest basin id instead of the lowest
        #[arg(long)]
        highest: bool,
        /// Print per-basin summaries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute each basin's floor and spill height for a set of exits
    BasinGraph {
        /// Input height grid (.tif, or .asc for ESRI ASCII)
        input: PathBuf,
        /// Exits as "x,y,z;x,y,z;..."
        #[arg(short, long, allow_hyphen_values = true)]
        exit: String,
        /// Depth a basin must have below a ridge to stay separate
        #[arg(short, long, default_value = "0")]
        max_z_diff: u32,
        /// Print heights and graph edges as JSON
        #[arg(long)]
        json: bool,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_field(path: &PathBuf) -> Result<HeightField> {
    let pb = spinner("Reading height grid...");
    let field = read_height_field(path).with_context(|| format!("Failed to read {}", path.display()))?;
    pb.finish_and_clear();
    Ok(field)
}

fn segment_field(field: &HeightField, max_z_diff: u32) -> Result<BasinPartition> {
    let pb = spinner("Segmenting basins...");
    let partition = segment(field, SegmentationParams { max_z_diff }).context("Segmentation failed")?;
    pb.finish_and_clear();
    info!(basins = partition.basin_count(), "segmentation complete");
    Ok(partition)
}

fn parse_exits(s: &str) -> Result<Vec<ExitPoint>> {
    s.split(';')
        .filter(|part| !part.trim().is_empty())
        .map(|triple| {
            let parts: Vec<&str> = triple.trim().split(',').collect();
            if parts.len() != 3 {
                anyhow::bail!("Exit must be 'x,y,z', got: {}", triple);
            }
            let x: f64 = parts[0].trim().parse().context("Invalid exit x")?;
            let y: f64 = parts[1].trim().parse().context("Invalid exit y")?;
            let z: f64 = parts[2].trim().parse().context("Invalid exit z")?;
            Ok(ExitPoint::new(x, y, z))
        })
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let field = read_field(&input)?;
            let stats = field.grid().statistics();

            println!("File: {}", input.display());
            println!(
                "Dimensions: {} x {} ({} cells)",
                field.width(),
                field.height(),
                field.len()
            );
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
        }

        // ── Segment ──────────────────────────────────────────────────
        Commands::Segment {
            input,
            output,
            max_z_diff,
            highest,
            json,
        } => {
            let field = read_field(&input)?;
            let start = Instant::now();
            let partition = segment_field(&field, max_z_diff)?;
            let preference = if highest {
                Preference::Highest
            } else {
                Preference::Lowest
            };
            let labels = partition.label_grid(preference)?;
            write_label_grid(&labels, &output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            let elapsed = start.elapsed();

            let summaries = partition.basin_summaries()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                println!("Basins: {}", partition.basin_count());
                for s in &summaries {
                    println!(
                        "  {:>4}: minimum ({}, {}) z={} cells={} ridge={}",
                        s.basin_id, s.minimum_x, s.minimum_y, s.ground_z, s.interior_cells, s.boundary_cells
                    );
                }
            }
            info!("labels saved to {} in {:.2?}", output.display(), elapsed);
        }

        // ── Basin graph ──────────────────────────────────────────────
        Commands::BasinGraph {
            input,
            exit,
            max_z_diff,
            json,
        } => {
            let exits = parse_exits(&exit)?;
            let field = read_field(&input)?;
            let start = Instant::now();
            let partition = segment_field(&field, max_z_diff)?;
            let graph = BasinGraph::new(&partition, &exits).context("Failed to build basin graph")?;
            let elapsed = start.elapsed();

            if json {
                let edges: Vec<_> = graph
                    .graph()
                    .iter()
                    .map(|(basin_id, neighbors)| {
                        serde_json::json!({
                            "basin_id": basin_id,
                            "neighbors": neighbors
                                .iter()
                                .map(|(node, saddle)| serde_json::json!({ "node": node, "saddle": saddle }))
                                .collect::<Vec<_>>(),
                        })
                    })
                    .collect();
                let report = serde_json::json!({
                    "exits": graph.exits(),
                    "heights": graph.heights(),
                    "graph": edges,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Basins: {}", partition.basin_count());
                println!("Exits: {}", graph.exits().len());
                for basin_id in 0..partition.basin_count() as u32 {
                    match graph.heights_info(basin_id) {
                        Ok(h) => println!("  {:>4}: ground_z={} max_z={}", basin_id, h.ground_z, h.max_z),
                        Err(_) => println!("  {:>4}: no path to an exit", basin_id),
                    }
                }
            }
            info!("basin graph computed in {:.2?}", elapsed);
        }
    }

    Ok(())
}
