//! Basin graph demo: synthetic terrace valley
//!
//! Builds a 24x16 valley floor with three pits separated by low ridges,
//! drains it through one exit at the west edge and prints, per basin, its
//! floor and the level at which it spills out of the valley.
//!
//! Run:
//!   cargo run -p spillway-algorithms --example basin_graph_demo

use spillway_algorithms::hydrology::{segment, BasinGraph, ExitPoint, SegmentationParams};
use spillway_core::HeightField;

const WIDTH: usize = 24;
const HEIGHT: usize = 16;

fn terrain(x: usize, y: usize) -> f64 {
    let valley = (y as f64 - HEIGHT as f64 / 2.0).abs() * 3.0;
    let ridges = ((x as f64) * std::f64::consts::PI / 8.0).sin().abs() * 12.0;
    let tilt = x as f64 * 0.5;
    valley + ridges + tilt + 10.0
}

fn main() {
    let data: Vec<f64> = (0..HEIGHT)
        .flat_map(|y| (0..WIDTH).map(move |x| terrain(x, y)))
        .collect();
    let field = HeightField::from_raw(&data, WIDTH, HEIGHT).expect("valid field");

    let partition = segment(&field, SegmentationParams { max_z_diff: 1 }).expect("segmentation");
    println!("{} basins", partition.basin_count());

    let exit = ExitPoint::new(0.0, (HEIGHT / 2) as f64, 5.0);
    let graph = BasinGraph::new(&partition, &[exit]).expect("basin graph");

    for summary in partition.basin_summaries().expect("summaries") {
        match graph.heights_info(summary.basin_id) {
            Ok(info) => println!(
                "basin {:>2} at ({:>2}, {:>2}): floor {:>5.1}, spills at {:>5.1}",
                summary.basin_id, summary.minimum_x, summary.minimum_y, info.ground_z, info.max_z
            ),
            Err(e) => println!("basin {:>2}: {}", summary.basin_id, e),
        }
    }
}
