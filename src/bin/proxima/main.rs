//! Proxima CLI - closest-point and signed distance queries from the command line.
//!
//! Usage: proxima <COMMAND> [OPTIONS] <MESH>
//!
//! Run `proxima --help` for available commands.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use log::info;
use nalgebra::Point3;

use proxima::io;
use proxima::proximity::{closest_point_naive_with_options, ProximityIndex, QueryOptions};
use proxima::spatial::DEFAULT_LEAF_SIZE;

#[derive(Parser)]
#[command(name = "proxima")]
#[command(author, version, about = "Closest-point and signed distance queries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh and index information
    Info {
        /// Input mesh file
        input: PathBuf,

        /// Maximum triangles per BVH leaf
        #[arg(long, default_value_t = DEFAULT_LEAF_SIZE)]
        leaf_size: usize,
    },

    /// Find the closest surface point for each query point
    Query {
        /// Input mesh file
        input: PathBuf,

        /// Query point as x,y,z (repeatable)
        #[arg(short, long = "point", value_parser = parse_point, allow_hyphen_values = true)]
        points: Vec<Point3<f64>>,

        /// Text file with one x y z point per line
        #[arg(long = "points")]
        points_file: Option<PathBuf>,

        /// Report signed distance (positive inside)
        #[arg(long, conflicts_with = "naive")]
        signed: bool,

        /// Use the brute-force engine instead of the BVH
        #[arg(long)]
        naive: bool,

        /// Maximum triangles per BVH leaf
        #[arg(long, default_value_t = DEFAULT_LEAF_SIZE)]
        leaf_size: usize,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },
}

fn parse_point(s: &str) -> Result<Point3<f64>, String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("'{}': {}", v, e)))
        .collect::<Result<_, _>>()?;
    match values[..] {
        [x, y, z] => Ok(Point3::new(x, y, z)),
        _ => Err(format!("expected x,y,z, got {} values", values.len())),
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input, leaf_size } => {
            cmd_info(&input, leaf_size)?;
        }

        Commands::Query {
            input,
            points,
            points_file,
            signed,
            naive,
            leaf_size,
            sequential,
        } => {
            cmd_query(&input, points, points_file.as_deref(), signed, naive, leaf_size, sequential)?;
        }
    }

    Ok(())
}

fn cmd_info(input: &Path, leaf_size: usize) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load_mesh(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Triangles: {}", mesh.num_triangles());

    let mut min_area = f64::MAX;
    let mut max_area = 0.0_f64;
    let mut degenerate = 0usize;
    for f in mesh.face_ids() {
        let area = mesh.triangle_area(f);
        min_area = min_area.min(area);
        max_area = max_area.max(area);
        if area == 0.0 {
            degenerate += 1;
        }
    }

    println!("Surface area: {:.6}", mesh.surface_area());
    if !mesh.is_empty() {
        println!("Triangle area range: [{:.6}, {:.6}]", min_area, max_area);
    }
    if degenerate > 0 {
        println!("Degenerate triangles: {}", degenerate);
    }

    if let Some(bbox) = mesh.bounding_box() {
        let (min, max) = (bbox.min, bbox.max);
        println!("Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z);
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    let options = QueryOptions::default().with_leaf_size(leaf_size);
    let start = Instant::now();
    let index = ProximityIndex::build(&mesh, &options)?;
    let elapsed = start.elapsed();
    let stats = index.bvh().stats();
    println!("\nBVH (leaf size {}):", leaf_size);
    println!("  Nodes: {} ({} leaves)", stats.nodes, stats.leaves);
    println!("  Depth: {}", stats.depth);
    println!("  Build time: {:.2?}", elapsed);

    let pseudonormals = index.pseudonormals(&mesh)?;
    println!("Edges: {}", pseudonormals.num_edges());

    Ok(())
}

fn cmd_query(
    input: &Path,
    mut points: Vec<Point3<f64>>,
    points_file: Option<&Path>,
    signed: bool,
    naive: bool,
    leaf_size: usize,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load_mesh(input)?;
    info!("loaded {}: {} vertices, {} triangles",
        input.display(), mesh.num_vertices(), mesh.num_triangles());

    if let Some(path) = points_file {
        points.extend(io::load_points(path)?);
    }
    if points.is_empty() {
        return Err("no query points given (use --point or --points)".into());
    }

    let options = QueryOptions::default()
        .with_leaf_size(leaf_size)
        .with_parallel(!sequential);
    let mode = if sequential { "sequential" } else { "parallel" };

    let start = Instant::now();
    if signed {
        let index = ProximityIndex::build(&mesh, &options)?;
        let distances = index.signed_distance(&mesh, &points)?;
        info!("{} signed distances ({}) in {:.2?}", points.len(), mode, start.elapsed());

        for (p, d) in points.iter().zip(&distances) {
            println!("{} {} {} {}", p.x, p.y, p.z, d);
        }
    } else {
        let result = if naive {
            closest_point_naive_with_options(&mesh, &points, &options)?
        } else {
            ProximityIndex::build(&mesh, &options)?.closest_point(&mesh, &points)?
        };
        let engine = if naive { "naive" } else { "bvh" };
        info!("{} closest points ({}, {}) in {:.2?}", points.len(), engine, mode, start.elapsed());

        for (i, p) in points.iter().enumerate() {
            let c = result.points[i];
            println!("{} {} {} {} {} {} {} {}",
                p.x, p.y, p.z, c.x, c.y, c.z, result.distances[i], result.triangle_ids[i].index());
        }
    }

    Ok(())
}
