//! Weighted constraints as multi-terminal diagrams.
//!
//! Builds `Σ w_i·x_i` for the given weights, counts the assignments meeting
//! a threshold, and optionally writes a Graphviz file and a snapshot.
//!
//! ```bash
//! cargo run --example linear -- 3 5 7 11 --threshold 15 --dot linear.dot
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::info;

use mtbdd_rs::mtbdd::Mtbdd;
use mtbdd_rs::snapshot::SnapshotFormat;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Binary,
    Gzip,
    Json,
}

impl From<Format> for SnapshotFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Binary => SnapshotFormat::Binary,
            Format::Gzip => SnapshotFormat::Gzip,
            Format::Json => SnapshotFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Integer weights, one variable per weight.
    #[arg(value_name = "INT", default_values_t = [2, 3, 5, 7])]
    weights: Vec<i64>,

    /// Minimum total weight.
    #[clap(long, value_name = "INT", default_value = "10")]
    threshold: i64,

    /// Write the sum and the constraint diagrams as DOT.
    #[clap(long, value_name = "FILE")]
    dot: Option<PathBuf>,

    /// Save a snapshot of the engine and load it back.
    #[clap(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Snapshot encoding.
    #[clap(long, value_enum, default_value = "gzip")]
    format: Format,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    println!("args = {:?}", args);

    let names: Vec<String> = (1..=args.weights.len()).map(|i| format!("x{}", i)).collect();
    let mtbdd = Mtbdd::default();
    mtbdd.declare(&names);

    let terms: Vec<(&str, i64)> = names.iter().map(String::as_str).zip(args.weights.iter().copied()).collect();
    let sum = mtbdd.linear_function(terms.iter().copied(), 0)?;
    let constraint = mtbdd.weighted_formula(terms.iter().copied(), args.threshold)?;
    println!("sum: {} nodes, constraint: {} nodes", mtbdd.size(sum), mtbdd.size(constraint));

    let total = 1u128 << names.len();
    println!("{} of {} assignments reach {}", mtbdd.count_sat(constraint), total, args.threshold);
    match mtbdd.sat(constraint) {
        Some(model) => {
            let chosen: Vec<&String> = model.iter().filter(|&(_, &v)| v).map(|(k, _)| k).collect();
            println!("example: {:?} -> {}", chosen, mtbdd.evaluate(sum, &model));
        }
        None => println!("threshold is unreachable"),
    }

    if let Some(path) = &args.dot {
        std::fs::write(path, mtbdd.to_dot(&[sum, constraint])?)?;
        println!("wrote {}", path.display());
    }

    if let Some(path) = &args.snapshot {
        let format = args.format.into();
        mtbdd.save(path, format)?;
        let copy = Mtbdd::default();
        copy.load(path, format)?;
        info!("restored engine: {}", copy.stats());
        println!("snapshot round trip: {} solutions", copy.count_sat(constraint));
    }

    Ok(())
}
