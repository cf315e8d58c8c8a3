//! Run a single range query over a delimited table file.
//!
//! Run with: cargo run --release --features bins --bin range_query -- lineitem.tbl 100 2000
//!
//! The first field of each line is the key; row ids are line numbers. The
//! result is checked against a brute-force scan unless `--no-verify` is given.
//!
//! For per-phase timing, build with `--features timing` and set
//! `RUST_LOG=raster_index::timing=debug`.

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use raster_index::loader::{load_entries, DEFAULT_DELIMITER};
use raster_index::{
    validation, CpuEngine, IndexConfig, IndexError, ParallelEngine, RangeIndex, DEFAULT_WIDTH,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "range_query")]
#[command(about = "Query a key range in a delimited table file")]
struct Args {
    /// Table file; the first field of each line is the key
    table: std::path::PathBuf,

    /// Inclusive start key
    #[arg(allow_negative_numbers = true)]
    start: i64,

    /// Exclusive end key
    #[arg(allow_negative_numbers = true)]
    end: i64,

    /// Grid row width in cells
    #[arg(short, long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// Result buffer capacity (default: one slot per covered cell)
    #[arg(short, long)]
    capacity: Option<usize>,

    /// Field delimiter
    #[arg(short, long, default_value_t = DEFAULT_DELIMITER)]
    delimiter: char,

    /// Worker threads (default: rayon global pool)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Skip the brute-force check
    #[arg(long)]
    no_verify: bool,
}

fn run(args: &Args) -> Result<bool, IndexError> {
    let t_load = Instant::now();
    let entries = load_entries(&args.table, args.delimiter)?;
    let load_ms = t_load.elapsed().as_secs_f64() * 1000.0;

    let engine = match args.threads {
        Some(n) => CpuEngine::with_threads(n)?,
        None => CpuEngine::new(),
    };

    let mut config = IndexConfig::new().with_width(args.width);
    if let Some(capacity) = args.capacity {
        config = config.with_capacity(capacity);
    }

    let t_build = Instant::now();
    let index = RangeIndex::build_with(engine, &entries, config)?;
    let build_ms = t_build.elapsed().as_secs_f64() * 1000.0;

    let t_query = Instant::now();
    let rows = index.query(args.start..args.end)?;
    let query_ms = t_query.elapsed().as_secs_f64() * 1000.0;

    println!("Table:");
    println!("  records   = {}", entries.len());
    println!(
        "  keys      = [{}, {}] ({} distinct)",
        index.min_key() + 1,
        index.max_key() - 1,
        index.distinct_keys()
    );
    println!(
        "  grid      = {} x {} ({} slots)",
        index.geometry().width(),
        index.geometry().height(),
        index.table_len()
    );
    println!(
        "  engine    = {} ({} threads)",
        index.engine().name(),
        index.engine().threads()
    );
    println!();
    println!("Query [{}, {}):", args.start, args.end);
    println!("  matches   = {}", rows.len());
    println!("  load      = {:>8.2}ms", load_ms);
    println!("  build     = {:>8.2}ms", build_ms);
    println!("  query     = {:>8.2}ms", query_ms);

    if args.no_verify {
        return Ok(true);
    }

    let t_verify = Instant::now();
    let report = validation::check(&entries, args.start..args.end, &rows);
    let verify_ms = t_verify.elapsed().as_secs_f64() * 1000.0;
    println!("  verify    = {:>8.2}ms  {}", verify_ms, report.summary());
    Ok(report.is_ok())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("verification failed");
            ExitCode::FAILURE
        }
        Err(IndexError::Overflow(overflow)) => {
            let partial: usize = overflow.partial.iter().map(|s| s.len()).sum();
            eprintln!("error: {} ({} rows recovered)", overflow, partial);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
