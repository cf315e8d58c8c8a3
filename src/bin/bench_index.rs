//! Benchmark index build and range query throughput on synthetic data.
//!
//! Run with: cargo run --release --features bins --bin bench_index
//!
//! Usage:
//!   bench_index                         1M rows, 1k queries at 1% selectivity
//!   bench_index --rows 10m --queries 5k Larger table
//!   bench_index --selectivity 0.0001    Narrow ranges
//!   bench_index --batch 64              Dispatch queries 64 at a time
//!   bench_index --batch 64 --capacity 1m  Bounded result buffer per dispatch
//!
//! For per-phase timing, build with `--features timing` and set
//! `RUST_LOG=raster_index::timing=debug`.

use std::ops::Range;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use raster_index::{
    entries_from_keys, validation, CpuEngine, Entry, IndexConfig, IndexError, ParallelEngine,
    RangeIndex, ResultSet, DEFAULT_WIDTH,
};
use tracing_subscriber::EnvFilter;

/// Parse a row or query count with an optional `k` / `m` suffix.
fn parse_scaled(s: &str) -> Result<usize, String> {
    let lower = s.trim().to_ascii_lowercase();
    let (digits, scale) = match lower.strip_suffix('m') {
        Some(rest) => (rest, 1e6),
        None => match lower.strip_suffix('k') {
            Some(rest) => (rest, 1e3),
            None => (lower.as_str(), 1.0),
        },
    };
    let value: f64 = digits
        .parse()
        .map_err(|e| format!("bad count {:?}: {}", s, e))?;
    if value < 0.0 {
        return Err(format!("bad count {:?}: negative", s));
    }
    Ok((value * scale).round() as usize)
}

/// Short human form of a count: `950`, `12.5k`, `3.0M`.
fn human(n: usize) -> String {
    match n {
        0..=999 => n.to_string(),
        1_000..=999_999 => format!("{:.1}k", n as f64 / 1e3),
        _ => format!("{:.1}M", n as f64 / 1e6),
    }
}

/// Items per second over `ms` milliseconds, in human form.
fn per_second(items: usize, ms: f64) -> String {
    if ms > 0.0 {
        format!("{}/s", human((items as f64 * 1e3 / ms) as usize))
    } else {
        "-".to_string()
    }
}

#[derive(Parser)]
#[command(name = "bench_index")]
#[command(about = "Benchmark raster-index build and query throughput")]
struct Args {
    /// Table rows (e.g., 100k, 1m)
    #[arg(long, value_parser = parse_scaled, default_value = "1m")]
    rows: usize,

    /// Number of random queries
    #[arg(long, value_parser = parse_scaled, default_value = "1k")]
    queries: usize,

    /// Fraction of the key span each query covers
    #[arg(long, default_value_t = 0.01)]
    selectivity: f64,

    /// Gap between consecutive keys (1 = dense)
    #[arg(long, default_value_t = 1)]
    stride: u32,

    /// Grid row width in cells
    #[arg(short, long, default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// Result buffer slots per dispatch (default: one per covered cell)
    #[arg(short, long, value_parser = parse_scaled)]
    capacity: Option<usize>,

    /// Random seed
    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Worker threads (default: rayon global pool)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Queries per dispatch (1 = one dispatch per query)
    #[arg(long, default_value_t = 1)]
    batch: usize,

    /// Check every result against a brute-force scan (slow)
    #[arg(long)]
    validate: bool,
}

/// Distinct keys `0, stride, 2*stride, ...` in shuffled input order.
fn generate_entries(rows: usize, stride: u32, rng: &mut ChaCha8Rng) -> Result<Vec<Entry>, String> {
    let stride = i64::from(stride.max(1));
    let top = (rows as i64).saturating_mul(stride);
    if top > i64::from(i32::MAX) {
        return Err(format!("{} rows at stride {} overflow i32 keys", rows, stride));
    }
    let mut keys: Vec<i32> = (0..rows as i64).map(|i| (i * stride) as i32).collect();
    keys.shuffle(rng);
    Ok(entries_from_keys(keys))
}

fn generate_queries(
    count: usize,
    span: Range<i64>,
    selectivity: f64,
    rng: &mut ChaCha8Rng,
) -> Vec<Range<i64>> {
    let total = span.end - span.start;
    let width = ((total as f64 * selectivity).round() as i64).clamp(0, total);
    (0..count)
        .map(|_| {
            let start = rng.gen_range(span.start..=span.end - width);
            start..start + width
        })
        .collect()
}

#[derive(Default)]
struct QueryRun {
    time_ms: f64,
    matches: usize,
    failures: usize,
    /// Dispatches that overflowed the configured capacity.
    overflowed: usize,
    /// Rows recovered from overflowed dispatches.
    recovered: usize,
}

fn run_queries(
    index: &RangeIndex,
    entries: &[Entry],
    queries: &[Range<i64>],
    batch: usize,
    validate: bool,
) -> Result<QueryRun, IndexError> {
    let mut run = QueryRun::default();

    for chunk in queries.chunks(batch.max(1)) {
        let t0 = Instant::now();
        let outcome = if chunk.len() == 1 {
            index.query(chunk[0].clone()).map(|rows| vec![rows])
        } else {
            index.query_batch(chunk)
        };
        run.time_ms += t0.elapsed().as_secs_f64() * 1000.0;

        let results = match outcome {
            Ok(results) => results,
            Err(IndexError::Overflow(overflow)) => {
                run.overflowed += 1;
                run.recovered += overflow.partial.iter().map(ResultSet::len).sum::<usize>();
                continue;
            }
            Err(e) => return Err(e),
        };

        for (keys, rows) in chunk.iter().zip(&results) {
            run.matches += rows.len();
            if validate {
                let report = validation::check(entries, keys.clone(), rows);
                if !report.is_ok() {
                    eprintln!("WARNING: {}", report);
                    run.failures += 1;
                }
            }
        }
    }

    Ok(run)
}

fn run(args: &Args) -> Result<bool, Box<dyn std::error::Error>> {
    println!("raster-index Benchmark");
    println!("======================\n");

    println!("Configuration:");
    println!("  rows        = {}", human(args.rows));
    println!("  queries     = {}", human(args.queries));
    println!("  selectivity = {}", args.selectivity);
    println!("  stride      = {}", args.stride);
    println!("  width       = {}", args.width);
    println!("  seed        = {}", args.seed);
    if args.batch > 1 {
        println!("  batch       = {}", args.batch);
    }
    if let Some(capacity) = args.capacity {
        println!("  capacity    = {}", human(capacity));
    }
    #[cfg(feature = "timing")]
    println!("  timing      = enabled (RUST_LOG=raster_index::timing=debug)");

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let t_gen = Instant::now();
    let entries = generate_entries(args.rows, args.stride, &mut rng)?;
    println!("\nData generation: {:.1}ms", t_gen.elapsed().as_secs_f64() * 1000.0);

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
    println!(
        "Build:           {:.1}ms ({} slots, {} x {} grid, {} on {} threads)",
        build_ms,
        human(index.table_len()),
        index.geometry().width(),
        index.geometry().height(),
        index.engine().name(),
        index.engine().threads()
    );

    let queries = generate_queries(
        args.queries,
        index.min_key()..index.max_key() + 1,
        args.selectivity,
        &mut rng,
    );

    let result = run_queries(&index, &entries, &queries, args.batch, args.validate)?;
    let cells: usize = queries.iter().map(|q| (q.end - q.start) as usize).sum();

    println!("\nResults:");
    println!("  query time  = {:>10.1}ms", result.time_ms);
    println!("  throughput  = {:>10}", per_second(queries.len(), result.time_ms));
    println!("  cells       = {:>10}", per_second(cells, result.time_ms));
    println!(
        "  avg matches = {:>10.1}",
        result.matches as f64 / queries.len().max(1) as f64
    );
    if result.overflowed > 0 {
        println!(
            "  overflowed  = {:>10} dispatches ({} rows recovered)",
            result.overflowed, result.recovered
        );
    }
    if args.validate {
        println!(
            "  validation  = {}/{} queries exact",
            queries.len() - result.failures,
            queries.len()
        );
    }

    Ok(result.failures == 0 && result.overflowed == 0)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if !(0.0..=1.0).contains(&args.selectivity) {
        eprintln!("error: selectivity must be in [0, 1]");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
