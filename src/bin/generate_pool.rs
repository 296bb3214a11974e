//! Offline generator for the short code pool file.
//!
//! Synthesizes unique random codes, writes them back-to-back into the pool
//! file and resets the cursor file to `0`. Run it before the first start of
//! the service and whenever the pool runs dry.
//!
//! # Usage
//!
//! ```bash
//! # One million 6-character codes into data/shorturls.dat
//! cargo run --bin generate-pool
//!
//! # Custom size and location
//! cargo run --bin generate-pool -- --count 50000 --output /var/lib/shortener/pool.dat \
//!     --cursor /var/lib/shortener/offset.dat
//!
//! # Compare random generation with the deterministic strategies
//! cargo run --bin generate-pool -- --count 100000 --compare
//! ```
//!
//! Flags fall back to the same environment variables the service reads
//! (`POOL_FILE`, `CURSOR_FILE`, `CODE_LENGTH`, `CODE_ALPHABET`, `BLOOM_BITS`).

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use pooled_shortener::codegen::strategies::{hash_code, sequence_code};
use pooled_shortener::codegen::{
    Alphabet, CodeSpec, DEFAULT_ALPHABET, DEFAULT_CODE_LENGTH, Generator, write_pool_file,
};
use pooled_shortener::logging;

/// Generates the pool of pre-computed short codes.
#[derive(Parser)]
#[command(name = "generate-pool")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of codes to generate
    #[arg(long, default_value_t = 1_000_000)]
    count: usize,

    /// Pool file to write
    #[arg(long, env = "POOL_FILE", default_value = "data/shorturls.dat")]
    output: PathBuf,

    /// Cursor file to reset
    #[arg(long, env = "CURSOR_FILE", default_value = "data/offset.dat")]
    cursor: PathBuf,

    /// Bloom filter size in bits
    #[arg(long, env = "BLOOM_BITS", default_value_t = 10_000_000)]
    bloom: usize,

    /// Characters per code
    #[arg(long, env = "CODE_LENGTH", default_value_t = DEFAULT_CODE_LENGTH)]
    length: usize,

    /// Symbols codes are drawn from
    #[arg(long, env = "CODE_ALPHABET", default_value = DEFAULT_ALPHABET)]
    alphabet: String,

    /// Write whatever was generated when fewer than `count` unique codes fit
    #[arg(long)]
    allow_partial: bool,

    /// Also time the deterministic strategies on the same count and report
    /// how many duplicates each produces
    #[arg(long)]
    compare: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    logging::init_tracing(&log_level, &log_format);

    let alphabet = Alphabet::new(&cli.alphabet).context("Invalid --alphabet")?;
    let spec = CodeSpec::new(cli.length, alphabet).context("Invalid --length")?;

    println!("{}", "Generating short code pool".bright_blue().bold());
    println!();
    println!("  Count:        {}", cli.count.to_string().cyan());
    println!("  Code length:  {}", spec.length().to_string().cyan());
    println!("  Alphabet:     {}", spec.alphabet().len().to_string().cyan());
    println!("  Bloom bits:   {}", cli.bloom.to_string().cyan());
    println!();

    let started = Instant::now();
    let mut generator =
        Generator::new(spec.clone(), cli.bloom).context("Failed to create generator")?;

    let codes = match generator.generate(cli.count) {
        Ok(codes) => codes,
        Err(exhausted) if cli.allow_partial => {
            println!(
                "{}",
                format!("Warning: {exhausted}, writing the partial batch").yellow()
            );
            exhausted.generated
        }
        Err(exhausted) => {
            anyhow::bail!(
                "{exhausted}; enlarge --bloom or --length, or pass --allow-partial"
            );
        }
    };
    let generate_time = started.elapsed();

    let write_started = Instant::now();
    let summary = write_pool_file(&cli.output, &cli.cursor, &codes)
        .context("Failed to write pool file")?;
    let write_time = write_started.elapsed();

    println!("{}", "Summary".bright_white().bold());
    println!("  Generated:    {}", summary.records.to_string().green().bold());
    println!("  Generate:     {:.2?}", generate_time);
    println!("  Throughput:   {} codes/s", rate(summary.records, generate_time).cyan());
    println!("  Write:        {:.2?}", write_time);
    println!(
        "  File size:    {:.2} MB",
        summary.bytes as f64 / 1024.0 / 1024.0
    );
    println!("  Pool file:    {}", cli.output.display().to_string().cyan());
    println!("  Cursor file:  {}", cli.cursor.display().to_string().cyan());
    println!("  Total:        {:.2?}", started.elapsed());
    println!();

    if !codes.is_empty() {
        println!("{}", "First codes".bright_white().bold());
        for (i, code) in codes.iter().take(10).enumerate() {
            println!("  {:>2}: {}", i + 1, code.bright_yellow());
        }
        println!();
    }

    if cli.compare {
        compare_strategies(&spec, codes.len(), generate_time);
    }

    Ok(())
}

/// Times the deterministic strategies over `count` inputs.
fn compare_strategies(spec: &CodeSpec, count: usize, random_time: Duration) {
    println!("{}", "Strategy comparison".bright_white().bold());
    println!(
        "  {:<10} {:>14} {:>12}",
        "Strategy".bright_white().bold(),
        "Codes/s".bright_white().bold(),
        "Duplicates".bright_white().bold()
    );
    println!("  {}", "─".repeat(38).bright_black());
    println!(
        "  {:<10} {:>14} {:>12}",
        "random".cyan(),
        rate(count, random_time),
        0
    );

    let started = Instant::now();
    let hashed: Vec<String> = (0..count)
        .map(|i| hash_code(spec, &format!("https://example.com/page/{i}")))
        .collect();
    report_strategy("hash", &hashed, started.elapsed());

    let started = Instant::now();
    let sequenced: Vec<String> = (0..count as i64).map(|i| sequence_code(spec, i)).collect();
    report_strategy("sequence", &sequenced, started.elapsed());

    println!();
}

fn report_strategy(name: &str, codes: &[String], elapsed: Duration) {
    let unique: HashSet<&String> = codes.iter().collect();
    let duplicates = codes.len() - unique.len();
    let duplicates = if duplicates == 0 {
        duplicates.to_string().green()
    } else {
        duplicates.to_string().red()
    };

    println!(
        "  {:<10} {:>14} {:>12}",
        name.cyan(),
        rate(codes.len(), elapsed),
        duplicates
    );
}

fn rate(count: usize, elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        return "-".to_string();
    }
    format!("{:.0}", count as f64 / secs)
}
