//! Convert a HYG-style CSV star catalog into the engine's binary cache.
//!
//! Usage:
//!   preprocess_stars <hygdata.csv> <output.bin> [version]
//!
//! The output is the same version-keyed format the engine writes beside
//! its own cache, so a pre-built file can ship with an offline install:
//!
//!   curl -LO https://github.com/astronexus/HYG-Database/raw/main/hyg/CURRENT/hygdata_v41.csv
//!   preprocess_stars hygdata_v41.csv stars.bin hyg-v41

use std::env;
use std::fs::File;
use std::io::Write;
use std::process::ExitCode;

use log::info;
use skydome_core::catalog::StarCatalog;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <hygdata.csv> <output.bin> [version]", args[0]);
        return ExitCode::FAILURE;
    }

    let input_path = &args[1];
    let output_path = &args[2];
    let version = args.get(3).map(String::as_str).unwrap_or("hyg");

    let input = match File::open(input_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("cannot open {input_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let (catalog, stats) = match StarCatalog::from_hyg_csv(input) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("cannot parse {input_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        "{} rows: kept {}, unparseable {}, fainter than naked eye {}",
        stats.rows, stats.kept, stats.skipped_parse, stats.rejected_mag
    );

    // Magnitude histogram, brightest bucket first.
    let mut buckets = [0usize; 8];
    for star in catalog.stars() {
        let bucket = (star.apparent_mag.max(0.0) as usize).min(7);
        buckets[bucket] += 1;
    }
    println!("magnitude distribution:");
    for (mag, count) in buckets.iter().enumerate() {
        if *count > 0 {
            println!("  {mag}-{}: {count} stars", mag + 1);
        }
    }

    let bytes = catalog.to_cache_bytes(version);
    let mut out = match File::create(output_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("cannot create {output_path}: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = out.write_all(&bytes) {
        eprintln!("write failed: {e}");
        return ExitCode::FAILURE;
    }

    println!(
        "wrote {} stars ({:.1} KB, version `{version}`) to {output_path}",
        catalog.len(),
        bytes.len() as f64 / 1024.0
    );
    ExitCode::SUCCESS
}
