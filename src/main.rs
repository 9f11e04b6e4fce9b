//! Entry point: cluster every neighbourhood of the listings table and print
//! the assignments.

use clap::Parser;
use listing_clusters::{fatal_record, report, run_all, Args, CsvListingSource};
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_fatal(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> listing_clusters::Result<()> {
    let start_time = Instant::now();
    let config = args.to_config()?;
    let source = CsvListingSource::open(&config)?;

    let processed = run_all(&source, &config, |result| {
        report::print_neighbourhood(result, config.verbose)
    })?;

    println!("\n=== Pipeline Complete ===");
    println!("Neighbourhoods clustered: {}", processed);
    println!(
        "Total processing time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let _ = simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
}

/// Source and configuration failures are printed as a structured record;
/// anything else with its context chain.
fn report_fatal(err: &anyhow::Error) {
    match fatal_record(err) {
        Some(record) => eprintln!("{}", record),
        None => eprintln!("error: {:#}", err),
    }
}
