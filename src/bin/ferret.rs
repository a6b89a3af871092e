//! Ferret CLI binary.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use ferret::cli::args::*;
use ferret::cli::commands::*;

#[tokio::main]
async fn main() {
    // Parse command line arguments using clap
    let args = FerretArgs::parse();

    let log_level = match args.verbosity() {
        0 => LevelFilter::Error, // Quiet mode
        1 => LevelFilter::Warn,  // Default
        2 => LevelFilter::Info,  // Verbose
        _ => LevelFilter::Debug, // Very verbose (3+)
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = execute_command(args, &mut out).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
