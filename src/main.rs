//! CLI entry point for autogodoc.
//!
//! Parses arguments, sets up logging, resolves the root directory and hands
//! off to the command modules. Errors are printed to stderr with exit code 1.

use anyhow::Context;
use autogodoc::cli::{Cli, Commands};
use autogodoc::commands::{run_check, run_fix};
use clap::Parser;
use std::env;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Determine root directory
    let root = match cli.root {
        Some(root) => root,
        None => env::current_dir().context("Failed to get current directory")?,
    };

    match cli.command {
        Commands::Fix(args) => run_fix(&args, &root),
        Commands::Check(args) => run_check(&args, &root),
    }
}
