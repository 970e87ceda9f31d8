//! Simulation program that estimates how many deals it takes to see every possible hand, uses the [uniqhands::cli] module.

use clap::Parser;

use uniqhands::cli;

/// Entrypoint for the simulation program, which just parses and runs the CLI from the provided arguments.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    cli::Args::parse().run()
}
