//! Command-line runner for the material-flow simulator
//!
//! Loads a JSON scenario, runs every configured month and prints a
//! per-month summary followed by totals. Log verbosity is controlled
//! through `RUST_LOG` (e.g. `RUST_LOG=material_sim_core=debug`).

use material_sim_core::{Simulation, SimulationConfig};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: material-sim <scenario.json>");
        return ExitCode::from(2);
    };

    match run(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    let config = SimulationConfig::from_json(&json)?;
    let mut sim = Simulation::new(config)?;

    tracing::info!(path, months = sim.months(), "scenario loaded");

    println!("month  requests  offers  commits  dormant   shipped  shortfall");
    let results = sim.run()?;
    for r in &results {
        println!(
            "{:>5}  {:>8}  {:>6}  {:>7}  {:>7}  {:>8.3}  {:>9.3}",
            r.month,
            r.num_requests,
            r.num_offers,
            r.num_commitments,
            r.num_dormant,
            r.shipped_mass,
            r.shortfall_mass,
        );
    }

    let shipped: f64 = results.iter().map(|r| r.shipped_mass).sum();
    let shortfall: f64 = results.iter().map(|r| r.shortfall_mass).sum();
    println!();
    println!("total shipped:   {shipped:.3}");
    println!("total shortfall: {shortfall:.3}");
    println!("events logged:   {}", sim.event_log().len());

    Ok(())
}
