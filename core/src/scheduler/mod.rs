//! Scheduler - tick/tock simulation loop
//!
//! Drives facilities through the monthly two-phase protocol, relays
//! announcements through the hierarchy, resolves the market and delivers
//! shipments.
//!
//! See `engine.rs` for the month loop and `config.rs` for scenario loading.

pub mod config;
pub mod engine;

// Re-export main types for convenience
pub use config::{
    FacilityConfig, FacilityPolicyConfig, ScenarioFile, SimulationConfig,
};
pub use engine::{MonthResult, Simulation, SimulationError};
