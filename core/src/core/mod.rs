//! Simulation clock primitives

pub mod time;

pub use time::{SimClock, MONTHS_PER_YEAR};
