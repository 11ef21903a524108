//! Time management for the simulation
//!
//! The simulation operates in discrete monthly steps. Twelve months form a
//! simulated year. This module provides deterministic time advancement.

use serde::{Deserialize, Serialize};

/// Number of months in a simulated year.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Manages simulation time in discrete months
///
/// Months are counted from zero at simulation start. Year and month-of-year
/// accessors are derived, never stored.
///
/// # Example
/// ```
/// use material_sim_core::SimClock;
///
/// let mut clock = SimClock::new();
/// assert_eq!(clock.current_month(), 0);
///
/// clock.advance_month();
/// assert_eq!(clock.current_month(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimClock {
    /// Total months elapsed since simulation start
    current_month: u32,
}

impl SimClock {
    /// Create a new clock at month zero
    pub fn new() -> Self {
        Self { current_month: 0 }
    }

    /// Advance time by one month
    pub fn advance_month(&mut self) {
        self.current_month += 1;
    }

    /// Current absolute month (0-based)
    pub fn current_month(&self) -> u32 {
        self.current_month
    }

    /// Current simulated year (0-based)
    pub fn current_year(&self) -> u32 {
        self.current_month / MONTHS_PER_YEAR
    }

    /// Month within the current year (1-based, 1..=12)
    pub fn month_of_year(&self) -> u32 {
        self.current_month % MONTHS_PER_YEAR + 1
    }
}
