//! Inventory ledger
//!
//! The ordered collection abstraction shared by every facility buffer:
//! stocks, in-process material, and finished inventory are all ledgers.
//! Insertion order is arrival order; withdrawal is FIFO and may split the
//! oldest batch across a partial withdrawal.
//!
//! # Critical Invariants
//!
//! 1. **Capacity**: where a capacity is declared, total mass never exceeds it
//! 2. **Accounting**: `total_mass()` always equals the sum of batch masses
//! 3. **Ownership**: depositing moves the batch in, withdrawing moves it out

use crate::models::material::{Material, MASS_EPSILON};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors that can occur during ledger operations
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error(
        "ledger '{ledger}' over capacity: holds {held}, capacity {capacity}, deposit {deposit}"
    )]
    CapacityExceeded {
        ledger: String,
        held: f64,
        capacity: f64,
        deposit: f64,
    },
}

/// Ordered FIFO collection of material batches
///
/// # Example
/// ```
/// use material_sim_core::{Commodity, Ledger, Material, Recipe};
///
/// let recipe = Recipe::new("uox", vec![("u".to_string(), 1.0)]).unwrap();
/// let mut inventory = Ledger::with_capacity("inventory", 100.0);
///
/// let batch = Material::new(40.0, recipe, Commodity::new("fuel")).unwrap();
/// inventory.deposit(batch).unwrap();
/// assert_eq!(inventory.total_mass(), 40.0);
/// assert_eq!(inventory.headroom(), 60.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    /// Ledger name, used in capacity diagnostics ("stocks", "inventory", ...)
    name: String,

    /// Batches in arrival order; front is oldest
    items: VecDeque<Material>,

    /// Maximum total mass, if declared
    capacity: Option<f64>,
}

impl Ledger {
    /// Create an uncapped ledger
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: VecDeque::new(),
            capacity: None,
        }
    }

    /// Create a ledger with a declared capacity
    pub fn with_capacity(name: impl Into<String>, capacity: f64) -> Self {
        Self {
            name: name.into(),
            items: VecDeque::new(),
            capacity: Some(capacity),
        }
    }

    /// Ledger name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared capacity, if any
    pub fn capacity(&self) -> Option<f64> {
        self.capacity
    }

    /// Number of batches held
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the ledger holds no batches
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all batch masses
    pub fn total_mass(&self) -> f64 {
        self.items.iter().map(Material::mass).sum()
    }

    /// Remaining mass before the capacity is reached
    ///
    /// Infinite for uncapped ledgers, never negative.
    pub fn headroom(&self) -> f64 {
        match self.capacity {
            Some(capacity) => (capacity - self.total_mass()).max(0.0),
            None => f64::INFINITY,
        }
    }

    /// Oldest batch, if any
    pub fn front(&self) -> Option<&Material> {
        self.items.front()
    }

    /// Iterate batches in arrival order
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.items.iter()
    }

    /// Append a batch, enforcing the capacity invariant
    ///
    /// Batches of effectively zero mass are dropped rather than stored.
    pub fn deposit(&mut self, material: Material) -> Result<(), LedgerError> {
        if material.is_depleted() {
            return Ok(());
        }

        if let Some(capacity) = self.capacity {
            let held = self.total_mass();
            if held + material.mass() > capacity + MASS_EPSILON {
                return Err(LedgerError::CapacityExceeded {
                    ledger: self.name.clone(),
                    held,
                    capacity,
                    deposit: material.mass(),
                });
            }
        }

        self.items.push_back(material);
        Ok(())
    }

    /// Remove and return the oldest batch
    pub fn pop_front(&mut self) -> Option<Material> {
        self.items.pop_front()
    }

    /// Withdraw up to `mass`, oldest batches first
    ///
    /// Whole batches are taken while they fit; the final batch is split if
    /// only part of it is needed. Returns the withdrawn batches; their total
    /// mass is `min(mass, total_mass())`.
    pub fn withdraw(&mut self, mass: f64) -> Vec<Material> {
        let mut taken = Vec::new();
        let mut remaining = mass;

        while remaining > MASS_EPSILON {
            let front_mass = match self.items.front() {
                Some(front) => front.mass(),
                None => break,
            };

            if front_mass <= remaining + MASS_EPSILON {
                // Whole batch fits
                if let Some(batch) = self.items.pop_front() {
                    remaining -= batch.mass();
                    taken.push(batch);
                }
            } else {
                // Partial withdrawal splits the oldest batch
                if let Some(front) = self.items.front_mut() {
                    if let Ok(part) = front.split(remaining) {
                        taken.push(part);
                    }
                }
                break;
            }
        }

        taken
    }
}
