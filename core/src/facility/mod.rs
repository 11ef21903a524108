//! Facility policies
//!
//! This module defines the flat `Facility` capability interface and the two
//! concrete policies implementing it:
//! - **Converter** (`converter.rs`): consumes an input recipe at a
//!   capacity-bounded rate and emits an output recipe after a fixed
//!   processing delay
//! - **Storage** (`storage.rs`): holds material unmodified until a minimum
//!   residence time elapses, then exposes it for shipment
//!
//! There is no inheritance chain and no runtime plugin loading: the set of
//! policies is closed and selected through `FacilityPolicyConfig` at
//! construction.
//!
//! # Phase machine
//!
//! Each facility cycles `Idle → Ticked → Idle` once per month, with the
//! engine providing the strict barrier between the Tick and Tock phases.
//! Outside its operational window a facility reports `Dormant` and refuses
//! both phases, so dormancy holds even under direct API use.

pub mod converter;
pub mod storage;

use crate::models::material::Material;
use crate::models::message::Message;
use crate::models::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

pub use converter::{Converter, ConverterSpec};
pub use storage::{Storage, StorageSpec};

/// Errors raised while constructing a facility
///
/// All of these are fatal at initialization: the simulation does not start.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("facility '{facility_id}': operational window [{start}, {end}] is empty")]
    EmptyWindow {
        facility_id: String,
        start: u32,
        end: u32,
    },

    #[error("month-of-year {month} out of range 1..=12")]
    MonthOutOfRange { month: u32 },

    #[error("facility '{facility_id}': capacity must be positive, got {capacity}")]
    NonPositiveCapacity { facility_id: String, capacity: f64 },

    #[error("facility '{facility_id}': inventory size must be positive, got {inventory_size}")]
    NonPositiveInventorySize {
        facility_id: String,
        inventory_size: f64,
    },

    #[error("facility '{facility_id}': capacity factor {capacity_factor} outside (0, 1]")]
    InvalidCapacityFactor {
        facility_id: String,
        capacity_factor: f64,
    },
}

/// Fatal runtime errors inside a facility
///
/// A capacity violation means a ledger invariant broke, which indicates a
/// modeling bug; the simulation halts with the offending facility and month.
#[derive(Debug, Error, PartialEq)]
pub enum FacilityError {
    #[error(
        "capacity violation at facility '{facility_id}' month {month}: \
         ledger '{ledger}' holds {held} against capacity {capacity}"
    )]
    CapacityViolation {
        facility_id: String,
        month: u32,
        ledger: String,
        held: f64,
        capacity: f64,
    },
}

/// Concrete policy kind of a facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacilityKind {
    Converter,
    Storage,
}

/// Scheduling phase of a facility for a given month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacilityPhase {
    /// Outside the operational window; no activity permitted
    Dormant,
    /// Awaiting this month's Tick
    Idle,
    /// Ticked; awaiting this month's Tock
    Ticked,
}

/// Months during which a facility is allowed to operate
///
/// Both bounds are inclusive absolute months. Derived once at construction
/// from either absolute months or (year, month) date pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationalWindow {
    start_month: u32,
    end_month: u32,
}

impl OperationalWindow {
    /// Window over inclusive absolute months
    pub fn new(facility_id: &str, start_month: u32, end_month: u32) -> Result<Self, ConfigError> {
        if end_month < start_month {
            return Err(ConfigError::EmptyWindow {
                facility_id: facility_id.to_string(),
                start: start_month,
                end: end_month,
            });
        }
        Ok(Self {
            start_month,
            end_month,
        })
    }

    /// Window from (year, month-of-year) date pairs
    ///
    /// Years count from simulation start; months-of-year are 1-based. The
    /// start date is when operation begins, the end date when the license
    /// expires.
    pub fn from_dates(
        facility_id: &str,
        start_op: (u32, u32),
        license_expiry: (u32, u32),
    ) -> Result<Self, ConfigError> {
        let start = Self::absolute_month(start_op)?;
        let end = Self::absolute_month(license_expiry)?;
        Self::new(facility_id, start, end)
    }

    fn absolute_month((year, month): (u32, u32)) -> Result<u32, ConfigError> {
        if !(1..=crate::core::time::MONTHS_PER_YEAR).contains(&month) {
            return Err(ConfigError::MonthOutOfRange { month });
        }
        Ok(year * crate::core::time::MONTHS_PER_YEAR + (month - 1))
    }

    /// First operational month
    pub fn start_month(&self) -> u32 {
        self.start_month
    }

    /// Last operational month
    pub fn end_month(&self) -> u32 {
        self.end_month
    }

    /// Whether `month` falls inside the window
    pub fn contains(&self, month: u32) -> bool {
        (self.start_month..=self.end_month).contains(&month)
    }
}

/// Material leaving a facility against a committed transaction
///
/// `shortfall` is the committed mass the supplier could not cover; the
/// manifest carries what it could. A non-zero shortfall is the reportable
/// unmet-commitment condition.
#[derive(Debug)]
pub struct Shipment {
    pub transaction: Transaction,
    pub manifest: Vec<Material>,
    pub shortfall: f64,
}

/// What a facility did during its Tock
#[derive(Debug, Default)]
pub struct TockReport {
    /// Outbound shipments, in order-receipt order
    pub shipments: Vec<Shipment>,

    /// Mass moved from stocks into processing this month (converter)
    pub processed_mass: f64,

    /// Mass that became shippable this month (converter output emitted, or
    /// aged storage stock moved to inventory)
    pub matured_mass: f64,
}

/// A delivered batch rejected during receive
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedBatch {
    /// Recipe the facility expected
    pub expected: String,
    /// Recipe the batch actually carried
    pub recipe: String,
    pub mass: f64,
}

/// What a facility did with a delivered manifest
#[derive(Debug, Default)]
pub struct ReceiveReport {
    /// Mass accepted into stocks
    pub accepted_mass: f64,

    /// Batches rejected for recipe mismatch
    pub rejected: Vec<RejectedBatch>,
}

/// Flat capability interface every facility policy implements
///
/// The engine drives `handle_tick` then `handle_tock` exactly once per
/// facility per month, routing the returned messages through the hierarchy
/// and delivering shipments between facilities.
pub trait Facility {
    /// Facility identifier, unique within a simulation
    fn id(&self) -> &str;

    /// Concrete policy kind
    fn kind(&self) -> FacilityKind;

    /// Operational window
    fn window(&self) -> &OperationalWindow;

    /// Scheduling phase for `month`
    fn phase(&self, month: u32) -> FacilityPhase;

    /// Deliver a committed transaction into the order queue
    ///
    /// Called on the supplier between the Tick and Tock phases; orders are
    /// executed in receipt order during the next Tock.
    fn push_order(&mut self, order: Transaction);

    /// Announce this month's demand and supply
    ///
    /// Pure announcement: no ledger is mutated. Idempotent per month; a
    /// repeated call before the Tock is a no-op returning no messages.
    fn handle_tick(&mut self, month: u32) -> Vec<Message>;

    /// Execute committed orders, then run the policy's production step
    fn handle_tock(&mut self, month: u32) -> Result<TockReport, FacilityError>;

    /// Accept delivered material into stocks, validating recipes
    fn receive_material(
        &mut self,
        transaction: &Transaction,
        manifest: Vec<Material>,
        month: u32,
    ) -> Result<ReceiveReport, FacilityError>;

    /// Total mass in the raw/aging stocks ledger
    fn stocks_mass(&self) -> f64;

    /// Total mass in the finished inventory ledger
    fn inventory_mass(&self) -> f64;

    /// Total mass currently undergoing processing
    fn in_process_mass(&self) -> f64 {
        0.0
    }
}

/// Fill committed orders from finished inventory, in receipt order
///
/// Withdrawal is FIFO and may split a batch. An order the inventory cannot
/// cover ships what is available and records the shortfall; execution never
/// fails.
pub(crate) fn fill_orders(
    orders: Vec<Transaction>,
    inventory: &mut crate::models::ledger::Ledger,
) -> Vec<Shipment> {
    orders
        .into_iter()
        .map(|transaction| {
            let manifest = inventory.withdraw(transaction.mass());
            let shipped: f64 = manifest.iter().map(Material::mass).sum();
            let mut shortfall = transaction.mass() - shipped;
            if shortfall <= crate::models::material::MASS_EPSILON {
                shortfall = 0.0;
            }
            Shipment {
                transaction,
                manifest,
                shortfall,
            }
        })
        .collect()
}

/// Promote a ledger capacity breach to the fatal facility-level error
pub(crate) fn capacity_violation(
    facility_id: &str,
    month: u32,
    err: crate::models::ledger::LedgerError,
) -> FacilityError {
    let crate::models::ledger::LedgerError::CapacityExceeded {
        ledger,
        held,
        capacity,
        ..
    } = err;
    FacilityError::CapacityViolation {
        facility_id: facility_id.to_string(),
        month,
        ledger,
        held,
        capacity,
    }
}

/// State shared by every facility policy: identity, operational window,
/// tick/tock phase guard, and the committed-order queue.
#[derive(Debug)]
pub struct FacilityCore {
    id: String,
    window: OperationalWindow,
    ticked: bool,
    orders_waiting: VecDeque<Transaction>,
}

impl FacilityCore {
    pub fn new(id: impl Into<String>, window: OperationalWindow) -> Self {
        Self {
            id: id.into(),
            window,
            ticked: false,
            orders_waiting: VecDeque::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn window(&self) -> &OperationalWindow {
        &self.window
    }

    pub fn phase(&self, month: u32) -> FacilityPhase {
        if !self.window.contains(month) {
            FacilityPhase::Dormant
        } else if self.ticked {
            FacilityPhase::Ticked
        } else {
            FacilityPhase::Idle
        }
    }

    /// Enter the Tick phase; false when dormant or already ticked
    pub fn begin_tick(&mut self, month: u32) -> bool {
        if self.phase(month) != FacilityPhase::Idle {
            return false;
        }
        self.ticked = true;
        true
    }

    /// Enter the Tock phase; false unless a Tick preceded it this month
    pub fn begin_tock(&mut self, month: u32) -> bool {
        if self.phase(month) != FacilityPhase::Ticked {
            return false;
        }
        self.ticked = false;
        true
    }

    /// Queue a committed order for the next Tock
    pub fn push_order(&mut self, order: Transaction) {
        self.orders_waiting.push_back(order);
    }

    /// Take all queued orders, in receipt order
    pub fn drain_orders(&mut self) -> Vec<Transaction> {
        self.orders_waiting.drain(..).collect()
    }

    /// Number of orders awaiting the next Tock
    pub fn orders_waiting(&self) -> usize {
        self.orders_waiting.len()
    }
}
