//! Converter policy (reactor-like)
//!
//! Consumes input-recipe material from stocks at a capacity-bounded rate and
//! emits output-recipe material into inventory after a fixed processing
//! delay. In-flight mass is tracked as an explicit timestamped queue of
//! `(entry_month, mass)` lots, so multi-month processing is reproducible.
//!
//! # Behavior
//!
//! - **Tick**: requests input commodity up to `effective_capacity − stocks`,
//!   offers whatever finished mass sits in inventory. Announce-only.
//! - **Tock**: fills committed orders from inventory (FIFO), starts
//!   processing up to the effective monthly capacity, then emits lots whose
//!   delay has elapsed.
//! - **Backpressure**: intake is bounded by
//!   `inventory_size − inventory − in-process`, so matured output always
//!   fits and the inventory cap cannot be violated by maturation.
//! - **Recipe validation**: delivered batches that do not match the input
//!   recipe are rejected and reported; the rest of the manifest is accepted.

use super::{
    capacity_violation, fill_orders, ConfigError, Facility, FacilityCore, FacilityError,
    FacilityKind, FacilityPhase, OperationalWindow, ReceiveReport, RejectedBatch, TockReport,
};
use crate::models::commodity::{Commodity, Recipe};
use crate::models::ledger::Ledger;
use crate::models::material::{Material, MASS_EPSILON};
use crate::models::message::Message;
use crate::models::transaction::Transaction;
use std::collections::VecDeque;

/// Converter parameters, fixed at construction
#[derive(Debug, Clone)]
pub struct ConverterSpec {
    /// Commodity requested for intake
    pub in_commodity: Commodity,

    /// Commodity offered from inventory
    pub out_commodity: Commodity,

    /// Recipe delivered material must match
    pub in_recipe: Recipe,

    /// Recipe of emitted material
    pub out_recipe: Recipe,

    /// Maximum intake mass per month
    pub capacity: f64,

    /// Fraction of time the facility runs at full capacity, in (0, 1]
    pub capacity_factor: f64,

    /// Maximum mass the finished inventory may hold
    pub inventory_size: f64,

    /// Months between intake and output appearing in inventory
    pub processing_delay: u32,
}

/// An in-flight lot: mass that entered processing at a known month
#[derive(Debug, Clone, Copy, PartialEq)]
struct ProcessLot {
    entered: u32,
    mass: f64,
}

/// Capacity-limited conversion facility
///
/// # Example
/// ```
/// use material_sim_core::{Commodity, Converter, ConverterSpec, OperationalWindow, Recipe};
///
/// let spec = ConverterSpec {
///     in_commodity: Commodity::new("fresh_fuel"),
///     out_commodity: Commodity::new("spent_fuel"),
///     in_recipe: Recipe::new("uox_fresh", vec![("u".to_string(), 1.0)]).unwrap(),
///     out_recipe: Recipe::new("uox_spent", vec![("u".to_string(), 1.0)]).unwrap(),
///     capacity: 10.0,
///     capacity_factor: 1.0,
///     inventory_size: 50.0,
///     processing_delay: 1,
/// };
/// let window = OperationalWindow::new("reactor", 0, 120).unwrap();
/// let reactor = Converter::new("reactor", window, spec).unwrap();
/// assert_eq!(reactor.effective_capacity(), 10.0);
/// ```
#[derive(Debug)]
pub struct Converter {
    core: FacilityCore,
    spec: ConverterSpec,

    /// Raw material awaiting processing
    stocks: Ledger,

    /// In-flight lots, in entry order; front is oldest
    processing: VecDeque<ProcessLot>,

    /// Finished material available for shipment
    inventory: Ledger,
}

impl Converter {
    /// Construct a converter, validating its parameters
    pub fn new(
        id: impl Into<String>,
        window: OperationalWindow,
        spec: ConverterSpec,
    ) -> Result<Self, ConfigError> {
        let id = id.into();

        if spec.capacity <= 0.0 {
            return Err(ConfigError::NonPositiveCapacity {
                facility_id: id,
                capacity: spec.capacity,
            });
        }
        if spec.inventory_size <= 0.0 {
            return Err(ConfigError::NonPositiveInventorySize {
                facility_id: id,
                inventory_size: spec.inventory_size,
            });
        }
        if spec.capacity_factor <= 0.0 || spec.capacity_factor > 1.0 {
            return Err(ConfigError::InvalidCapacityFactor {
                facility_id: id,
                capacity_factor: spec.capacity_factor,
            });
        }

        let inventory = Ledger::with_capacity("inventory", spec.inventory_size);
        Ok(Self {
            core: FacilityCore::new(id, window),
            spec,
            stocks: Ledger::new("stocks"),
            processing: VecDeque::new(),
            inventory,
        })
    }

    /// Monthly capacity scaled by the capacity factor
    pub fn effective_capacity(&self) -> f64 {
        self.spec.capacity * self.spec.capacity_factor
    }

    /// Room left for new intake given inventory and in-flight commitments
    fn intake_room(&self) -> f64 {
        let committed = self.inventory.total_mass() + self.in_process_mass();
        (self.spec.inventory_size - committed).max(0.0)
    }

    /// Start processing: move stock mass into the in-flight queue
    fn start_processing(&mut self, month: u32) -> f64 {
        let intake = self.effective_capacity().min(self.intake_room());
        if intake <= MASS_EPSILON || self.stocks.is_empty() {
            return 0.0;
        }

        let withdrawn = self.stocks.withdraw(intake);
        let mass: f64 = withdrawn.iter().map(Material::mass).sum();
        if mass > MASS_EPSILON {
            self.processing.push_back(ProcessLot {
                entered: month,
                mass,
            });
        }
        mass
    }

    /// Emit lots whose processing delay has elapsed
    fn emit_matured(&mut self, month: u32) -> Result<f64, FacilityError> {
        let mut matured = 0.0;
        while let Some(&ProcessLot { entered, mass }) = self.processing.front() {
            if month.saturating_sub(entered) < self.spec.processing_delay {
                break;
            }
            self.processing.pop_front();

            // Lot masses come from validated batches, so only a genuine
            // invariant breach can fail here.
            let output = Material::new(
                mass,
                self.spec.out_recipe.clone(),
                self.spec.out_commodity.clone(),
            )
            .map_err(|_| FacilityError::CapacityViolation {
                facility_id: self.core.id().to_string(),
                month,
                ledger: "processing".to_string(),
                held: mass,
                capacity: self.spec.inventory_size,
            })?;

            self.inventory
                .deposit(output)
                .map_err(|e| capacity_violation(self.core.id(), month, e))?;
            matured += mass;
        }
        Ok(matured)
    }
}

impl Facility for Converter {
    fn id(&self) -> &str {
        self.core.id()
    }

    fn kind(&self) -> FacilityKind {
        FacilityKind::Converter
    }

    fn window(&self) -> &OperationalWindow {
        self.core.window()
    }

    fn phase(&self, month: u32) -> FacilityPhase {
        self.core.phase(month)
    }

    fn push_order(&mut self, order: Transaction) {
        self.core.push_order(order);
    }

    fn handle_tick(&mut self, month: u32) -> Vec<Message> {
        if !self.core.begin_tick(month) {
            return Vec::new();
        }

        let mut messages = Vec::new();

        let shortage = self.effective_capacity() - self.stocks.total_mass();
        if shortage > MASS_EPSILON {
            messages.push(Message::request(
                self.core.id(),
                self.spec.in_commodity.clone(),
                shortage,
            ));
        }

        let available = self.inventory.total_mass();
        if available > MASS_EPSILON {
            messages.push(Message::offer(
                self.core.id(),
                self.spec.out_commodity.clone(),
                available,
            ));
        }

        messages
    }

    fn handle_tock(&mut self, month: u32) -> Result<TockReport, FacilityError> {
        if !self.core.begin_tock(month) {
            return Ok(TockReport::default());
        }

        let orders = self.core.drain_orders();
        let shipments = fill_orders(orders, &mut self.inventory);

        let processed_mass = self.start_processing(month);
        let matured_mass = self.emit_matured(month)?;

        Ok(TockReport {
            shipments,
            processed_mass,
            matured_mass,
        })
    }

    fn receive_material(
        &mut self,
        _transaction: &Transaction,
        manifest: Vec<Material>,
        month: u32,
    ) -> Result<ReceiveReport, FacilityError> {
        let mut report = ReceiveReport::default();

        for batch in manifest {
            if batch.recipe().matches(&self.spec.in_recipe) {
                report.accepted_mass += batch.mass();
                self.stocks
                    .deposit(batch)
                    .map_err(|e| capacity_violation(self.core.id(), month, e))?;
            } else {
                report.rejected.push(RejectedBatch {
                    expected: self.spec.in_recipe.name().to_string(),
                    recipe: batch.recipe().name().to_string(),
                    mass: batch.mass(),
                });
            }
        }

        Ok(report)
    }

    fn stocks_mass(&self) -> f64 {
        self.stocks.total_mass()
    }

    fn inventory_mass(&self) -> f64 {
        self.inventory.total_mass()
    }

    fn in_process_mass(&self) -> f64 {
        self.processing.iter().map(|lot| lot.mass).sum()
    }
}
