//! Pass-through storage policy
//!
//! Holds material unmodified until a minimum residence time elapses, then
//! exposes it for shipment. Incoming batches are timestamped with their
//! arrival month; each Tock moves every batch whose age has reached the
//! residence time from stocks into inventory, subject to the inventory cap
//! and the monthly handling capacity. Batches that cannot move stay in
//! stocks and are retried the following month. Material still aging is not
//! shippable.
//!
//! Entry timestamps live in a deque aligned with the stocks ledger: one
//! entry per batch, in arrival order. A partial move splits the oldest batch
//! and leaves the remainder under its original timestamp.

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

/// Storage parameters, fixed at construction
#[derive(Debug, Clone)]
pub struct StorageSpec {
    /// Single commodity handled, in and out
    pub commodity: Commodity,

    /// Recipe delivered material must match; storage never transforms it
    pub recipe: Recipe,

    /// Maximum mass moved from stocks to inventory per month
    pub capacity: f64,

    /// Maximum mass the finished inventory may hold
    pub inventory_size: f64,

    /// Minimum months a batch rests in stocks before becoming shippable
    pub residence_time: u32,
}

/// Residence-time-gated pass-through facility
///
/// # Example
/// ```
/// use material_sim_core::{Commodity, OperationalWindow, Recipe, Storage, StorageSpec};
///
/// let spec = StorageSpec {
///     commodity: Commodity::new("spent_fuel"),
///     recipe: Recipe::new("uox_spent", vec![("u".to_string(), 1.0)]).unwrap(),
///     capacity: 20.0,
///     inventory_size: 100.0,
///     residence_time: 3,
/// };
/// let window = OperationalWindow::new("pool", 0, 240).unwrap();
/// let pool = Storage::new("pool", window, spec).unwrap();
/// ```
#[derive(Debug)]
pub struct Storage {
    core: FacilityCore,
    spec: StorageSpec,

    /// Aging material, oldest first
    stocks: Ledger,

    /// Arrival month of each stocks batch, aligned with the ledger order
    entry_times: VecDeque<u32>,

    /// Rested material available for shipment
    inventory: Ledger,
}

impl Storage {
    /// Construct a storage facility, validating its parameters
    pub fn new(
        id: impl Into<String>,
        window: OperationalWindow,
        spec: StorageSpec,
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

        let inventory = Ledger::with_capacity("inventory", spec.inventory_size);
        Ok(Self {
            core: FacilityCore::new(id, window),
            spec,
            stocks: Ledger::new("stocks"),
            entry_times: VecDeque::new(),
            inventory,
        })
    }

    /// Move rested batches into inventory, oldest first
    ///
    /// Bounded by the monthly handling capacity and the inventory headroom.
    /// The oldest batch is split when only part of it fits; the remainder
    /// keeps its entry timestamp and is retried next month.
    fn release_rested(&mut self, month: u32) -> Result<f64, FacilityError> {
        let mut budget = self.spec.capacity;
        let mut moved = 0.0;

        while budget > MASS_EPSILON {
            let entered = match self.entry_times.front() {
                Some(&entered) => entered,
                None => break,
            };
            // Entries are in arrival order; once the front is too young,
            // everything behind it is younger still.
            if month.saturating_sub(entered) < self.spec.residence_time {
                break;
            }

            let front_mass = match self.stocks.front() {
                Some(front) => front.mass(),
                None => break,
            };

            let room = self.inventory.headroom().min(budget);
            if room <= MASS_EPSILON {
                break;
            }

            if front_mass <= room + MASS_EPSILON {
                // Whole batch moves; its timestamp retires with it
                if let Some(batch) = self.stocks.pop_front() {
                    self.entry_times.pop_front();
                    let mass = batch.mass();
                    self.inventory
                        .deposit(batch)
                        .map_err(|e| capacity_violation(self.core.id(), month, e))?;
                    moved += mass;
                    budget -= mass;
                }
            } else {
                // Partial move splits the batch; the remainder stays aged
                // and the month's budget is spent either way
                for part in self.stocks.withdraw(room) {
                    moved += part.mass();
                    self.inventory
                        .deposit(part)
                        .map_err(|e| capacity_violation(self.core.id(), month, e))?;
                }
                break;
            }
        }

        Ok(moved)
    }
}

impl Facility for Storage {
    fn id(&self) -> &str {
        self.core.id()
    }

    fn kind(&self) -> FacilityKind {
        FacilityKind::Storage
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

        let shortage = self.spec.capacity - self.stocks.total_mass();
        if shortage > MASS_EPSILON {
            messages.push(Message::request(
                self.core.id(),
                self.spec.commodity.clone(),
                shortage,
            ));
        }

        let available = self.inventory.total_mass();
        if available > MASS_EPSILON {
            messages.push(Message::offer(
                self.core.id(),
                self.spec.commodity.clone(),
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

        let matured_mass = self.release_rested(month)?;

        Ok(TockReport {
            shipments,
            processed_mass: 0.0,
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
            if batch.recipe().matches(&self.spec.recipe) {
                if batch.is_depleted() {
                    continue;
                }
                report.accepted_mass += batch.mass();
                self.stocks
                    .deposit(batch)
                    .map_err(|e| capacity_violation(self.core.id(), month, e))?;
                self.entry_times.push_back(month);
            } else {
                report.rejected.push(RejectedBatch {
                    expected: self.spec.recipe.name().to_string(),
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
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spent_recipe() -> Recipe {
        Recipe::new("uox_spent", vec![("u".to_string(), 1.0)]).unwrap()
    }

    fn test_storage(capacity: f64, inventory_size: f64, residence: u32) -> Storage {
        let spec = StorageSpec {
            commodity: Commodity::new("spent_fuel"),
            recipe: spent_recipe(),
            capacity,
            inventory_size,
            residence_time: residence,
        };
        let window = OperationalWindow::new("pool", 0, 240).unwrap();
        Storage::new("pool", window, spec).unwrap()
    }

    fn deliver(storage: &mut Storage, mass: f64, month: u32) {
        let tx = Transaction::with_id(
            "tx_in",
            Commodity::new("spent_fuel"),
            mass,
            "reactor".to_string(),
            "pool".to_string(),
            month,
        );
        let batch =
            Material::new(mass, spent_recipe(), Commodity::new("spent_fuel")).unwrap();
        storage.receive_material(&tx, vec![batch], month).unwrap();
    }

    fn run_month(storage: &mut Storage, month: u32) -> TockReport {
        storage.handle_tick(month);
        storage.handle_tock(month).unwrap()
    }

    #[test]
    fn test_residence_time_gates_inventory() {
        // Residence 3: a batch received at month 0 is shippable at month 3
        let mut storage = test_storage(20.0, 100.0, 3);
        deliver(&mut storage, 5.0, 0);

        for month in 0..3 {
            run_month(&mut storage, month);
            assert_eq!(storage.inventory_mass(), 0.0, "month {month}");
        }

        let report = run_month(&mut storage, 3);
        assert_eq!(report.matured_mass, 5.0);
        assert_eq!(storage.inventory_mass(), 5.0);
        assert_eq!(storage.stocks_mass(), 0.0);
    }

    #[test]
    fn test_inventory_cap_leaves_pending_remainder() {
        // inventory_size 4 against a 5-unit rested batch
        let mut storage = test_storage(20.0, 4.0, 1);
        deliver(&mut storage, 5.0, 0);

        let report = run_month(&mut storage, 1);
        assert_eq!(report.matured_mass, 4.0);
        assert_eq!(storage.inventory_mass(), 4.0);
        assert_eq!(storage.stocks_mass(), 1.0);

        // No room: the pending unit stays in stocks
        run_month(&mut storage, 2);
        assert_eq!(storage.stocks_mass(), 1.0);

        // Ship the inventory, freeing room for the remainder
        let tx = Transaction::with_id(
            "tx_out",
            Commodity::new("spent_fuel"),
            4.0,
            "pool".to_string(),
            "sink".to_string(),
            3,
        );
        storage.push_order(tx);
        let report = run_month(&mut storage, 3);
        assert_eq!(report.shipments.len(), 1);
        assert_eq!(report.matured_mass, 1.0);
        assert_eq!(storage.inventory_mass(), 1.0);
        assert_eq!(storage.stocks_mass(), 0.0);
    }

    #[test]
    fn test_aging_material_not_shippable() {
        let mut storage = test_storage(20.0, 100.0, 2);
        deliver(&mut storage, 10.0, 0);

        let tx = Transaction::with_id(
            "tx_out",
            Commodity::new("spent_fuel"),
            10.0,
            "pool".to_string(),
            "sink".to_string(),
            0,
        );
        storage.push_order(tx);
        let report = run_month(&mut storage, 0);

        // Everything is still aging; the whole commitment is short
        assert_eq!(report.shipments.len(), 1);
        assert!(report.shipments[0].manifest.is_empty());
        assert_eq!(report.shipments[0].shortfall, 10.0);
        assert_eq!(storage.stocks_mass(), 10.0);
    }

    #[test]
    fn test_monthly_capacity_bounds_release() {
        let mut storage = test_storage(6.0, 100.0, 1);
        deliver(&mut storage, 10.0, 0);

        let report = run_month(&mut storage, 1);
        assert_eq!(report.matured_mass, 6.0);
        assert_eq!(storage.stocks_mass(), 4.0);

        let report = run_month(&mut storage, 2);
        assert_eq!(report.matured_mass, 4.0);
        assert_eq!(storage.stocks_mass(), 0.0);
    }

    #[test]
    fn test_batches_age_independently() {
        let mut storage = test_storage(20.0, 100.0, 2);
        deliver(&mut storage, 3.0, 0);
        run_month(&mut storage, 0);

        deliver(&mut storage, 4.0, 1);
        run_month(&mut storage, 1);

        // Month 2: only the month-0 batch has rested long enough
        let report = run_month(&mut storage, 2);
        assert_eq!(report.matured_mass, 3.0);
        assert_eq!(storage.stocks_mass(), 4.0);

        let report = run_month(&mut storage, 3);
        assert_eq!(report.matured_mass, 4.0);
        assert_eq!(storage.stocks_mass(), 0.0);
    }

    #[test]
    fn test_recipe_mismatch_rejected() {
        let mut storage = test_storage(20.0, 100.0, 1);
        let wrong = Recipe::new("mox", vec![("pu".to_string(), 1.0)]).unwrap();
        let tx = Transaction::with_id(
            "tx_in",
            Commodity::new("spent_fuel"),
            5.0,
            "reactor".to_string(),
            "pool".to_string(),
            0,
        );
        let batch = Material::new(5.0, wrong, Commodity::new("spent_fuel")).unwrap();

        let report = storage.receive_material(&tx, vec![batch], 0).unwrap();
        assert_eq!(report.accepted_mass, 0.0);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(storage.stocks_mass(), 0.0);
    }

    #[test]
    fn test_dormant_storage_does_nothing() {
        let spec = StorageSpec {
            commodity: Commodity::new("spent_fuel"),
            recipe: spent_recipe(),
            capacity: 20.0,
            inventory_size: 100.0,
            residence_time: 1,
        };
        let window = OperationalWindow::new("pool", 10, 20).unwrap();
        let mut storage = Storage::new("pool", window, spec).unwrap();

        assert_eq!(storage.phase(0), FacilityPhase::Dormant);
        assert!(storage.handle_tick(0).is_empty());
        let report = storage.handle_tock(0).unwrap();
        assert_eq!(report.matured_mass, 0.0);
    }

    #[test]
    fn test_entry_times_stay_aligned_after_partial_move() {
        // Two batches; the first moves partially, leaving its remainder
        // aligned with the front timestamp
        let mut storage = test_storage(20.0, 3.0, 1);
        deliver(&mut storage, 5.0, 0);
        run_month(&mut storage, 0);
        deliver(&mut storage, 2.0, 1);

        let report = run_month(&mut storage, 1);
        assert_eq!(report.matured_mass, 3.0);
        assert_eq!(storage.stocks_mass(), 4.0); // 2 left of first batch + 2 second
        assert_eq!(storage.inventory_mass(), 3.0);
    }
}
