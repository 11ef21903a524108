//! Simulation engine - tick/tock scheduler
//!
//! Main simulation loop integrating all components:
//! - Tick phase (capacity/demand announcements from every facility)
//! - Hierarchy routing (requests and offers relayed to the market root)
//! - Market resolution (requests × offers → committed transactions)
//! - Commitment delivery (router inboxes → supplier order queues)
//! - Tock phase (order execution, shipments, production steps)
//! - Event logging (reportable conditions and the month's activity)
//!
//! # Architecture
//!
//! `step_month()` runs one simulated month under a strict phase barrier:
//!
//! ```text
//! For each month m:
//! 1. Tick every operational facility (announce-only; Dormant skipped)
//! 2. Route announcements up the hierarchy to the market root
//! 3. Resolve requests against offers into committed transactions
//! 4. Route commitments down into supplier order queues
//! 5. Tock every operational facility (orders, production, maturation)
//! 6. Deliver shipments to receivers as they are produced
//! 7. Advance the clock
//! ```
//!
//! Every facility ticks before any facility tocks, and facilities run in
//! registration order within each phase, so a run is deterministic for a
//! given configuration.
//!
//! # Example
//!
//! ```rust,ignore
//! use material_sim_core::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::from_json(&scenario_json)?;
//! let mut sim = Simulation::new(config)?;
//!
//! for _ in 0..12 {
//!     let result = sim.step_month()?;
//!     println!("month {}: {} commitments, {} kg shipped",
//!              result.month, result.num_commitments, result.shipped_mass);
//! }
//! ```

use crate::core::time::SimClock;
use crate::facility::{
    ConfigError, Converter, Facility, FacilityError, FacilityPhase, Storage,
};
use crate::market::{CommodityBid, FifoMatcher, MarketResolver};
use crate::models::event::{Event, EventLog};
use crate::models::material::{Material, MASS_EPSILON};
use crate::models::message::{Message, MessagePayload};
use crate::models::transaction::Transaction;
use crate::routing::{MessageRouter, RoutingError};
use crate::scheduler::config::{FacilityPolicyConfig, SimulationConfig};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Simulation error types
///
/// Recoverable conditions (empty stocks, full inventory, unmatched requests,
/// recipe mismatches, unmet commitments) never surface here; they are normal
/// control flow or logged events. Errors mean the run cannot start or an
/// internal invariant broke.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration validation error
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Facility construction error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Routing table or relay error
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// Fatal facility invariant breach (simulation halts)
    #[error(transparent)]
    Facility(#[from] FacilityError),

    /// A transaction names a facility the simulation does not know
    #[error("facility not found: {0}")]
    FacilityNotFound(String),
}

/// Result of a single simulated month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthResult {
    /// Month that was simulated
    pub month: u32,

    /// Requests announced during the Tick phase
    pub num_requests: usize,

    /// Offers announced during the Tick phase
    pub num_offers: usize,

    /// Transactions committed by the market resolver
    pub num_commitments: usize,

    /// Facilities outside their operational window this month
    pub num_dormant: usize,

    /// Total mass shipped between facilities during the Tock phase
    pub shipped_mass: f64,

    /// Total committed mass suppliers could not cover
    pub shortfall_mass: f64,
}

/// Main engine owning the clock, the facilities, the hierarchy router, the
/// market resolver and the event log
///
/// Facilities are driven in registration order; the engine provides the
/// strict barrier between the Tick and Tock phases. All state lives here:
/// the engine is created at run start and dropped at run end.
pub struct Simulation {
    clock: SimClock,
    facilities: Vec<Box<dyn Facility>>,
    index: HashMap<String, usize>,
    router: MessageRouter,
    resolver: Box<dyn MarketResolver>,
    event_log: EventLog,
    months: u32,
}

impl Simulation {
    /// Build a simulation with the reference FIFO market matcher
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        Self::with_resolver(config, Box::new(FifoMatcher))
    }

    /// Build a simulation with a caller-supplied market resolver
    pub fn with_resolver(
        config: SimulationConfig,
        resolver: Box<dyn MarketResolver>,
    ) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;

        let mut router = MessageRouter::new(config.market.clone());
        for (child, parent) in &config.hierarchy {
            router.add_node(child.clone(), parent.clone());
        }

        let mut facilities: Vec<Box<dyn Facility>> = Vec::with_capacity(config.facilities.len());
        let mut index = HashMap::new();
        let mut seeds: Vec<(usize, Vec<Material>)> = Vec::new();

        for fc in config.facilities {
            router.register_facility(fc.id.clone(), fc.parent.clone());

            let facility: Box<dyn Facility> = match fc.policy {
                FacilityPolicyConfig::Converter(spec) => {
                    Box::new(Converter::new(fc.id.clone(), fc.window, spec)?)
                }
                FacilityPolicyConfig::Storage(spec) => {
                    Box::new(Storage::new(fc.id.clone(), fc.window, spec)?)
                }
            };

            index.insert(fc.id.clone(), facilities.len());
            if !fc.initial_stocks.is_empty() {
                seeds.push((facilities.len(), fc.initial_stocks));
            }
            facilities.push(facility);
        }

        router.validate()?;

        let mut sim = Self {
            clock: SimClock::new(),
            facilities,
            index,
            router,
            resolver,
            event_log: EventLog::new(),
            months: config.months,
        };

        for (idx, batches) in seeds {
            for material in batches {
                let id = sim.facilities[idx].id().to_string();
                sim.inject_material(&id, material)?;
            }
        }
        sim.event_log.clear();

        Ok(sim)
    }

    /// Validate configuration
    fn validate_config(config: &SimulationConfig) -> Result<(), SimulationError> {
        if config.months == 0 {
            return Err(SimulationError::InvalidConfig(
                "months must be > 0".to_string(),
            ));
        }
        if config.facilities.is_empty() {
            return Err(SimulationError::InvalidConfig(
                "must have at least one facility".to_string(),
            ));
        }

        let mut nodes: HashSet<&str> = HashSet::new();
        for (child, parent) in &config.hierarchy {
            nodes.insert(child.as_str());
            nodes.insert(parent.as_str());
        }

        let mut ids = HashSet::new();
        for fc in &config.facilities {
            if !ids.insert(fc.id.as_str()) {
                return Err(SimulationError::InvalidConfig(format!(
                    "duplicate facility id: {}",
                    fc.id
                )));
            }
            if fc.id == config.market {
                return Err(SimulationError::InvalidConfig(format!(
                    "facility id '{}' collides with the market root",
                    fc.id
                )));
            }
            if nodes.contains(fc.id.as_str()) {
                return Err(SimulationError::InvalidConfig(format!(
                    "facility id '{}' collides with a hierarchy node",
                    fc.id
                )));
            }

            // Seed batches must match the recipe the facility accepts;
            // rejecting them at receive time would silently destroy the mass
            let expected = match &fc.policy {
                FacilityPolicyConfig::Converter(spec) => &spec.in_recipe,
                FacilityPolicyConfig::Storage(spec) => &spec.recipe,
            };
            for batch in &fc.initial_stocks {
                if !batch.recipe().matches(expected) {
                    return Err(SimulationError::InvalidConfig(format!(
                        "facility '{}': initial stock recipe '{}' does not match \
                         expected recipe '{}'",
                        fc.id,
                        batch.recipe().name(),
                        expected.name()
                    )));
                }
            }
        }

        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current simulated month
    pub fn current_month(&self) -> u32 {
        self.clock.current_month()
    }

    /// Configured run length in months
    pub fn months(&self) -> u32 {
        self.months
    }

    /// Number of registered facilities
    pub fn num_facilities(&self) -> usize {
        self.facilities.len()
    }

    /// Look up a facility by id
    pub fn facility(&self, id: &str) -> Option<&dyn Facility> {
        self.index.get(id).map(|&i| self.facilities[i].as_ref())
    }

    /// Reference to the event log
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    // ========================================================================
    // Month loop
    // ========================================================================

    /// Execute one simulated month under the tick/tock phase barrier
    pub fn step_month(&mut self) -> Result<MonthResult, SimulationError> {
        let month = self.clock.current_month();
        tracing::debug!(month, "tick phase");

        // STEP 1+2: TICK PHASE
        // Every operational facility announces before anything executes.
        let mut requests = Vec::new();
        let mut offers = Vec::new();
        let mut num_dormant = 0;

        for facility in &mut self.facilities {
            if facility.phase(month) == FacilityPhase::Dormant {
                num_dormant += 1;
                continue;
            }
            for msg in facility.handle_tick(month) {
                // Hierarchy relay: metadata-only, payload untouched
                self.router.route_up(&msg)?;

                let origin = msg.origin().to_string();
                match msg.into_payload() {
                    MessagePayload::Request { commodity, mass } => {
                        self.event_log.log(Event::RequestIssued {
                            month,
                            facility_id: origin.clone(),
                            commodity: commodity.name().to_string(),
                            mass,
                        });
                        requests.push(CommodityBid {
                            facility_id: origin,
                            commodity,
                            mass,
                        });
                    }
                    MessagePayload::Offer { commodity, mass } => {
                        self.event_log.log(Event::OfferIssued {
                            month,
                            facility_id: origin.clone(),
                            commodity: commodity.name().to_string(),
                            mass,
                        });
                        offers.push(CommodityBid {
                            facility_id: origin,
                            commodity,
                            mass,
                        });
                    }
                    MessagePayload::Commitment(_) => {
                        // Facilities never emit commitments at Tick
                    }
                }
            }
        }

        let num_requests = requests.len();
        let num_offers = offers.len();

        // STEP 3: MARKET RESOLUTION
        let commitments = self.resolver.resolve(month, &requests, &offers);
        let num_commitments = commitments.len();
        tracing::debug!(month, num_requests, num_offers, num_commitments, "resolved");

        // STEP 4: COMMITMENT DELIVERY (down the hierarchy, FIFO per facility)
        let root = self.router.root().to_string();
        for transaction in commitments {
            self.event_log.log(Event::CommitmentCreated {
                month,
                tx_id: transaction.id().to_string(),
                commodity: transaction.commodity().name().to_string(),
                mass: transaction.mass(),
                supplier_id: transaction.supplier_id().to_string(),
                receiver_id: transaction.receiver_id().to_string(),
            });
            self.router
                .route_down(Message::commitment(root.clone(), transaction))?;
        }

        let mut shipped_mass = 0.0;
        let mut shortfall_mass = 0.0;

        for i in 0..self.facilities.len() {
            let id = self.facilities[i].id().to_string();
            let orders = self.router.take_inbox(&id)?;
            if orders.is_empty() {
                continue;
            }
            // A dormant supplier will never tock this month; queueing the
            // order would let it linger past its execution step. Report the
            // whole commitment as unmet instead.
            if self.facilities[i].phase(month) == FacilityPhase::Dormant {
                for order in orders {
                    shortfall_mass += order.mass();
                    tracing::warn!(
                        month,
                        facility = %id,
                        tx = %order.id(),
                        shortfall = order.mass(),
                        "commitment to dormant supplier"
                    );
                    self.event_log.log(Event::UnmetCommitment {
                        month,
                        tx_id: order.id().to_string(),
                        facility_id: id.clone(),
                        shortfall: order.mass(),
                    });
                }
                continue;
            }
            for order in orders {
                self.facilities[i].push_order(order);
            }
        }

        // STEP 5+6: TOCK PHASE
        tracing::debug!(month, "tock phase");

        for i in 0..self.facilities.len() {
            if self.facilities[i].phase(month) == FacilityPhase::Dormant {
                continue;
            }

            let facility_id = self.facilities[i].id().to_string();
            let report = self.facilities[i].handle_tock(month)?;

            if report.processed_mass > MASS_EPSILON {
                self.event_log.log(Event::ProcessingStarted {
                    month,
                    facility_id: facility_id.clone(),
                    mass: report.processed_mass,
                });
            }
            if report.matured_mass > MASS_EPSILON {
                self.event_log.log(Event::MaterialMatured {
                    month,
                    facility_id: facility_id.clone(),
                    mass: report.matured_mass,
                });
            }

            for shipment in report.shipments {
                let shipped: f64 = shipment.manifest.iter().map(Material::mass).sum();
                shipped_mass += shipped;

                self.event_log.log(Event::ShipmentSent {
                    month,
                    tx_id: shipment.transaction.id().to_string(),
                    facility_id: facility_id.clone(),
                    mass: shipped,
                });

                if shipment.shortfall > MASS_EPSILON {
                    shortfall_mass += shipment.shortfall;
                    tracing::warn!(
                        month,
                        facility = %facility_id,
                        tx = %shipment.transaction.id(),
                        shortfall = shipment.shortfall,
                        "unmet commitment"
                    );
                    self.event_log.log(Event::UnmetCommitment {
                        month,
                        tx_id: shipment.transaction.id().to_string(),
                        facility_id: facility_id.clone(),
                        shortfall: shipment.shortfall,
                    });
                }

                if !shipment.manifest.is_empty() {
                    self.deliver_manifest(
                        &shipment.transaction,
                        shipment.manifest,
                        shipment.shortfall,
                    )?;
                }
            }
        }

        // STEP 7: ADVANCE TIME
        self.clock.advance_month();

        Ok(MonthResult {
            month,
            num_requests,
            num_offers,
            num_commitments,
            num_dormant,
            shipped_mass,
            shortfall_mass,
        })
    }

    /// Run the configured number of months
    pub fn run(&mut self) -> Result<Vec<MonthResult>, SimulationError> {
        let mut results = Vec::with_capacity(self.months as usize);
        for _ in 0..self.months {
            results.push(self.step_month()?);
        }
        Ok(results)
    }

    /// Hand material to a facility outside the commitment flow
    ///
    /// Wraps the batch in a synthetic transaction from an `external`
    /// counterpart. Used to seed initial stocks and by tests that model an
    /// upstream source the scenario leaves abstract.
    pub fn inject_material(
        &mut self,
        facility_id: &str,
        material: Material,
    ) -> Result<(), SimulationError> {
        let transaction = Transaction::new(
            material.commodity().clone(),
            material.mass(),
            "external".to_string(),
            facility_id.to_string(),
            self.clock.current_month(),
        );
        self.deliver_manifest(&transaction, vec![material], 0.0)
    }

    /// Deliver a manifest to its receiver, logging what the receiver did
    ///
    /// `shortfall` is the mass already reported missing by the supplier; a
    /// manifest that accounts for neither the committed mass nor the
    /// shortfall is reported as a mismatch.
    fn deliver_manifest(
        &mut self,
        transaction: &Transaction,
        manifest: Vec<Material>,
        shortfall: f64,
    ) -> Result<(), SimulationError> {
        let month = self.clock.current_month();
        let delivered: f64 = manifest.iter().map(Material::mass).sum();
        let receiver_id = transaction.receiver_id().to_string();

        let idx = *self
            .index
            .get(&receiver_id)
            .ok_or_else(|| SimulationError::FacilityNotFound(receiver_id.clone()))?;
        let report = self.facilities[idx].receive_material(transaction, manifest, month)?;

        if report.accepted_mass > MASS_EPSILON {
            self.event_log.log(Event::ShipmentReceived {
                month,
                tx_id: transaction.id().to_string(),
                facility_id: receiver_id.clone(),
                mass: report.accepted_mass,
            });
        }

        for rejected in report.rejected {
            tracing::warn!(
                month,
                facility = %receiver_id,
                expected = %rejected.expected,
                delivered = %rejected.recipe,
                mass = rejected.mass,
                "recipe mismatch"
            );
            self.event_log.log(Event::RecipeMismatch {
                month,
                tx_id: transaction.id().to_string(),
                facility_id: receiver_id.clone(),
                expected: rejected.expected,
                delivered: rejected.recipe,
                mass: rejected.mass,
            });
        }

        if (transaction.mass() - delivered - shortfall).abs() > MASS_EPSILON {
            self.event_log.log(Event::ManifestMismatch {
                month,
                tx_id: transaction.id().to_string(),
                facility_id: receiver_id,
                expected_mass: transaction.mass(),
                delivered_mass: delivered,
            });
        }

        Ok(())
    }
}

// Manual Debug implementation (resolvers don't implement Debug)
impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("current_month", &self.current_month())
            .field("months", &self.months)
            .field("num_facilities", &self.facilities.len())
            .field("event_count", &self.event_log.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::{ConverterSpec, OperationalWindow, StorageSpec};
    use crate::models::commodity::{Commodity, Recipe};
    use crate::scheduler::config::FacilityConfig;

    fn fresh_recipe() -> Recipe {
        Recipe::new("uox_fresh", vec![("u".to_string(), 1.0)]).unwrap()
    }

    fn spent_recipe() -> Recipe {
        Recipe::new("uox_spent", vec![("u".to_string(), 1.0)]).unwrap()
    }

    fn converter_config(id: &str, window: OperationalWindow) -> FacilityConfig {
        FacilityConfig {
            id: id.to_string(),
            parent: "inst_1".to_string(),
            window,
            policy: FacilityPolicyConfig::Converter(ConverterSpec {
                in_commodity: Commodity::new("fresh_fuel"),
                out_commodity: Commodity::new("spent_fuel"),
                in_recipe: fresh_recipe(),
                out_recipe: spent_recipe(),
                capacity: 10.0,
                capacity_factor: 1.0,
                inventory_size: 50.0,
                processing_delay: 1,
            }),
            initial_stocks: Vec::new(),
        }
    }

    fn storage_config(id: &str, window: OperationalWindow) -> FacilityConfig {
        FacilityConfig {
            id: id.to_string(),
            parent: "inst_1".to_string(),
            window,
            policy: FacilityPolicyConfig::Storage(StorageSpec {
                commodity: Commodity::new("spent_fuel"),
                recipe: spent_recipe(),
                capacity: 20.0,
                inventory_size: 100.0,
                residence_time: 2,
            }),
            initial_stocks: Vec::new(),
        }
    }

    fn test_config() -> SimulationConfig {
        let window = OperationalWindow::new("any", 0, 120).unwrap();
        SimulationConfig {
            months: 12,
            market: "market".to_string(),
            hierarchy: vec![
                ("region_a".to_string(), "market".to_string()),
                ("inst_1".to_string(), "region_a".to_string()),
            ],
            facilities: vec![
                converter_config("reactor", window),
                storage_config("pool", window),
            ],
        }
    }

    #[test]
    fn test_simulation_creation() {
        let sim = Simulation::new(test_config()).unwrap();

        assert_eq!(sim.current_month(), 0);
        assert_eq!(sim.num_facilities(), 2);
        assert!(sim.facility("reactor").is_some());
        assert!(sim.facility("pool").is_some());
        assert!(sim.facility("ghost").is_none());
        assert!(sim.event_log().is_empty());
    }

    #[test]
    fn test_validate_config_zero_months() {
        let mut config = test_config();
        config.months = 0;
        assert!(matches!(
            Simulation::new(config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_config_no_facilities() {
        let mut config = test_config();
        config.facilities.clear();
        assert!(matches!(
            Simulation::new(config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_config_duplicate_ids() {
        let mut config = test_config();
        let window = OperationalWindow::new("any", 0, 120).unwrap();
        config.facilities.push(converter_config("reactor", window));
        assert!(matches!(
            Simulation::new(config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_config_id_collides_with_hierarchy_node() {
        let mut config = test_config();
        let window = OperationalWindow::new("any", 0, 120).unwrap();
        config.facilities.push(converter_config("inst_1", window));
        assert!(matches!(
            Simulation::new(config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_seed_with_wrong_recipe_rejected_at_init() {
        let mut config = test_config();
        // The reactor accepts uox_fresh; seed it with spent material
        let bad_seed =
            Material::new(25.0, spent_recipe(), Commodity::new("fresh_fuel")).unwrap();
        config.facilities[0].initial_stocks.push(bad_seed);

        assert!(matches!(
            Simulation::new(config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_config_dangling_parent() {
        let mut config = test_config();
        config.hierarchy.clear(); // inst_1 no longer reaches the market
        assert!(matches!(
            Simulation::new(config),
            Err(SimulationError::Routing(_))
        ));
    }

    #[test]
    fn test_step_month_advances_clock() {
        let mut sim = Simulation::new(test_config()).unwrap();
        let result = sim.step_month().unwrap();

        assert_eq!(result.month, 0);
        assert_eq!(sim.current_month(), 1);
    }

    #[test]
    fn test_empty_system_requests_but_ships_nothing() {
        let mut sim = Simulation::new(test_config()).unwrap();
        let result = sim.step_month().unwrap();

        // Both facilities request intake; nobody has anything to offer
        assert_eq!(result.num_requests, 2);
        assert_eq!(result.num_offers, 0);
        assert_eq!(result.num_commitments, 0);
        assert_eq!(result.shipped_mass, 0.0);
    }

    #[test]
    fn test_material_flows_reactor_to_pool() {
        let mut sim = Simulation::new(test_config()).unwrap();
        let seed = Material::new(10.0, fresh_recipe(), Commodity::new("fresh_fuel")).unwrap();
        sim.inject_material("reactor", seed).unwrap();

        // Month 0: reactor starts processing; month 1: output matures
        sim.step_month().unwrap();
        sim.step_month().unwrap();
        assert_eq!(sim.facility("reactor").unwrap().inventory_mass(), 10.0);

        // Month 2: reactor offers spent fuel, pool requests it, commitment
        // executes the same month
        let result = sim.step_month().unwrap();
        assert_eq!(result.num_commitments, 1);
        assert_eq!(result.shipped_mass, 10.0);
        assert_eq!(sim.facility("reactor").unwrap().inventory_mass(), 0.0);
        assert_eq!(sim.facility("pool").unwrap().stocks_mass(), 10.0);
    }

    #[test]
    fn test_dormant_facility_counted_and_inactive() {
        let mut config = test_config();
        let late = OperationalWindow::new("any", 6, 120).unwrap();
        config.facilities[1] = storage_config("pool", late);

        let mut sim = Simulation::new(config).unwrap();
        let result = sim.step_month().unwrap();

        assert_eq!(result.num_dormant, 1);
        // Only the reactor announced anything
        assert_eq!(result.num_requests, 1);
        assert!(sim.event_log().events_for_facility("pool").is_empty());
    }

    /// Resolver that commits against a fixed supplier at month 0
    struct FixedCommit {
        supplier: &'static str,
        receiver: &'static str,
        mass: f64,
    }

    impl MarketResolver for FixedCommit {
        fn resolve(
            &mut self,
            month: u32,
            _requests: &[CommodityBid],
            _offers: &[CommodityBid],
        ) -> Vec<Transaction> {
            if month != 0 {
                return Vec::new();
            }
            vec![Transaction::new(
                Commodity::new("spent_fuel"),
                self.mass,
                self.supplier.to_string(),
                self.receiver.to_string(),
                month,
            )]
        }
    }

    #[test]
    fn test_order_to_dormant_supplier_reported_not_queued() {
        let mut config = test_config();
        let late = OperationalWindow::new("any", 6, 120).unwrap();
        config.facilities[1] = storage_config("pool", late);

        let resolver = FixedCommit {
            supplier: "pool",
            receiver: "reactor",
            mass: 5.0,
        };
        let mut sim = Simulation::with_resolver(config, Box::new(resolver)).unwrap();

        let result = sim.step_month().unwrap();
        assert_eq!(result.num_commitments, 1);
        assert!((result.shortfall_mass - 5.0).abs() < 1e-9);
        assert_eq!(result.shipped_mass, 0.0);
        assert_eq!(sim.event_log().events_of_type("UnmetCommitment").len(), 1);

        // The order did not linger; later months ship nothing against it
        let result = sim.step_month().unwrap();
        assert_eq!(result.shipped_mass, 0.0);
        assert_eq!(sim.event_log().events_of_type("UnmetCommitment").len(), 1);
    }

    #[test]
    fn test_run_executes_configured_months() {
        let mut config = test_config();
        config.months = 5;
        let mut sim = Simulation::new(config).unwrap();

        let results = sim.run().unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(sim.current_month(), 5);
    }

    #[test]
    fn test_initial_stocks_seeded_silently() {
        let mut config = test_config();
        let seed = Material::new(15.0, fresh_recipe(), Commodity::new("fresh_fuel")).unwrap();
        config.facilities[0].initial_stocks.push(seed);

        let sim = Simulation::new(config).unwrap();
        assert_eq!(sim.facility("reactor").unwrap().stocks_mass(), 15.0);
        // Seeding happens before the run; the log starts clean
        assert!(sim.event_log().is_empty());
    }
}
