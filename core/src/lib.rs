//! Material Flow Simulator - Rust Engine
//!
//! Discrete-event simulator of industrial facilities exchanging material
//! over a monthly tick/tock protocol.
//!
//! # Architecture
//!
//! - **core**: Monthly simulation clock
//! - **models**: Domain types (Material, Recipe, Ledger, Transaction, Message)
//! - **facility**: Facility policies (Converter, Storage)
//! - **routing**: Hierarchy message relay (facility → institution → region → market)
//! - **market**: Request/offer resolution into committed transactions
//! - **scheduler**: Scenario loading and the month loop
//!
//! # Critical Invariants
//!
//! 1. Mass is conserved: material moves between ledgers, never created or lost
//! 2. Deterministic execution: facilities run in registration order, every
//!    queue is FIFO
//! 3. Tick/tock barrier: every facility announces before any facility executes

// Module declarations
pub mod core;
pub mod facility;
pub mod market;
pub mod models;
pub mod routing;
pub mod scheduler;

// Re-exports for convenience
pub use crate::core::time::{SimClock, MONTHS_PER_YEAR};
pub use facility::{
    ConfigError, Converter, ConverterSpec, Facility, FacilityError, FacilityKind, FacilityPhase,
    OperationalWindow, ReceiveReport, RejectedBatch, Shipment, Storage, StorageSpec, TockReport,
};
pub use market::{CommodityBid, FifoMatcher, MarketResolver};
pub use models::{
    commodity::{Commodity, Recipe, RecipeError},
    event::{Event, EventLog},
    ledger::{Ledger, LedgerError},
    material::{Material, MaterialError, MASS_EPSILON},
    message::{Direction, Message, MessagePayload},
    transaction::Transaction,
};
pub use routing::{MessageRouter, RoutingError};
pub use scheduler::{
    FacilityConfig, FacilityPolicyConfig, MonthResult, ScenarioFile, Simulation, SimulationConfig,
    SimulationError,
};
