//! Event logging for simulation auditing.
//!
//! This module defines the Event enum which captures all significant state
//! changes during a run. Events enable:
//! - Debugging (understand what happened and when)
//! - Auditing (verify mass accounting across facilities)
//! - Surfacing reportable-but-non-fatal conditions (recipe mismatches,
//!   unmet commitments) without halting the simulation
//!
//! # Event Types
//!
//! Events are categorized by simulation phase:
//! - **Tick**: request/offer announcements
//! - **Resolution**: commitments created by the market resolver
//! - **Tock**: shipments, production steps, maturation
//! - **Reportable conditions**: recipe mismatch, manifest mismatch,
//!   unmet commitment
//!
//! All events carry the simulated month and, where one exists, the offending
//! facility id.

/// Simulation event capturing a state change.
///
/// Events are logged in the order they occur within a month.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Facility announced demand during Tick
    RequestIssued {
        month: u32,
        facility_id: String,
        commodity: String,
        mass: f64,
    },

    /// Facility announced supply during Tick
    OfferIssued {
        month: u32,
        facility_id: String,
        commodity: String,
        mass: f64,
    },

    /// Market resolver committed a transaction
    CommitmentCreated {
        month: u32,
        tx_id: String,
        commodity: String,
        mass: f64,
        supplier_id: String,
        receiver_id: String,
    },

    /// Supplier shipped material against a committed transaction
    ShipmentSent {
        month: u32,
        tx_id: String,
        facility_id: String,
        mass: f64,
    },

    /// Receiver accepted delivered material into stocks
    ShipmentReceived {
        month: u32,
        tx_id: String,
        facility_id: String,
        mass: f64,
    },

    /// Inventory could not cover a committed transaction; the supplier
    /// shipped what it had and reports the shortfall
    UnmetCommitment {
        month: u32,
        tx_id: String,
        facility_id: String,
        shortfall: f64,
    },

    /// A delivered batch did not match the expected recipe and was rejected
    RecipeMismatch {
        month: u32,
        tx_id: String,
        facility_id: String,
        expected: String,
        delivered: String,
        mass: f64,
    },

    /// Manifest total did not account for the committed mass
    ManifestMismatch {
        month: u32,
        tx_id: String,
        facility_id: String,
        expected_mass: f64,
        delivered_mass: f64,
    },

    /// Converter moved stock mass into its in-process queue
    ProcessingStarted {
        month: u32,
        facility_id: String,
        mass: f64,
    },

    /// Material became shippable: converter output emitted, or aged storage
    /// stock moved into inventory
    MaterialMatured {
        month: u32,
        facility_id: String,
        mass: f64,
    },
}

impl Event {
    /// Month the event occurred
    pub fn month(&self) -> u32 {
        match self {
            Event::RequestIssued { month, .. }
            | Event::OfferIssued { month, .. }
            | Event::CommitmentCreated { month, .. }
            | Event::ShipmentSent { month, .. }
            | Event::ShipmentReceived { month, .. }
            | Event::UnmetCommitment { month, .. }
            | Event::RecipeMismatch { month, .. }
            | Event::ManifestMismatch { month, .. }
            | Event::ProcessingStarted { month, .. }
            | Event::MaterialMatured { month, .. } => *month,
        }
    }

    /// Event type name for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::RequestIssued { .. } => "RequestIssued",
            Event::OfferIssued { .. } => "OfferIssued",
            Event::CommitmentCreated { .. } => "CommitmentCreated",
            Event::ShipmentSent { .. } => "ShipmentSent",
            Event::ShipmentReceived { .. } => "ShipmentReceived",
            Event::UnmetCommitment { .. } => "UnmetCommitment",
            Event::RecipeMismatch { .. } => "RecipeMismatch",
            Event::ManifestMismatch { .. } => "ManifestMismatch",
            Event::ProcessingStarted { .. } => "ProcessingStarted",
            Event::MaterialMatured { .. } => "MaterialMatured",
        }
    }

    /// Facility the event concerns, if any
    pub fn facility_id(&self) -> Option<&str> {
        match self {
            Event::RequestIssued { facility_id, .. }
            | Event::OfferIssued { facility_id, .. }
            | Event::ShipmentSent { facility_id, .. }
            | Event::ShipmentReceived { facility_id, .. }
            | Event::UnmetCommitment { facility_id, .. }
            | Event::RecipeMismatch { facility_id, .. }
            | Event::ManifestMismatch { facility_id, .. }
            | Event::ProcessingStarted { facility_id, .. }
            | Event::MaterialMatured { facility_id, .. } => Some(facility_id),
            Event::CommitmentCreated { .. } => None,
        }
    }

    /// Transaction the event concerns, if any
    pub fn tx_id(&self) -> Option<&str> {
        match self {
            Event::CommitmentCreated { tx_id, .. }
            | Event::ShipmentSent { tx_id, .. }
            | Event::ShipmentReceived { tx_id, .. }
            | Event::UnmetCommitment { tx_id, .. }
            | Event::RecipeMismatch { tx_id, .. }
            | Event::ManifestMismatch { tx_id, .. } => Some(tx_id),
            _ => None,
        }
    }
}

/// Append-only log of simulation events
///
/// # Example
///
/// ```rust
/// use material_sim_core::{Event, EventLog};
///
/// let mut log = EventLog::new();
/// log.log(Event::RequestIssued {
///     month: 0,
///     facility_id: "reactor".to_string(),
///     commodity: "fresh_fuel".to_string(),
///     mass: 10.0,
/// });
/// assert_eq!(log.len(), 1);
/// assert_eq!(log.events_at_month(0).len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events, in log order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events logged at a specific month
    pub fn events_at_month(&self, month: u32) -> Vec<&Event> {
        self.events.iter().filter(|e| e.month() == month).collect()
    }

    /// Events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Events concerning a specific facility
    pub fn events_for_facility(&self, facility_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.facility_id() == Some(facility_id))
            .collect()
    }

    /// Events concerning a specific transaction
    pub fn events_for_tx(&self, tx_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.tx_id() == Some(tx_id))
            .collect()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
