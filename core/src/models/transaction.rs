//! Transaction model
//!
//! A `Transaction` is a committed agreement to move a quantity of a commodity
//! from an offering facility to a receiving facility. Transactions are born
//! during the Tick phase, delivered to the supplier before the following
//! Tock, consumed exactly once during that Tock, and never persist across
//! months.

use crate::models::commodity::Commodity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A committed agreement to move material between two facilities
///
/// # Example
/// ```
/// use material_sim_core::{Commodity, Transaction};
///
/// let tx = Transaction::new(
///     Commodity::new("fresh_fuel"),
///     20.0,
///     "enrichment".to_string(),
///     "reactor".to_string(),
///     3, // issued_month
/// );
/// assert_eq!(tx.mass(), 20.0);
/// assert_eq!(tx.supplier_id(), "enrichment");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier (UUID)
    id: String,

    /// Commodity being moved
    commodity: Commodity,

    /// Committed mass
    mass: f64,

    /// Facility that ships the material
    supplier_id: String,

    /// Facility that receives the material
    receiver_id: String,

    /// Month the commitment was issued
    issued_month: u32,
}

impl Transaction {
    /// Create a transaction with a generated id
    pub fn new(
        commodity: Commodity,
        mass: f64,
        supplier_id: String,
        receiver_id: String,
        issued_month: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            commodity,
            mass,
            supplier_id,
            receiver_id,
            issued_month,
        }
    }

    /// Create a transaction with an explicit id (deterministic tests)
    pub fn with_id(
        id: impl Into<String>,
        commodity: Commodity,
        mass: f64,
        supplier_id: String,
        receiver_id: String,
        issued_month: u32,
    ) -> Self {
        Self {
            id: id.into(),
            commodity,
            mass,
            supplier_id,
            receiver_id,
            issued_month,
        }
    }

    /// Transaction identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Commodity being moved
    pub fn commodity(&self) -> &Commodity {
        &self.commodity
    }

    /// Committed mass
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Facility that ships the material
    pub fn supplier_id(&self) -> &str {
        &self.supplier_id
    }

    /// Facility that receives the material
    pub fn receiver_id(&self) -> &str {
        &self.receiver_id
    }

    /// Month the commitment was issued
    pub fn issued_month(&self) -> u32 {
        self.issued_month
    }
}
