//! Message envelopes for hierarchy routing
//!
//! Facilities talk to the market-like resolver only through typed envelopes
//! relayed along the organizational hierarchy. The router reads routing
//! metadata (origin, destination, direction) and never the payload, so the
//! envelope keeps the two strictly separate.
//!
//! Three payloads exist:
//! - **Request**: demand for a commodity up to a mass (Tick phase, upward)
//! - **Offer**: supply of a commodity up to a mass (Tick phase, upward)
//! - **Commitment**: a resolved `Transaction` (return leg, downward)

use crate::models::commodity::Commodity;
use crate::models::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Routing direction along the parent chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Toward the market resolver at the hierarchy root
    Up,
    /// Toward a facility at a leaf
    Down,
}

/// Message payload; never inspected by the router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessagePayload {
    /// Demand for `commodity` up to `mass`
    Request { commodity: Commodity, mass: f64 },

    /// Supply of `commodity` up to `mass`
    Offer { commodity: Commodity, mass: f64 },

    /// A committed transaction, bound for its supplier's order queue
    Commitment(Transaction),
}

/// Routable envelope
///
/// `origin` is the node that emitted the message. `destination` is the final
/// receiver for downward messages; upward messages have no destination (they
/// terminate at the hierarchy root).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    origin: String,
    destination: Option<String>,
    direction: Direction,
    payload: MessagePayload,
}

impl Message {
    /// Build an upward request envelope
    pub fn request(origin: impl Into<String>, commodity: Commodity, mass: f64) -> Self {
        Self {
            origin: origin.into(),
            destination: None,
            direction: Direction::Up,
            payload: MessagePayload::Request { commodity, mass },
        }
    }

    /// Build an upward offer envelope
    pub fn offer(origin: impl Into<String>, commodity: Commodity, mass: f64) -> Self {
        Self {
            origin: origin.into(),
            destination: None,
            direction: Direction::Up,
            payload: MessagePayload::Offer { commodity, mass },
        }
    }

    /// Build a downward commitment envelope addressed to the supplier
    pub fn commitment(origin: impl Into<String>, transaction: Transaction) -> Self {
        let destination = transaction.supplier_id().to_string();
        Self {
            origin: origin.into(),
            destination: Some(destination),
            direction: Direction::Down,
            payload: MessagePayload::Commitment(transaction),
        }
    }

    /// Node that emitted the message
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Final receiver, for downward messages
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Routing direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Message payload
    pub fn payload(&self) -> &MessagePayload {
        &self.payload
    }

    /// Consume the envelope, yielding the payload
    pub fn into_payload(self) -> MessagePayload {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_envelope() {
        let msg = Message::request("reactor", Commodity::new("fresh_fuel"), 10.0);

        assert_eq!(msg.origin(), "reactor");
        assert_eq!(msg.destination(), None);
        assert_eq!(msg.direction(), Direction::Up);
        assert!(matches!(
            msg.payload(),
            MessagePayload::Request { mass, .. } if *mass == 10.0
        ));
    }

    #[test]
    fn test_commitment_addressed_to_supplier() {
        let tx = Transaction::with_id(
            "tx_001",
            Commodity::new("fresh_fuel"),
            10.0,
            "enrichment".to_string(),
            "reactor".to_string(),
            2,
        );
        let msg = Message::commitment("market", tx);

        assert_eq!(msg.origin(), "market");
        assert_eq!(msg.destination(), Some("enrichment"));
        assert_eq!(msg.direction(), Direction::Down);
    }
}
