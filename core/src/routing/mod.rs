//! Message routing through the organizational hierarchy
//!
//! Facilities never talk to the market resolver directly: every request and
//! offer climbs a fixed parent chain (facility → institution → region →
//! market root) and every commitment descends it back to the supplier. The
//! router is a pure relay — it reads routing metadata (origin, destination,
//! direction) and never the payload.
//!
//! # Guarantees
//!
//! - In-order delivery per sender: each facility's inbox is a FIFO queue
//! - No global ordering across facilities
//! - The routing table is validated once: every registered node must reach
//!   the root, and the chain must be acyclic

use crate::models::message::{Direction, Message, MessagePayload};
use crate::models::transaction::Transaction;
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

/// Errors raised by the router
#[derive(Debug, Error, PartialEq)]
pub enum RoutingError {
    #[error("unknown node '{node}' in routing table")]
    UnknownNode { node: String },

    #[error("node '{node}' has no path to the root")]
    NoPathToRoot { node: String },

    #[error("routing cycle detected at node '{node}'")]
    CycleDetected { node: String },

    #[error("no inbox registered for facility '{facility}'")]
    UnknownFacility { facility: String },

    #[error("downward message from '{origin}' carries no destination")]
    MissingDestination { origin: String },

    #[error("message from '{origin}' routed against its direction")]
    WrongDirection { origin: String },
}

/// Relay of typed envelopes along a fixed parent chain
///
/// # Example
/// ```
/// use material_sim_core::{Commodity, Message, MessageRouter};
///
/// let mut router = MessageRouter::new("market");
/// router.add_node("region_a", "market");
/// router.add_node("inst_1", "region_a");
/// router.register_facility("reactor", "inst_1");
/// router.validate().unwrap();
///
/// let msg = Message::request("reactor", Commodity::new("fresh_fuel"), 10.0);
/// let path = router.route_up(&msg).unwrap();
/// assert_eq!(path, vec!["inst_1", "region_a", "market"]);
/// ```
#[derive(Debug)]
pub struct MessageRouter {
    /// Market resolver at the top of the hierarchy
    root: String,

    /// child -> parent links for every non-root node
    parents: HashMap<String, String>,

    /// Per-facility FIFO inbox for committed transactions
    inboxes: HashMap<String, VecDeque<Transaction>>,
}

impl MessageRouter {
    /// Create a router with the given root (market resolver) node
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            parents: HashMap::new(),
            inboxes: HashMap::new(),
        }
    }

    /// Root node id
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Add an interior hierarchy node (institution, region)
    pub fn add_node(&mut self, node: impl Into<String>, parent: impl Into<String>) {
        self.parents.insert(node.into(), parent.into());
    }

    /// Register a facility leaf: a hierarchy link plus a commitment inbox
    pub fn register_facility(&mut self, facility: impl Into<String>, parent: impl Into<String>) {
        let facility = facility.into();
        self.parents.insert(facility.clone(), parent.into());
        self.inboxes.insert(facility, VecDeque::new());
    }

    /// Check that every node reaches the root without cycles
    pub fn validate(&self) -> Result<(), RoutingError> {
        for node in self.parents.keys() {
            self.path_to_root(node)?;
        }
        Ok(())
    }

    /// Hop sequence from `node` (exclusive) to the root (inclusive)
    fn path_to_root(&self, node: &str) -> Result<Vec<String>, RoutingError> {
        let mut path = Vec::new();
        let mut current = node;
        // Bounded walk: more hops than nodes means a cycle
        for _ in 0..=self.parents.len() {
            let parent = match self.parents.get(current) {
                Some(parent) => parent,
                None => {
                    return Err(if current == node {
                        RoutingError::UnknownNode {
                            node: node.to_string(),
                        }
                    } else {
                        RoutingError::NoPathToRoot {
                            node: node.to_string(),
                        }
                    })
                }
            };
            path.push(parent.clone());
            if parent == &self.root {
                return Ok(path);
            }
            current = parent;
        }
        Err(RoutingError::CycleDetected {
            node: node.to_string(),
        })
    }

    /// Relay an upward message toward the root
    ///
    /// Returns the hop sequence the envelope traversed. The payload is never
    /// inspected, only the routing metadata.
    pub fn route_up(&self, msg: &Message) -> Result<Vec<String>, RoutingError> {
        if msg.direction() != Direction::Up {
            return Err(RoutingError::WrongDirection {
                origin: msg.origin().to_string(),
            });
        }
        self.path_to_root(msg.origin())
    }

    /// Relay a downward message to its destination facility's inbox
    ///
    /// Only the destination metadata is read; the commitment payload is
    /// moved into the inbox untouched.
    pub fn route_down(&mut self, msg: Message) -> Result<(), RoutingError> {
        if msg.direction() != Direction::Down {
            return Err(RoutingError::WrongDirection {
                origin: msg.origin().to_string(),
            });
        }
        let destination = msg
            .destination()
            .ok_or_else(|| RoutingError::MissingDestination {
                origin: msg.origin().to_string(),
            })?
            .to_string();

        // Destination must be a registered leaf
        self.path_to_root(&destination)?;

        let inbox = self
            .inboxes
            .get_mut(&destination)
            .ok_or(RoutingError::UnknownFacility {
                facility: destination,
            })?;

        if let MessagePayload::Commitment(transaction) = msg.into_payload() {
            inbox.push_back(transaction);
        }
        Ok(())
    }

    /// Drain a facility's inbox, preserving delivery order
    pub fn take_inbox(&mut self, facility: &str) -> Result<Vec<Transaction>, RoutingError> {
        let inbox = self
            .inboxes
            .get_mut(facility)
            .ok_or_else(|| RoutingError::UnknownFacility {
                facility: facility.to_string(),
            })?;
        Ok(inbox.drain(..).collect())
    }

    /// Number of undelivered commitments for a facility
    pub fn inbox_len(&self, facility: &str) -> usize {
        self.inboxes.get(facility).map_or(0, VecDeque::len)
    }
}
