//! Domain models for the material-flow simulator

pub mod commodity;
pub mod event;
pub mod ledger;
pub mod material;
pub mod message;
pub mod transaction;

// Re-exports
pub use commodity::{Commodity, Recipe, RecipeError};
pub use event::{Event, EventLog};
pub use ledger::{Ledger, LedgerError};
pub use material::{Material, MaterialError, MASS_EPSILON};
pub use message::{Direction, Message, MessagePayload};
pub use transaction::Transaction;
