// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod book;
pub mod config;
pub mod errors;
pub mod order;
pub mod trader;
pub mod transaction;

pub use book::Book;
pub use config::EngineConfig;
pub use errors::BookError;
pub use order::{Order, OrderState, Side};
pub use trader::Trader;
pub use transaction::{History, Transaction};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer price per unit of the instrument.
pub type Price = u64;

/// Integer quantity of the instrument.
pub type Quantity = u64;

/// Outcome of a place or cancel request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Response {
    NewOrderAck,
    NewOrderReject,
    CancelAck,
    CancelReject,
}

/// Observed state of an order looked up by exchange id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderStatus {
    /// Resting in a book with quantity left to trade
    Open,
    /// Cancel flag set; awaiting the next sweep
    Cancelled,
    /// Fully executed; awaiting the next sweep
    Filled,
    /// No order with this exchange id is currently held
    Unknown,
}
