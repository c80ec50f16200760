// ============================================================================
// Event Handler Interface
// Defines the contract for observing engine activity
// ============================================================================

use crate::domain::{Side, Transaction};
use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the exchange engine.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EngineEvent {
    /// Order accepted into a book
    OrderPlaced {
        exchange_id: u64,
        side: Side,
        timestamp: DateTime<Utc>,
    },

    /// Order refused (duplicate exchange id)
    OrderRejected {
        exchange_id: u64,
        side: Side,
        timestamp: DateTime<Utc>,
    },

    /// Live order flagged as cancelled
    OrderCancelled {
        exchange_id: u64,
        side: Side,
        timestamp: DateTime<Utc>,
    },

    /// Funds settled and quantity exchanged between two orders
    TransactionExecuted { transaction: Transaction },
}

/// Sink for engine events.
/// Implementations can handle logging, metrics, downstream feeds, etc.
pub trait EventHandler: Send + Sync {
    /// Handle an engine event
    fn on_event(&self, event: EngineEvent);

    /// Batch event handler (optional optimization)
    ///
    /// The engine delivers all events of one operation through a single
    /// call, so an implementation overriding this sees them together.
    fn on_events(&self, events: Vec<EngineEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: EngineEvent) {
        // Do nothing
    }
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: EngineEvent) {
        tracing::debug!("Exchange engine event: {:?}", event);
    }
}
