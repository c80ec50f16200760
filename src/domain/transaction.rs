// ============================================================================
// Transaction Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::VecDeque;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A completed trade between a resting sell and a resting buy.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: Uuid,

    /// Exchange id of the sell order
    pub seller_exchange_id: u64,

    /// Exchange id of the buy order
    pub buyer_exchange_id: u64,

    /// Quantity sold
    pub quantity: u64,

    /// Execution price per unit
    pub price: u64,

    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(seller_exchange_id: u64, buyer_exchange_id: u64, quantity: u64, price: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            seller_exchange_id,
            buyer_exchange_id,
            quantity,
            price,
            timestamp: Utc::now(),
        }
    }

    /// Total funds moved from buyer to seller.
    pub fn notional(&self) -> u64 {
        self.quantity.saturating_mul(self.price)
    }
}

// ============================================================================
// History
// ============================================================================

/// Append-only record of completed transactions, ordered by commit time.
///
/// An optional cap bounds memory: once full, the oldest entries are dropped
/// as new ones arrive. Reads return the tail — the most recent entries, in
/// chronological order with the most recent last.
#[derive(Debug)]
pub struct History {
    entries: RwLock<VecDeque<Transaction>>,
    limit: Option<usize>,
}

impl History {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            limit,
        }
    }

    pub fn push(&self, transaction: Transaction) {
        let mut entries = self.entries.write();
        entries.push_back(transaction);
        if let Some(limit) = self.limit {
            while entries.len() > limit {
                entries.pop_front();
            }
        }
    }

    /// The most recent transaction, if any.
    pub fn last(&self) -> Option<Transaction> {
        self.entries.read().back().cloned()
    }

    /// Up to `n` most recent transactions, chronological, most recent last.
    pub fn last_n(&self, n: usize) -> Vec<Transaction> {
        let entries = self.entries.read();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
