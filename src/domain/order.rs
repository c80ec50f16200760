// ============================================================================
// Order Domain Model
// ============================================================================

use crate::domain::Trader;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of an order. `Sell` offers the instrument, `Buy` bids for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Construct a `Side` from a boolean sell flag (`true` = sell,
    /// `false` = buy).
    pub fn from_is_sell(is_sell: bool) -> Self {
        if is_sell {
            Side::Sell
        } else {
            Side::Buy
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Mutable half of an order, guarded by the per-order lock.
#[derive(Debug)]
pub struct OrderState {
    remaining: u64,
    cancelled: bool,
}

impl OrderState {
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// An order is terminal once it has no quantity left or was cancelled.
    /// Terminal orders never trade again and are removed by the next sweep.
    pub fn is_terminal(&self) -> bool {
        self.remaining == 0 || self.cancelled
    }

    /// Decrease the remaining quantity by a filled amount.
    ///
    /// # Panics
    ///
    /// Panics if `quantity` exceeds the remaining quantity. Quantity only
    /// ever decreases; asking for more is a caller bug, not a runtime
    /// condition.
    pub fn fill(&mut self, quantity: u64) {
        assert!(
            quantity <= self.remaining,
            "fill of {} exceeds remaining quantity {}",
            quantity,
            self.remaining
        );
        self.remaining -= quantity;
    }

    /// One-shot cancel flag. Returns whether the order was live (uncancelled
    /// with quantity left) at the moment the flag was set; cancelling an
    /// already-terminal order reports `false` and changes nothing further.
    pub fn cancel(&mut self) -> bool {
        let was_live = !self.cancelled && self.remaining > 0;
        self.cancelled = true;
        was_live
    }
}

/// A resting order: an immutable header plus lock-guarded mutable state.
///
/// The header never changes after construction. For market orders the
/// caller-supplied price is discarded and replaced by a sentinel — `0` for a
/// market sell, `u64::MAX` for a market buy — so that market orders compare
/// ahead of every limit order on their side.
#[derive(Debug)]
pub struct Order {
    client: Arc<Trader>,
    exchange_id: u64,
    side: Side,
    is_market: bool,
    limit_price: u64,
    state: Mutex<OrderState>,
}

impl Order {
    pub fn new(
        client: Arc<Trader>,
        exchange_id: u64,
        price: u64,
        quantity: u64,
        side: Side,
        is_market: bool,
    ) -> Self {
        let limit_price = if is_market {
            match side {
                Side::Sell => 0,
                Side::Buy => u64::MAX,
            }
        } else {
            price
        };

        Self {
            client,
            exchange_id,
            side,
            is_market,
            limit_price,
            state: Mutex::new(OrderState {
                remaining: quantity,
                cancelled: false,
            }),
        }
    }

    pub fn client(&self) -> &Arc<Trader> {
        &self.client
    }

    pub fn client_id(&self) -> u64 {
        self.client.id()
    }

    pub fn exchange_id(&self) -> u64 {
        self.exchange_id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_market(&self) -> bool {
        self.is_market
    }

    /// The stored price bound: the limit for limit orders, the sentinel for
    /// market orders.
    pub fn limit_price(&self) -> u64 {
        self.limit_price
    }

    /// Price at which this order is willing to trade right now: the limit
    /// price for limit orders, the supplied market price for market orders.
    pub fn effective_price(&self, market_price: u64) -> u64 {
        if self.is_market {
            market_price
        } else {
            self.limit_price
        }
    }

    /// Acquire the per-order lock.
    pub fn lock(&self) -> MutexGuard<'_, OrderState> {
        self.state.lock()
    }

    pub fn remaining(&self) -> u64 {
        self.state.lock().remaining()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.lock().is_terminal()
    }

    /// Set the cancel flag under the per-order lock. See
    /// [`OrderState::cancel`] for the return value.
    pub fn cancel(&self) -> bool {
        self.state.lock().cancel()
    }
}
