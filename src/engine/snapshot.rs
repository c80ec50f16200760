// ============================================================================
// Market Snapshot
// Point-in-time view of both books for inspection and display
// ============================================================================

use crate::domain::Side;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One resting order as seen at snapshot time. Market orders report the
/// market price in effect when the snapshot was taken.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderSnapshot {
    pub client_id: u64,
    pub exchange_id: u64,
    pub price: u64,
    pub quantity: u64,
    pub is_market: bool,
    pub side: Side,
}

/// Immutable snapshot of the whole market: the published market price and
/// both books in priority order.
///
/// The `Display` rendering is a human-readable table for debugging and demos;
/// its exact format is not a stable interface.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MarketSnapshot {
    pub market_price: u64,
    pub buys: Vec<OrderSnapshot>,
    pub sells: Vec<OrderSnapshot>,
}

impl MarketSnapshot {
    pub fn best_buy(&self) -> Option<&OrderSnapshot> {
        self.buys.first()
    }

    pub fn best_sell(&self) -> Option<&OrderSnapshot> {
        self.sells.first()
    }

    pub fn total_buy_quantity(&self) -> u64 {
        self.buys.iter().map(|o| o.quantity).sum()
    }

    pub fn total_sell_quantity(&self) -> u64 {
        self.sells.iter().map(|o| o.quantity).sum()
    }
}

impl fmt::Display for MarketSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "market price: {}", self.market_price)?;
        writeln!(
            f,
            "{:>10} | {:>11} | {:>20} | {:>10} | {:>6} | {:>4}",
            "client id", "exchange id", "price", "quantity", "market", "side"
        )?;
        for order in self.buys.iter().chain(self.sells.iter()) {
            writeln!(
                f,
                "{:>10} | {:>11} | {:>20} | {:>10} | {:>6} | {:>4}",
                order.client_id,
                order.exchange_id,
                order.price,
                order.quantity,
                if order.is_market { "yes" } else { "no" },
                match order.side {
                    Side::Buy => "buy",
                    Side::Sell => "sell",
                },
            )?;
        }
        Ok(())
    }
}
