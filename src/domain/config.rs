// ============================================================================
// Engine Configuration
// ============================================================================

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunables for an exchange engine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// How often the background sweeper wakes to garbage-collect terminal
    /// orders and re-attempt matching.
    pub sweep_interval: Duration,

    /// Optional cap on the transaction history; once full, the oldest
    /// entries are dropped. `None` means unbounded.
    pub history_limit: Option<usize>,

    /// Market price published before the first estimate is computed.
    pub initial_market_price: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(5),
            history_limit: None,
            initial_market_price: 0,
        }
    }
}

impl EngineConfig {
    /// Builder method: set the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Builder method: cap the transaction history.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Builder method: set the initial market price.
    pub fn with_initial_market_price(mut self, price: u64) -> Self {
        self.initial_market_price = price;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.sweep_interval.is_zero() {
            return Err("Sweep interval must be positive".to_string());
        }
        if self.history_limit == Some(0) {
            return Err("History limit must be positive when set".to_string());
        }
        Ok(())
    }
}
