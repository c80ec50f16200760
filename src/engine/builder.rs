// ============================================================================
// Engine Builder
// Fluent assembly of configuration and event sink into an engine
// ============================================================================

use crate::domain::EngineConfig;
use crate::engine::ExchangeEngine;
use crate::interfaces::{EventHandler, NoOpEventHandler};
use std::sync::Arc;
use std::time::Duration;

/// Builder for [`ExchangeEngine`] instances.
///
/// # Example
/// ```
/// use exchange_engine::prelude::*;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let engine = ExchangeEngineBuilder::new()
///     .sweep_interval(Duration::from_secs(1))
///     .history_limit(10_000)
///     .event_handler(Arc::new(LoggingEventHandler))
///     .build()
///     .unwrap();
/// assert_eq!(engine.market_price(), 0);
/// ```
pub struct ExchangeEngineBuilder {
    config: EngineConfig,
    event_handler: Arc<dyn EventHandler>,
}

impl ExchangeEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            event_handler: Arc::new(NoOpEventHandler),
        }
    }

    /// Set how often the background sweeper runs.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = interval;
        self
    }

    /// Cap the transaction history at `limit` entries.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = Some(limit);
        self
    }

    /// Market price published before the first estimate.
    pub fn initial_market_price(mut self, price: u64) -> Self {
        self.config.initial_market_price = price;
        self
    }

    /// Sink for engine events.
    pub fn event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = handler;
        self
    }

    /// Get the configuration without building (for inspection)
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate the configuration and start the engine.
    pub fn build(self) -> Result<ExchangeEngine, String> {
        self.config.validate()?;
        Ok(ExchangeEngine::with_config(self.config, self.event_handler))
    }
}

impl Default for ExchangeEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = ExchangeEngineBuilder::new();
        assert_eq!(builder.config().sweep_interval, Duration::from_secs(5));
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_builder_applies_settings() {
        let builder = ExchangeEngineBuilder::new()
            .sweep_interval(Duration::from_millis(250))
            .history_limit(42)
            .initial_market_price(100);

        assert_eq!(builder.config().sweep_interval, Duration::from_millis(250));
        assert_eq!(builder.config().history_limit, Some(42));

        let engine = builder.build().unwrap();
        assert_eq!(engine.market_price(), 100);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = ExchangeEngineBuilder::new()
            .sweep_interval(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }
}
