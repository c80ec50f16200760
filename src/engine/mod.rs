// ============================================================================
// Engine Module
// Contains the core matching and orchestration logic
// ============================================================================

mod builder;
mod exchange_engine;
mod snapshot;

pub mod market_price;
pub mod matcher;

pub use builder::ExchangeEngineBuilder;
pub use exchange_engine::ExchangeEngine;
pub use snapshot::{MarketSnapshot, OrderSnapshot};
