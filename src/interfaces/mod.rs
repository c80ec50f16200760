// ============================================================================
// Interfaces Module
// Contracts between the engine and the outside world
// ============================================================================

mod event_handler;

pub use event_handler::{EngineEvent, EventHandler, LoggingEventHandler, NoOpEventHandler};
