// ============================================================================
// Exchange Engine Library
// Concurrent continuous-auction matching engine for a single instrument
// ============================================================================

//! # Exchange Engine
//!
//! A concurrent, in-memory continuous-auction matching engine for a single
//! tradable instrument.
//!
//! ## Features
//!
//! - **Two-sided priority book** — market orders first, then price, then
//!   arrival order
//! - **Atomic balance settlement** — the buyer's debit is the commit point;
//!   trades never overdraw a trader
//! - **Background sweeper** that garbage-collects finished orders and
//!   re-attempts matching after out-of-band balance changes
//! - **Derived market price** from the intersection of linear demand and
//!   supply curves, used to bound and value market orders
//! - **Event sink** for observing placements, cancellations and trades
//!
//! ## Example
//!
//! ```rust
//! use exchange_engine::prelude::*;
//! use std::sync::Arc;
//!
//! let engine = ExchangeEngine::new();
//!
//! let seller = Arc::new(Trader::new(1));
//! let buyer = Arc::new(Trader::new(2));
//! buyer.credit(100);
//!
//! // Seller offers 1 unit at 100; buyer bids 1 unit at 100.
//! engine.place(Order::new(Arc::clone(&seller), 1, 100, 1, Side::Sell, false));
//! engine.place(Order::new(Arc::clone(&buyer), 2, 100, 1, Side::Buy, false));
//!
//! let trade = engine.last_transaction().unwrap();
//! assert_eq!(trade.price, 100);
//! assert_eq!(trade.quantity, 1);
//! assert_eq!(seller.balance(), 100);
//! assert_eq!(buyer.balance(), 0);
//! ```

pub mod domain;
pub mod engine;
pub mod interfaces;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        Book, BookError, EngineConfig, History, Order, OrderState, OrderStatus, Price, Quantity,
        Response, Side, Trader, Transaction,
    };
    pub use crate::engine::{
        ExchangeEngine, ExchangeEngineBuilder, MarketSnapshot, OrderSnapshot,
    };
    pub use crate::interfaces::{
        EngineEvent, EventHandler, LoggingEventHandler, NoOpEventHandler,
    };
}

#[cfg(test)]
mod integration_tests {
    use super::prelude::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn trader(id: u64, balance: u64) -> Arc<Trader> {
        let trader = Arc::new(Trader::new(id));
        trader.credit(balance);
        trader
    }

    fn wait_for<F: Fn() -> bool>(deadline: Duration, condition: F) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    #[test]
    fn test_sweeper_trades_after_out_of_band_credit() {
        let engine = ExchangeEngineBuilder::new()
            .sweep_interval(Duration::from_millis(25))
            .build()
            .unwrap();

        let seller = trader(1, 0);
        let buyer = trader(2, 0);

        engine.place(Order::new(Arc::clone(&seller), 1, 100, 1, Side::Sell, false));
        engine.place(Order::new(Arc::clone(&buyer), 2, 100, 1, Side::Buy, false));
        assert!(engine.last_transaction().is_none());

        // Fund the buyer after both orders failed to trade; the next sweep
        // pass picks the pair up.
        buyer.credit(100);
        assert!(wait_for(Duration::from_secs(5), || engine
            .last_transaction()
            .is_some()));

        let tx = engine.last_transaction().unwrap();
        assert_eq!(tx.quantity, 1);
        assert_eq!(tx.price, 100);
        assert_eq!(buyer.balance(), 0);
        assert_eq!(seller.balance(), 100);
    }

    #[test]
    fn test_sweeper_evicts_terminal_orders() {
        let engine = ExchangeEngineBuilder::new()
            .sweep_interval(Duration::from_millis(25))
            .build()
            .unwrap();

        let client = trader(1, 0);
        engine.place(Order::new(Arc::clone(&client), 1, 100, 1, Side::Sell, false));
        assert_eq!(engine.cancel(1, Side::Sell), Response::CancelAck);

        assert!(wait_for(Duration::from_secs(5), || engine.state_of(1)
            == OrderStatus::Unknown));
        assert!(engine.snapshot().sells.is_empty());
    }

    #[test]
    fn test_cancel_race_never_yields_both() {
        for round in 0..50 {
            let engine = ExchangeEngineBuilder::new()
                .sweep_interval(Duration::from_secs(3600))
                .build()
                .unwrap();
            let engine = Arc::new(engine);

            let seller = trader(1, 0);
            let buyer = trader(2, 100);
            engine.place(Order::new(Arc::clone(&seller), 1, 100, 1, Side::Sell, false));

            let canceller = {
                let engine = Arc::clone(&engine);
                thread::spawn(move || engine.cancel(1, Side::Sell))
            };
            let taker = {
                let engine = Arc::clone(&engine);
                let buyer = Arc::clone(&buyer);
                thread::spawn(move || {
                    engine.place(Order::new(buyer, 2, 100, 1, Side::Buy, false))
                })
            };

            let cancel_response = canceller.join().unwrap();
            taker.join().unwrap();
            let traded = engine.last_transaction().is_some();

            // Either the trade won and the cancel found a dead order, or the
            // cancel won and nothing traded. Never both.
            assert!(
                !(traded && cancel_response == Response::CancelAck),
                "round {}: trade and cancel ack on the same live order",
                round
            );
            if traded {
                assert_eq!(seller.balance(), 100);
                assert_eq!(buyer.balance(), 0);
            } else {
                assert_eq!(seller.balance(), 0);
                assert_eq!(buyer.balance(), 100);
            }
        }
    }

    #[test]
    fn test_randomized_trading_conserves_funds() {
        use rand::{Rng, SeedableRng};

        let engine = Arc::new(
            ExchangeEngineBuilder::new()
                .sweep_interval(Duration::from_millis(10))
                .build()
                .unwrap(),
        );
        let exchange_ids = Arc::new(AtomicU64::new(0));

        let tr0 = trader(0, 10_000);
        let tr1 = trader(1, 10_000);

        let spawn = |client: Arc<Trader>, seed: u64| {
            let engine = Arc::clone(&engine);
            let exchange_ids = Arc::clone(&exchange_ids);
            thread::spawn(move || {
                let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
                for _ in 0..500 {
                    let price = rng.gen_range(0..200);
                    let quantity = rng.gen_range(0..10);
                    let side = Side::from_is_sell(rng.gen_bool(0.5));
                    // Two placers, alternating ids: trader 0 takes the even
                    // ids, trader 1 the odd ones.
                    let exchange_id =
                        exchange_ids.fetch_add(1, Ordering::AcqRel) * 2 + client.id();
                    engine.place(Order::new(
                        Arc::clone(&client),
                        exchange_id,
                        price,
                        quantity,
                        side,
                        false,
                    ));
                }
            })
        };

        let h0 = spawn(Arc::clone(&tr0), 7);
        let h1 = spawn(Arc::clone(&tr1), 13);
        h0.join().unwrap();
        h1.join().unwrap();

        let transactions = engine.last_transactions(usize::MAX);
        drop(engine);

        // Every unit of currency a buyer lost, a seller gained.
        assert_eq!(tr0.balance() + tr1.balance(), 20_000);

        for tx in &transactions {
            assert!(tx.price > 0);
            assert!(tx.quantity > 0);
            // Ids are partitioned by trader, so a self-trade would pair two
            // ids of equal parity.
            assert_ne!(
                tx.seller_exchange_id % 2,
                tx.buyer_exchange_id % 2,
                "self-trade recorded: {:?}",
                tx
            );
        }
    }

    #[test]
    fn test_events_reach_the_sink() {
        use parking_lot::Mutex;

        struct Recorder(Mutex<Vec<&'static str>>);
        impl EventHandler for Recorder {
            fn on_event(&self, event: EngineEvent) {
                let tag = match event {
                    EngineEvent::OrderPlaced { .. } => "placed",
                    EngineEvent::OrderRejected { .. } => "rejected",
                    EngineEvent::OrderCancelled { .. } => "cancelled",
                    EngineEvent::TransactionExecuted { .. } => "executed",
                };
                self.0.lock().push(tag);
            }
        }

        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let engine = ExchangeEngineBuilder::new()
            .sweep_interval(Duration::from_secs(3600))
            .event_handler(Arc::clone(&recorder) as Arc<dyn EventHandler>)
            .build()
            .unwrap();

        let seller = trader(1, 0);
        let buyer = trader(2, 100);
        engine.place(Order::new(Arc::clone(&seller), 1, 100, 1, Side::Sell, false));
        engine.place(Order::new(Arc::clone(&seller), 1, 100, 1, Side::Sell, false));
        engine.place(Order::new(Arc::clone(&buyer), 2, 100, 1, Side::Buy, false));
        engine.place(Order::new(Arc::clone(&seller), 3, 150, 1, Side::Sell, false));
        engine.cancel(3, Side::Sell);
        // Cancelling the filled order only rejects; no event is emitted.
        engine.cancel(1, Side::Sell);

        let seen = recorder.0.lock().clone();
        assert_eq!(
            seen,
            vec!["placed", "rejected", "placed", "executed", "placed", "cancelled"]
        );
    }
}
