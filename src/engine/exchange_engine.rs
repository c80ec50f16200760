// ============================================================================
// Exchange Engine
// Public surface: order placement, cancellation, queries, background sweep
// ============================================================================

use crate::domain::{
    Book, EngineConfig, History, Order, OrderStatus, Response, Side, Transaction,
};
use crate::engine::snapshot::{MarketSnapshot, OrderSnapshot};
use crate::engine::{market_price, matcher};
use crate::interfaces::{EngineEvent, EventHandler, NoOpEventHandler};
use chrono::Utc;
use parking_lot::{Condvar, Mutex};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

// ============================================================================
// Shared State
// ============================================================================

/// Terminate flag plus the condition the sweeper sleeps on.
struct Shutdown {
    terminated: Mutex<bool>,
    signal: Condvar,
}

/// Engine state shared between client threads and the sweeper.
struct EngineCore {
    buys: Book,
    sells: Book,
    history: History,
    market_price: AtomicU64,
    arrivals: AtomicU64,
    event_handler: Arc<dyn EventHandler>,
}

impl EngineCore {
    fn book(&self, side: Side) -> &Book {
        match side {
            Side::Buy => &self.buys,
            Side::Sell => &self.sells,
        }
    }

    fn place(&self, order: Order) -> Response {
        // Arrival sequence assigned at entry; it is the priority tie-break.
        let arrival = self.arrivals.fetch_add(1, Ordering::AcqRel);
        let side = order.side();
        let exchange_id = order.exchange_id();
        let order = Arc::new(order);

        let mut events = Vec::new();

        if let Err(err) = self.book(side).insert(Arc::clone(&order), arrival) {
            tracing::debug!(%err, "order rejected");
            events.push(EngineEvent::OrderRejected {
                exchange_id,
                side,
                timestamp: Utc::now(),
            });
            self.event_handler.on_events(events);
            return Response::NewOrderReject;
        }

        self.refresh_market_price();
        events.push(EngineEvent::OrderPlaced {
            exchange_id,
            side,
            timestamp: Utc::now(),
        });

        let market_price = self.market_price.load(Ordering::Acquire);
        let own_price = order.effective_price(market_price);

        // Walk the opposite book in priority order. It is sorted so that the
        // first candidate whose price bound no longer crosses ends the walk;
        // market candidates carry sentinel bounds and never end it.
        self.book(side.opposite()).scan(|candidate| {
            if order.remaining() == 0 {
                return ControlFlow::Break(());
            }
            if candidate.remaining() == 0 {
                return ControlFlow::Continue(());
            }
            let crosses = match side {
                Side::Sell => candidate.limit_price() >= own_price,
                Side::Buy => own_price >= candidate.limit_price(),
            };
            if !crosses {
                return ControlFlow::Break(());
            }
            if let Some(transaction) =
                matcher::execute(order.as_ref(), candidate.as_ref(), market_price, &self.history)
            {
                events.push(EngineEvent::TransactionExecuted { transaction });
            }
            ControlFlow::Continue(())
        });

        // One batch per placement: the ack and every resulting trade arrive
        // at the sink together.
        self.event_handler.on_events(events);
        Response::NewOrderAck
    }

    fn cancel(&self, exchange_id: u64, side: Side) -> Response {
        if self.book(side).cancel(exchange_id) {
            tracing::debug!(exchange_id, "order cancelled");
            self.event_handler.on_event(EngineEvent::OrderCancelled {
                exchange_id,
                side,
                timestamp: Utc::now(),
            });
            Response::CancelAck
        } else {
            Response::CancelReject
        }
    }

    fn state_of(&self, exchange_id: u64) -> OrderStatus {
        let order = self
            .buys
            .get(exchange_id)
            .or_else(|| self.sells.get(exchange_id));
        match order {
            None => OrderStatus::Unknown,
            Some(order) => {
                let state = order.lock();
                if state.is_cancelled() {
                    OrderStatus::Cancelled
                } else if state.remaining() == 0 {
                    OrderStatus::Filled
                } else {
                    OrderStatus::Open
                }
            },
        }
    }

    fn refresh_market_price(&self) {
        if let Some(price) = market_price::estimate(&self.buys, &self.sells) {
            self.market_price.store(price, Ordering::Release);
        }
    }

    /// One sweeper pass: garbage-collect both books, then re-attempt
    /// matching across them. Balances credited since an order last failed to
    /// trade make previously impossible trades possible; this pass picks
    /// them up.
    fn run_maintenance(&self) {
        let swept = self.buys.sweep() + self.sells.sweep();
        tracing::debug!(swept, "sweep pass");

        let market_price = self.market_price.load(Ordering::Acquire);
        let mut events = Vec::new();
        self.buys.scan(|buy| {
            if buy.remaining() == 0 {
                return ControlFlow::Continue(());
            }
            self.sells.scan(|sell| {
                if buy.remaining() == 0 {
                    return ControlFlow::Break(());
                }
                if sell.remaining() == 0 {
                    return ControlFlow::Continue(());
                }
                if buy.limit_price() < sell.limit_price() {
                    return ControlFlow::Break(());
                }
                if let Some(transaction) =
                    matcher::execute(buy.as_ref(), sell.as_ref(), market_price, &self.history)
                {
                    events.push(EngineEvent::TransactionExecuted { transaction });
                }
                ControlFlow::Continue(())
            });
            ControlFlow::Continue(())
        });

        if !events.is_empty() {
            self.event_handler.on_events(events);
        }
    }

    fn snapshot(&self) -> MarketSnapshot {
        let market_price = self.market_price.load(Ordering::Acquire);
        let collect = |book: &Book| {
            book.orders_in_priority()
                .iter()
                .map(|order| {
                    let state = order.lock();
                    OrderSnapshot {
                        client_id: order.client_id(),
                        exchange_id: order.exchange_id(),
                        price: if order.is_market() {
                            market_price
                        } else {
                            order.limit_price()
                        },
                        quantity: state.remaining(),
                        is_market: order.is_market(),
                        side: order.side(),
                    }
                })
                .collect()
        };
        MarketSnapshot {
            market_price,
            buys: collect(&self.buys),
            sells: collect(&self.sells),
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Concurrent continuous-auction engine for a single instrument.
///
/// Thread-safe: any number of threads may place, cancel and query
/// concurrently. A background sweeper wakes on the configured interval to
/// remove terminal orders and re-attempt matching; dropping the engine stops
/// and joins it.
pub struct ExchangeEngine {
    core: Arc<EngineCore>,
    shutdown: Arc<Shutdown>,
    sweeper: Option<thread::JoinHandle<()>>,
    config: EngineConfig,
}

impl ExchangeEngine {
    /// Engine with default configuration and no event sink.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default(), Arc::new(NoOpEventHandler))
    }

    pub fn with_config(config: EngineConfig, event_handler: Arc<dyn EventHandler>) -> Self {
        let core = Arc::new(EngineCore {
            buys: Book::new(Side::Buy),
            sells: Book::new(Side::Sell),
            history: History::new(config.history_limit),
            market_price: AtomicU64::new(config.initial_market_price),
            arrivals: AtomicU64::new(0),
            event_handler,
        });
        let shutdown = Arc::new(Shutdown {
            terminated: Mutex::new(false),
            signal: Condvar::new(),
        });

        let sweeper = {
            let core = Arc::clone(&core);
            let shutdown = Arc::clone(&shutdown);
            let interval = config.sweep_interval;
            thread::spawn(move || loop {
                {
                    let mut terminated = shutdown.terminated.lock();
                    if *terminated {
                        break;
                    }
                    let result = shutdown.signal.wait_for(&mut terminated, interval);
                    if *terminated {
                        break;
                    }
                    // Woken without termination: go back to sleep.
                    if !result.timed_out() {
                        continue;
                    }
                }
                core.run_maintenance();
            })
        };

        Self {
            core,
            shutdown,
            sweeper: Some(sweeper),
            config,
        }
    }

    /// Place a new order.
    ///
    /// The order is inserted into its book, the market price refreshed, and
    /// the opposite book walked in priority order for crossing candidates.
    /// Returns [`Response::NewOrderReject`] if the exchange id is already
    /// taken, [`Response::NewOrderAck`] otherwise.
    pub fn place(&self, order: Order) -> Response {
        self.core.place(order)
    }

    /// Cancel an outstanding order. [`Response::CancelAck`] only if the
    /// order was still live; unknown, exhausted or already-cancelled orders
    /// report [`Response::CancelReject`].
    pub fn cancel(&self, exchange_id: u64, side: Side) -> Response {
        self.core.cancel(exchange_id, side)
    }

    /// Observed state of the identified order, on either side.
    pub fn state_of(&self, exchange_id: u64) -> OrderStatus {
        self.core.state_of(exchange_id)
    }

    /// The most recent transaction, if any.
    pub fn last_transaction(&self) -> Option<Transaction> {
        self.core.history.last()
    }

    /// Up to `n` most recent transactions, chronological, most recent last.
    pub fn last_transactions(&self, n: usize) -> Vec<Transaction> {
        self.core.history.last_n(n)
    }

    /// The currently published market price estimate.
    pub fn market_price(&self) -> u64 {
        self.core.market_price.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Point-in-time view of both books.
    pub fn snapshot(&self) -> MarketSnapshot {
        self.core.snapshot()
    }

    /// Write a human-readable snapshot of both books to stdout.
    pub fn print(&self) {
        println!("{}", self.snapshot());
    }
}

impl Default for ExchangeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ExchangeEngine {
    fn drop(&mut self) {
        *self.shutdown.terminated.lock() = true;
        self.shutdown.signal.notify_all();
        if let Some(sweeper) = self.sweeper.take() {
            let _ = sweeper.join();
        }
    }
}
