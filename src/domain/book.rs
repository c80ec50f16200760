// ============================================================================
// Order Book Domain Model
// ============================================================================

use crate::domain::errors::BookError;
use crate::domain::{Order, Side};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::ops::ControlFlow;
use std::sync::Arc;

// ============================================================================
// Priority Key
// ============================================================================

/// Sort key for one side of the book:
///
/// 1. Market orders rank above limit orders.
/// 2. Among limit orders, better price first — higher for buys, lower for
///    sells. The price is normalized at construction so that plain ascending
///    `Ord` yields the right order for either side.
/// 3. Ties break by arrival sequence, earlier first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct PriorityKey {
    limit: bool,
    price_rank: u64,
    arrival: u64,
}

impl PriorityKey {
    fn new(order: &Order, arrival: u64) -> Self {
        let price_rank = match order.side() {
            Side::Buy => u64::MAX - order.limit_price(),
            Side::Sell => order.limit_price(),
        };
        Self {
            limit: !order.is_market(),
            price_rank,
            arrival,
        }
    }
}

// ============================================================================
// Book
// ============================================================================

/// One side of the market: a priority-ordered set of live orders plus a
/// secondary index from exchange id to order.
///
/// Two locks guard the book. Writers (insert, sweep) take the index lock and
/// then the structure lock, always in that order; readers of the priority
/// ordering take only the shared structure lock. Individual orders keep their
/// own lock and may change state while a scan is in progress.
#[derive(Debug)]
pub struct Book {
    side: Side,
    index: RwLock<HashMap<u64, Arc<Order>>>,
    orders: RwLock<BTreeMap<PriorityKey, Arc<Order>>>,
}

impl Book {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            index: RwLock::new(HashMap::new()),
            orders: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Insert an order under the given arrival sequence number.
    ///
    /// Rejects a second order with an exchange id that is already indexed,
    /// even when its previous holder is terminal but not yet swept.
    pub fn insert(&self, order: Arc<Order>, arrival: u64) -> Result<(), BookError> {
        debug_assert_eq!(order.side(), self.side);

        let mut index = self.index.write();
        let mut orders = self.orders.write();

        let exchange_id = order.exchange_id();
        if index.contains_key(&exchange_id) {
            return Err(BookError::DuplicateExchangeId(exchange_id));
        }

        let key = PriorityKey::new(&order, arrival);
        orders.insert(key, Arc::clone(&order));
        index.insert(exchange_id, order);
        Ok(())
    }

    /// Flag the identified order as cancelled.
    ///
    /// Returns `true` only if the order existed and was still live; an
    /// unknown id or an already-terminal order reports `false`.
    pub fn cancel(&self, exchange_id: u64) -> bool {
        let order = {
            let index = self.index.read();
            match index.get(&exchange_id) {
                Some(order) => Arc::clone(order),
                None => return false,
            }
        };
        order.cancel()
    }

    /// Look up an order by exchange id.
    pub fn get(&self, exchange_id: u64) -> Option<Arc<Order>> {
        self.index.read().get(&exchange_id).cloned()
    }

    /// Remove every terminal order from the structure and the index.
    /// Returns how many were removed.
    ///
    /// Terminality is sticky (quantity never grows, the cancel flag never
    /// clears), so deciding first and erasing second cannot resurrect an
    /// order.
    pub fn sweep(&self) -> usize {
        let mut index = self.index.write();
        let mut orders = self.orders.write();

        let doomed: Vec<(PriorityKey, u64)> = orders
            .iter()
            .filter(|(_, order)| order.is_terminal())
            .map(|(key, order)| (*key, order.exchange_id()))
            .collect();

        for (key, exchange_id) in &doomed {
            orders.remove(key);
            index.remove(exchange_id);
        }
        doomed.len()
    }

    /// Visit orders in priority order under the shared structure lock until
    /// the closure breaks or the book is exhausted.
    pub fn scan<F>(&self, mut f: F)
    where
        F: FnMut(&Arc<Order>) -> ControlFlow<()>,
    {
        let orders = self.orders.read();
        for order in orders.values() {
            if f(order).is_break() {
                break;
            }
        }
    }

    /// Snapshot of the orders in priority order.
    pub fn orders_in_priority(&self) -> Vec<Arc<Order>> {
        self.orders.read().values().cloned().collect()
    }

    /// `(quantity_remaining, limit_price)` of the first and the last limit
    /// order in priority order, or `None` when the book holds no limit
    /// orders. A book with a single limit order reports it as both endpoints.
    pub fn limit_endpoints(&self) -> Option<((u64, u64), (u64, u64))> {
        let orders = self.orders.read();
        let mut first = None;
        let mut last = None;
        for order in orders.values() {
            if order.is_market() {
                continue;
            }
            let point = (order.remaining(), order.limit_price());
            if first.is_none() {
                first = Some(point);
            }
            last = Some(point);
        }
        Some((first?, last?))
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}
