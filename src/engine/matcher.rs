// ============================================================================
// Matching Primitive
// Attempts a single trade between two orders and settles the funds
// ============================================================================

use crate::domain::{History, Order, Side, Transaction};

/// Try to trade two orders against each other.
///
/// `market_price` prices any market order among the pair. On success the
/// buyer has been debited, the seller credited, both orders' remaining
/// quantities decremented, and the transaction appended to `history`; the
/// returned record describes the trade. `None` means no trade happened and
/// nothing was mutated.
///
/// The trade executes at the integer mid-price of the two effective prices.
/// The quantity is bounded by both remaining quantities and by what the
/// buyer's balance covers at that price. The debit is the commit point:
/// if the buyer's balance moved between the quote and the debit, the
/// quantity is requoted against the new balance rather than giving up.
///
/// The per-order locks are taken in ascending exchange-id order, so
/// concurrent calls over overlapping pairs cannot deadlock. The history
/// append happens before the locks are released, which keeps history in
/// commit order.
pub fn execute(
    a: &Order,
    b: &Order,
    market_price: u64,
    history: &History,
) -> Option<Transaction> {
    if a.side() == b.side() {
        return None;
    }

    let (sell, buy) = match a.side() {
        Side::Sell => (a, b),
        Side::Buy => (b, a),
    };

    if sell.client_id() == buy.client_id() {
        return None;
    }

    if sell.remaining() == 0 || buy.remaining() == 0 {
        return None;
    }

    // Match limits; market orders take the market price as their limit.
    let buy_price = buy.effective_price(market_price);
    let sell_price = sell.effective_price(market_price);

    if buy_price < sell_price {
        return None;
    }

    let (mut buy_state, mut sell_state) = if buy.exchange_id() < sell.exchange_id() {
        let buy_guard = buy.lock();
        let sell_guard = sell.lock();
        (buy_guard, sell_guard)
    } else {
        let sell_guard = sell.lock();
        let buy_guard = buy.lock();
        (buy_guard, sell_guard)
    };

    if buy_state.is_cancelled() || sell_state.is_cancelled() {
        return None;
    }

    let price = ((buy_price as u128 + sell_price as u128) / 2) as u64;
    if price == 0 {
        return None;
    }

    let buyer = buy.client();
    let seller = sell.client();

    loop {
        let max_quantity = sell_state.remaining().min(buy_state.remaining());
        let quantity = max_quantity.min(buyer.balance() / price);
        if quantity == 0 {
            return None;
        }

        // The buyer's balance may have moved since the quote; requote
        // against whatever is there now instead of failing.
        if !buyer.debit(quantity * price) {
            continue;
        }

        seller.credit(quantity * price);
        buy_state.fill(quantity);
        sell_state.fill(quantity);

        let transaction = Transaction::new(sell.exchange_id(), buy.exchange_id(), quantity, price);
        tracing::trace!(
            seller = sell.exchange_id(),
            buyer = buy.exchange_id(),
            quantity,
            price,
            "transaction committed"
        );
        history.push(transaction.clone());
        return Some(transaction);
    }
}
