// ============================================================================
// Trader Domain Model
// ============================================================================

use std::sync::atomic::{AtomicU64, Ordering};

/// A trading participant: an immutable identity plus an atomically mutable
/// balance.
///
/// The balance is deliberately lock-free and sits outside the engine's lock
/// hierarchy. The matcher quotes a trade quantity against a snapshot of the
/// buyer's balance and then commits it with [`Trader::debit`]; if the balance
/// moved in between, the debit fails and the matcher requotes.
#[derive(Debug)]
pub struct Trader {
    id: u64,
    balance: AtomicU64,
}

impl Trader {
    /// Create a trader with a zero balance.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            balance: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Snapshot read of the current balance.
    pub fn balance(&self) -> u64 {
        self.balance.load(Ordering::Acquire)
    }

    /// Unconditionally increase the balance. Saturates at `u64::MAX`.
    pub fn credit(&self, amount: u64) {
        let mut current = self.balance.load(Ordering::Acquire);
        loop {
            let next = current.saturating_add(amount);
            match self.balance.compare_exchange(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    /// Atomically subtract `amount` from the balance.
    ///
    /// Succeeds only if the whole amount is covered; otherwise the balance is
    /// left unchanged and `false` is returned. A zero debit trivially
    /// succeeds.
    pub fn debit(&self, amount: u64) -> bool {
        if amount == 0 {
            return true;
        }

        let mut current = self.balance.load(Ordering::Acquire);
        loop {
            let Some(next) = current.checked_sub(amount) else {
                return false;
            };
            match self.balance.compare_exchange(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_credit_and_balance() {
        let trader = Trader::new(7);
        assert_eq!(trader.id(), 7);
        assert_eq!(trader.balance(), 0);

        trader.credit(1000);
        assert_eq!(trader.balance(), 1000);

        trader.credit(u64::MAX);
        assert_eq!(trader.balance(), u64::MAX);
    }

    #[test]
    fn test_debit_all_or_nothing() {
        let trader = Trader::new(1);
        trader.credit(100);

        assert!(!trader.debit(101));
        assert_eq!(trader.balance(), 100);

        assert!(trader.debit(100));
        assert_eq!(trader.balance(), 0);

        assert!(!trader.debit(1));
        assert!(trader.debit(0));
    }

    #[test]
    fn test_concurrent_debits_never_overdraw() {
        let trader = Arc::new(Trader::new(1));
        trader.credit(1000);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let trader = Arc::clone(&trader);
            handles.push(thread::spawn(move || {
                let mut won = 0u64;
                for _ in 0..1000 {
                    if trader.debit(1) {
                        won += 1;
                    }
                }
                won
            }));
        }

        let total: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 1000);
        assert_eq!(trader.balance(), 0);
    }

    #[test]
    fn test_concurrent_credit_debit_conserves() {
        let trader = Arc::new(Trader::new(1));

        let creditor = {
            let trader = Arc::clone(&trader);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    trader.credit(3);
                }
            })
        };
        let debitor = {
            let trader = Arc::clone(&trader);
            thread::spawn(move || {
                let mut taken = 0u64;
                for _ in 0..10_000 {
                    if trader.debit(2) {
                        taken += 2;
                    }
                }
                taken
            })
        };

        creditor.join().unwrap();
        let taken = debitor.join().unwrap();
        assert_eq!(trader.balance() + taken, 30_000);
    }
}
