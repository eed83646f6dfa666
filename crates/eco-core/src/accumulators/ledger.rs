//! Currency Ledger

use std::cell::Cell;

/// A balance that upgrades are paid from.
pub trait CurrencyLedger {
    /// Current balance.
    fn balance(&self) -> u64;

    /// Deducts `amount` if the balance covers it. Returns whether it did.
    fn try_subtract(&self, amount: u32) -> bool;
}

/// In-memory currency balance.
#[derive(Debug, Default)]
pub struct Money {
    amount: Cell<u64>,
}

impl Money {
    pub fn new(initial: u64) -> Self {
        Self {
            amount: Cell::new(initial),
        }
    }

    pub fn amount(&self) -> u64 {
        self.amount.get()
    }

    /// Adds income to the balance.
    pub fn deposit(&self, amount: u64) {
        self.amount.set(self.amount.get().saturating_add(amount));
    }
}

impl CurrencyLedger for Money {
    fn balance(&self) -> u64 {
        self.amount()
    }

    fn try_subtract(&self, amount: u32) -> bool {
        let current = self.amount.get();
        match current.checked_sub(u64::from(amount)) {
            Some(remaining) => {
                self.amount.set(remaining);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtract_when_sufficient() {
        let money = Money::new(100);
        assert!(money.try_subtract(60));
        assert_eq!(money.balance(), 40);
        assert!(money.try_subtract(40));
        assert_eq!(money.balance(), 0);
    }

    #[test]
    fn test_subtract_refused_leaves_balance() {
        let money = Money::new(30);
        assert!(!money.try_subtract(31));
        assert_eq!(money.balance(), 30);
    }

    #[test]
    fn test_deposit_saturates() {
        let money = Money::new(u64::MAX - 1);
        money.deposit(10);
        assert_eq!(money.amount(), u64::MAX);
    }
}
