//! Identity balances.
//!
//! Vault balances live inside each room's [`VaultRecord`]; everything else
//! (players' wallets, the fee recipient, winners) is held by a [`Bank`].
//! The hosting environment normally provides the bank. [`Ledger`] is the
//! in-memory one used by the host and tests.
//!
//! [`VaultRecord`]: palapa_protocol::VaultRecord

use std::collections::HashMap;

use palapa_protocol::{Identity, Lamports};

use crate::EscrowError;

/// A store of identity balances.
///
/// Both mutating methods are all-or-nothing: on error no balance changes.
pub trait Bank: Send + 'static {
    /// Current balance. Unknown identities have zero.
    fn balance(&self, owner: &Identity) -> Lamports;

    /// Removes `amount` from `owner`.
    ///
    /// # Errors
    /// `InsufficientBalance` if the owner holds less than `amount`.
    fn withdraw(&mut self, owner: &Identity, amount: Lamports) -> Result<(), EscrowError>;

    /// Credits every `(owner, amount)` pair, or none of them.
    ///
    /// # Errors
    /// `CalculationOverflow` if any resulting balance overflows.
    fn deposit_all(&mut self, credits: &[(Identity, Lamports)]) -> Result<(), EscrowError>;
}

/// An in-memory [`Bank`].
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    balances: HashMap<Identity, Lamports>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits a single identity.
    pub fn fund(&mut self, owner: Identity, amount: Lamports) -> Result<(), EscrowError> {
        self.deposit_all(&[(owner, amount)])
    }

    /// Sum of all balances, for conservation checks.
    pub fn total(&self) -> Option<Lamports> {
        self.balances
            .values()
            .try_fold(0u64, |acc, &b| acc.checked_add(b))
    }
}

impl Bank for Ledger {
    fn balance(&self, owner: &Identity) -> Lamports {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn withdraw(&mut self, owner: &Identity, amount: Lamports) -> Result<(), EscrowError> {
        if amount == 0 {
            return Ok(());
        }
        let available = self.balance(owner);
        let remaining = available
            .checked_sub(amount)
            .ok_or(EscrowError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        self.balances.insert(*owner, remaining);
        Ok(())
    }

    fn deposit_all(&mut self, credits: &[(Identity, Lamports)]) -> Result<(), EscrowError> {
        // Stage every new balance first; the same identity may appear twice.
        let mut staged: HashMap<Identity, Lamports> = HashMap::new();
        for (owner, amount) in credits {
            if *amount == 0 {
                continue;
            }
            let current = staged
                .get(owner)
                .copied()
                .unwrap_or_else(|| self.balance(owner));
            let next = current
                .checked_add(*amount)
                .ok_or(EscrowError::CalculationOverflow)?;
            staged.insert(*owner, next);
        }
        self.balances.extend(staged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(b: u8) -> Identity {
        Identity::new([b; 32])
    }

    #[test]
    fn test_withdraw_insufficient_returns_error_and_keeps_balance() {
        let mut ledger = Ledger::new();
        ledger.fund(id(1), 40).unwrap();
        let err = ledger.withdraw(&id(1), 100).unwrap_err();
        assert_eq!(
            err,
            EscrowError::InsufficientBalance {
                needed: 100,
                available: 40
            }
        );
        assert_eq!(ledger.balance(&id(1)), 40);
    }

    #[test]
    fn test_withdraw_exact_balance_leaves_zero() {
        let mut ledger = Ledger::new();
        ledger.fund(id(1), 100).unwrap();
        ledger.withdraw(&id(1), 100).unwrap();
        assert_eq!(ledger.balance(&id(1)), 0);
    }

    #[test]
    fn test_deposit_all_same_owner_twice_accumulates() {
        let mut ledger = Ledger::new();
        ledger.deposit_all(&[(id(1), 5), (id(1), 95)]).unwrap();
        assert_eq!(ledger.balance(&id(1)), 100);
    }

    #[test]
    fn test_deposit_all_overflow_changes_nothing() {
        let mut ledger = Ledger::new();
        ledger.fund(id(2), u64::MAX).unwrap();
        let result = ledger.deposit_all(&[(id(1), 10), (id(2), 1)]);
        assert_eq!(result, Err(EscrowError::CalculationOverflow));
        assert_eq!(ledger.balance(&id(1)), 0);
        assert_eq!(ledger.balance(&id(2)), u64::MAX);
    }

    #[test]
    fn test_total_sums_balances() {
        let mut ledger = Ledger::new();
        ledger.fund(id(1), 10).unwrap();
        ledger.fund(id(2), 32).unwrap();
        assert_eq!(ledger.total(), Some(42));
    }
}
