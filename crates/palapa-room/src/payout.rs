//! Payout arithmetic and vault transfers.

use palapa_protocol::{Lamports, VaultRecord};

use crate::{EscrowError, FeeRate};

/// How a vault is split between the service and the winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoutPlan {
    pub pool: Lamports,
    pub service_fee: Lamports,
    pub prize_share: Lamports,
}

impl PayoutPlan {
    /// Splits `pool` with a single floor division.
    ///
    /// `service_fee + prize_share == pool` for every successful plan.
    pub fn compute(pool: Lamports, rate: FeeRate) -> Result<Self, EscrowError> {
        let service_fee = rate.fee_on(pool).ok_or(EscrowError::CalculationOverflow)?;
        let prize_share = pool
            .checked_sub(service_fee)
            .ok_or(EscrowError::InsufficientFundsForPayout)?;
        Ok(Self {
            pool,
            service_fee,
            prize_share,
        })
    }
}

/// Adds `amount` to an open vault.
pub fn deposit_to_vault(vault: &mut VaultRecord, amount: Lamports) -> Result<(), EscrowError> {
    vault.balance = vault
        .balance
        .checked_add(amount)
        .ok_or(EscrowError::CalculationOverflow)?;
    Ok(())
}

/// Removes `amount` from a vault. Zero is a no-op.
pub fn withdraw_from_vault(vault: &mut VaultRecord, amount: Lamports) -> Result<(), EscrowError> {
    if amount == 0 {
        return Ok(());
    }
    vault.balance = vault
        .balance
        .checked_sub(amount)
        .ok_or(EscrowError::InsufficientFundsForPayout)?;
    Ok(())
}
