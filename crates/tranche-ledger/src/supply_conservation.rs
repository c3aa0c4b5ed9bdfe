//! Supply conservation invariant checker.
//!
//! Invariant enforced for every instrument after every operation:
//! ```text
//! total_supply == Σ balances == Σ mints − Σ burns
//! ```
//!
//! Transfers move balance between principals and never change either side.

use serde::{Deserialize, Serialize};
use tranche_types::{Amount, Result, TrancheError};

/// Tracks lifetime mint and burn totals of one instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyConservation {
    minted: Amount,
    burned: Amount,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_mint(&mut self, amount: Amount) -> Result<()> {
        self.minted = self.minted.checked_add(amount)?;
        Ok(())
    }

    pub fn record_burn(&mut self, amount: Amount) -> Result<()> {
        self.burned = self.burned.checked_add(amount)?;
        Ok(())
    }

    /// Expected total supply: mints − burns.
    pub fn expected_supply(&self) -> Result<Amount> {
        self.minted.checked_sub(self.burned)
    }

    #[must_use]
    pub fn total_minted(&self) -> Amount {
        self.minted
    }

    #[must_use]
    pub fn total_burned(&self) -> Amount {
        self.burned
    }

    /// Verify the recorded supply and the sum of balances against the
    /// mint/burn history.
    ///
    /// # Errors
    /// Returns [`TrancheError::SupplyInvariantViolation`] on any disagreement.
    pub fn verify(&self, total_supply: Amount, sum_of_balances: Amount) -> Result<()> {
        let expected = self.expected_supply()?;
        if total_supply != sum_of_balances || total_supply != expected {
            return Err(TrancheError::SupplyInvariantViolation {
                reason: format!(
                    "total_supply {total_supply}, balances {sum_of_balances}, expected {expected} \
                     (minted={}, burned={})",
                    self.minted, self.burned
                ),
            });
        }
        Ok(())
    }
}
