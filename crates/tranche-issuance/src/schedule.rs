//! Fixed five-band mint schedule.
//!
//! | Tranches | Whole units per tranche |
//! |----------|-------------------------|
//! | 1        | 16,429,638              |
//! | 2–10     | 12,500,000              |
//! | 11–20    | 9,765,625               |
//! | 21–40    | 7,812,500               |
//! | 41–60    | 6,250,000               |
//!
//! Amounts are scaled by `10^decimals` of the instrument.

use tranche_types::{Amount, DeploymentId, Result, constants};

/// Whole units minted for a tranche.
#[must_use]
pub fn band_units(id: DeploymentId) -> u128 {
    match id.get() {
        1 => constants::BAND_1_UNITS,
        2..=10 => constants::BAND_2_UNITS,
        11..=20 => constants::BAND_3_UNITS,
        21..=40 => constants::BAND_4_UNITS,
        _ => constants::BAND_5_UNITS,
    }
}

/// Base units minted for a tranche at the given precision.
pub fn mint_amount(id: DeploymentId, decimals: u8) -> Result<Amount> {
    Amount::whole_units(band_units(id), decimals)
}

/// Base units minted across all tranches.
pub fn schedule_total(decimals: u8) -> Result<Amount> {
    DeploymentId::all().try_fold(Amount::ZERO, |acc, id| acc.checked_add(mint_amount(id, decimals)?))
}
