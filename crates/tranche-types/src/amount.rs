//! Checked unsigned amounts (raw base units).
//!
//! Every operation fails instead of wrapping: overflow, underflow and a zero
//! divisor are reported as [`TrancheError`] variants.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::{Result, TrancheError, constants};

/// A non-negative quantity of an instrument, in base units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Amount(pub u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn raw(self) -> u128 {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(TrancheError::ArithmeticOverflow)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(TrancheError::ArithmeticUnderflow)
    }

    pub fn checked_mul(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_mul(rhs.0)
            .map(Self)
            .ok_or(TrancheError::ArithmeticOverflow)
    }

    pub fn checked_div(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_div(rhs.0)
            .map(Self)
            .ok_or(TrancheError::DivisionByZero)
    }

    pub fn checked_rem(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_rem(rhs.0)
            .map(Self)
            .ok_or(TrancheError::DivisionByZero)
    }

    /// `10^decimals` as an amount.
    pub fn unit(decimals: u8) -> Result<Self> {
        10u128
            .checked_pow(u32::from(decimals))
            .map(Self)
            .ok_or(TrancheError::ArithmeticOverflow)
    }

    /// Whole units scaled by the instrument's decimal precision.
    pub fn whole_units(units: u128, decimals: u8) -> Result<Self> {
        Self(units).checked_mul(Self::unit(decimals)?)
    }

    /// Human-readable value, e.g. `1000.5` for `1_000_500_000_000_000_000_000`
    /// at 18 decimals.
    pub fn to_units(self, decimals: u8) -> Result<Decimal> {
        if decimals > constants::MAX_DECIMALS {
            return Err(TrancheError::Configuration(format!(
                "decimals {decimals} exceeds {}",
                constants::MAX_DECIMALS
            )));
        }
        let raw = i128::try_from(self.0).map_err(|_| TrancheError::ArithmeticOverflow)?;
        Decimal::try_from_i128_with_scale(raw, u32::from(decimals))
            .map(|d| d.normalize())
            .map_err(|_| TrancheError::ArithmeticOverflow)
    }

    /// Parse a human-readable value back into base units.
    ///
    /// Rejects negative values and values with more fractional digits than
    /// the instrument supports.
    pub fn from_units(units: Decimal, decimals: u8) -> Result<Self> {
        if units.is_sign_negative() && !units.is_zero() {
            return Err(TrancheError::ArithmeticUnderflow);
        }
        if decimals > constants::MAX_DECIMALS {
            return Err(TrancheError::Configuration(format!(
                "decimals {decimals} exceeds {}",
                constants::MAX_DECIMALS
            )));
        }
        let scale = Decimal::from(10u64.pow(u32::from(decimals)));
        let scaled = units
            .checked_mul(scale)
            .ok_or(TrancheError::ArithmeticOverflow)?;
        if !scaled.fract().is_zero() {
            return Err(TrancheError::Configuration(format!(
                "{units} has more than {decimals} fractional digits"
            )));
        }
        scaled
            .to_u128()
            .map(Self)
            .ok_or(TrancheError::ArithmeticOverflow)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}
