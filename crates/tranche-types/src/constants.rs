//! System-wide constants for the tranche ledger.

/// Highest tranche id. Tranches are created densely from 1.
pub const MAX_DEPLOYMENTS: u8 = 60;

/// Lock-up length applied once per tranche by `start_lock_up`.
pub const LOCK_UP_DAYS: i64 = 182;

/// Default decimal precision for the main and deployment instruments.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Highest supported decimal precision (`10^18` still fits a `u64` scale).
pub const MAX_DECIMALS: u8 = 18;

/// Default main instrument name.
pub const DEFAULT_NAME: &str = "Tranche Main";

/// Default main instrument symbol.
pub const DEFAULT_SYMBOL: &str = "TRM";

/// Default prefix for deployment instrument names (`"Tranche Deployment 07"`).
pub const DEFAULT_DEPLOYMENT_NAME_PREFIX: &str = "Tranche Deployment ";

/// Default prefix for deployment instrument symbols (`"TD07"`).
pub const DEFAULT_DEPLOYMENT_SYMBOL_PREFIX: &str = "TD";

// ---------------------------------------------------------------------------
// Mint schedule, in whole units (scaled by `10^decimals` at mint time).
// ---------------------------------------------------------------------------

/// Tranche 1.
pub const BAND_1_UNITS: u128 = 16_429_638;

/// Tranches 2..=10.
pub const BAND_2_UNITS: u128 = 12_500_000;

/// Tranches 11..=20.
pub const BAND_3_UNITS: u128 = 9_765_625;

/// Tranches 21..=40.
pub const BAND_4_UNITS: u128 = 7_812_500;

/// Tranches 41..=60.
pub const BAND_5_UNITS: u128 = 6_250_000;

/// Sum of every band over all 60 tranches, in whole units.
pub const SCHEDULE_TOTAL_UNITS: u128 = 507_835_888;

/// Nonce used to derive the quorum authorizer's address from the main ledger.
/// Deployment instruments use their tranche id (1..=60) as nonce.
pub const QUORUM_ADDRESS_NONCE: u64 = 1_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
