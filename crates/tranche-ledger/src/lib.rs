//! # tranche-ledger
//!
//! Fungible ledger primitives shared by the main instrument and every
//! deployment tranche.
//!
//! ## Components
//!
//! 1. **Ledger**: supply, balances, allowances, event log (no access control)
//! 2. **RoleSet / AdminRegistry**: admin membership, seeded by the creator
//! 3. **FrozenRegistry / FreezeGate**: frozen flags and the decorator that
//!    enforces them around a [`BaseLedger`]
//! 4. **SupplyConservation**: `total_supply == Σ balances == mints − burns`
//! 5. **ForeignLedger**: the view of external ledgers used by stray-asset recovery
//!
//! ## Call Flow
//!
//! ```text
//! host (access check) → FreezeGate (frozen check) → Ledger (checked arithmetic)
//! ```

pub mod foreign;
pub mod freeze_gate;
pub mod ledger;
pub mod roles;
pub mod supply_conservation;

pub use foreign::{ForeignLedger, ForeignLedgerDirectory, NoForeignLedgers};
pub use freeze_gate::{FreezeGate, FrozenRegistry};
pub use ledger::{BaseLedger, Ledger};
pub use roles::{AdminRegistry, RoleSet};
pub use supply_conservation::SupplyConservation;
