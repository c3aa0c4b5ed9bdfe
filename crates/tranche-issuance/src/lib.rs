//! # tranche-issuance
//!
//! **Issuance Plane**: sequential tranche creation, distribution, lock-up
//! and redemption back into the main instrument.
//!
//! ## Architecture
//!
//! 1. **schedule**: fixed five-band mint amounts keyed by tranche id
//! 2. **DeploymentInstrument**: one sub-ledger per tranche with a one-shot
//!    182-day lock-up clock and all-or-nothing redemption
//! 3. **MainLedger**: hosts the main ledger, the admin set, the shared
//!    frozen registry, and every tranche
//!
//! ## Tranche Flow
//!
//! ```text
//! create_deployment(k) → distribute → start_lock_up → (182 days) → redeem_unlocked
//!   mint k on tranche        tranche → holder              burn tranche, reserve → holder
//!   mint k on main (reserve)
//! ```
//!
//! Tranche `k > 1` can only be created once tranche `k − 1` exists.

pub mod deployment;
pub mod main_ledger;
pub mod schedule;

pub use deployment::DeploymentInstrument;
pub use main_ledger::MainLedger;
