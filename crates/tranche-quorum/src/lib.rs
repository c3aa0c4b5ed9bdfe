//! # tranche-quorum
//!
//! **Governance Plane**: 2-of-3 authorization of privileged main-ledger
//! actions, and the serialized substrate everything runs on.
//!
//! ## Architecture
//!
//! 1. **QuorumAuthorizer**: three fixed principals; one files a proposal,
//!    a different one confirms it, and the action runs on the main ledger
//!    under the authorizer's own admin standing
//! 2. **Substrate**: one operation at a time, fresh sequence number per
//!    operation, non-decreasing clock, rollback of failed operations
//!
//! ## Actions
//!
//! | Action | Parameters |
//! |--------|------------|
//! | `ToggleFreeze` | target account, frozen flag |
//! | `RecoverTokens` | foreign ledger address |
//! | `AddAdmin` | new admin |
//! | `RenounceAdmin` | none; drops the authorizer's own admin role |

pub mod authorizer;
pub mod substrate;

pub use authorizer::QuorumAuthorizer;
pub use substrate::{Substrate, World};
