//! Quorum proposal types.
//!
//! ## Slot Lifecycle
//!
//! ```text
//!   (unused) ──file at seq S──▶ PENDING ──confirm by another principal──▶ (unused)
//!                                  │
//!                                  └── never confirmed: stays PENDING forever
//! ```
//!
//! A slot holds at most one live proposal. Executing a proposal resets the
//! slot to unused; there is no timeout and no cleanup of stale proposals.

use serde::{Deserialize, Serialize};

use crate::{Principal, SequenceNumber};

/// The privileged actions a quorum may authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    /// Set the frozen flag of `address` to `flag`.
    ToggleFreeze,
    /// Recover the main ledger's balance of the foreign ledger at `address`.
    RecoverTokens,
    /// Grant the admin role to `address`.
    AddAdmin,
    /// Remove the authorizer's own admin role on the main ledger.
    RenounceAdmin,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToggleFreeze => write!(f, "TOGGLE_FREEZE"),
            Self::RecoverTokens => write!(f, "RECOVER_TOKENS"),
            Self::AddAdmin => write!(f, "ADD_ADMIN"),
            Self::RenounceAdmin => write!(f, "RENOUNCE_ADMIN"),
        }
    }
}

/// Parameters carried by a proposal. Meaning depends on the [`ActionType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionParams {
    pub address: Principal,
    pub flag: bool,
}

impl ActionParams {
    #[must_use]
    pub fn new(address: Principal, flag: bool) -> Self {
        Self { address, flag }
    }

    /// Parameters for actions that take none.
    #[must_use]
    pub fn none() -> Self {
        Self {
            address: Principal::NULL,
            flag: false,
        }
    }
}

/// A filed, not yet executed, proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub action: ActionType,
    pub proposer: Principal,
    pub params: ActionParams,
}

/// Which slot a `propose_or_confirm` call addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalRef {
    /// File a new proposal at the current sequence number.
    New,
    /// Confirm the proposal filed at this sequence number.
    Confirm(SequenceNumber),
}

impl From<u64> for ProposalRef {
    /// Zero is the "new proposal" sentinel.
    fn from(raw: u64) -> Self {
        if raw == 0 {
            Self::New
        } else {
            Self::Confirm(SequenceNumber(raw))
        }
    }
}

/// Why a confirmation was tolerated as a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    /// Nothing is filed at the named slot (never used or already executed).
    EmptySlot,
    /// The proposer tried to confirm their own proposal.
    SelfConfirmation,
    /// The slot holds a proposal for a different action.
    ActionMismatch,
}

/// Result of a successful `propose_or_confirm` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuorumOutcome {
    /// Phase one: proposal filed under this key.
    Proposed(SequenceNumber),
    /// Phase two: the action was executed and the slot reset.
    Executed(ActionType),
    /// Tolerated no-op; no state changed.
    Ignored(IgnoreReason),
}
