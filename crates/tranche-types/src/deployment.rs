//! Deployment (tranche) lifecycle types.
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────┐ start_lock_up ┌────────┐  now > unlock_time  ┌────────────┐
//!   │ MINTED ├──────────────▶│ LOCKED ├────────────────────▶│ UNLOCKABLE │
//!   └────────┘               └────────┘                     └────────────┘
//! ```
//!
//! Transitions are one-way. The lock-up cannot be re-armed or cancelled, and
//! the instrument is never destroyed; only individual holder balances are
//! retired by redemption once UNLOCKABLE.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::DeploymentId;

/// Lifecycle phase of a created tranche, derived from its unlock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentPhase {
    /// Supply minted, lock-up not yet started.
    Minted,
    /// Lock-up running; redemption refused.
    Locked,
    /// Lock-up elapsed; holders may redeem.
    Unlockable,
}

impl DeploymentPhase {
    /// Phase for a tranche with the given unlock time, observed at `now`.
    #[must_use]
    pub fn at(unlock_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match unlock_time {
            None => Self::Minted,
            Some(t) if now > t => Self::Unlockable,
            Some(_) => Self::Locked,
        }
    }

    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Minted, Self::Locked) | (Self::Locked, Self::Unlockable)
        )
    }
}

impl fmt::Display for DeploymentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minted => write!(f, "MINTED"),
            Self::Locked => write!(f, "LOCKED"),
            Self::Unlockable => write!(f, "UNLOCKABLE"),
        }
    }
}

/// Instrument label: the prefix followed by a two-digit tranche number.
#[must_use]
pub fn deployment_label(prefix: &str, id: DeploymentId) -> String {
    format!("{prefix}{:02}", id.get())
}
