//! Error types for the tranche ledger.
//!
//! All errors use the `TR_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Principal / access-control errors
//! - 2xx: Balance and arithmetic errors
//! - 3xx: Deployment lifecycle errors
//! - 4xx: Quorum protocol errors
//! - 9xx: Configuration / internal errors
//!
//! Every variant is a *hard* failure: the enclosing operation is aborted and
//! any partial state change is discarded. Soft failures (the frozen gate on
//! transfers) are reported as `Ok(false)`, never through this enum.

use thiserror::Error;

use crate::{Amount, DeploymentId, Principal, SequenceNumber};

/// Central error enum for all tranche ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrancheError {
    // =================================================================
    // Principal / Access Errors (1xx)
    // =================================================================
    /// The null principal was supplied where a live principal is required.
    #[error("TR_ERR_100: Null principal not allowed: {context}")]
    NullPrincipal { context: &'static str },

    /// Caller is not the issuing principal of this instrument.
    #[error("TR_ERR_101: Caller {caller} is not the issuer")]
    NotIssuer { caller: Principal },

    /// Caller does not hold the admin role.
    #[error("TR_ERR_102: Caller {caller} is not an admin")]
    NotAdmin { caller: Principal },

    /// Role grant rejected because the principal already holds the role.
    #[error("TR_ERR_103: {account} already holds the role")]
    RoleAlreadyGranted { account: Principal },

    /// Role removal rejected because the principal does not hold the role.
    #[error("TR_ERR_104: {account} does not hold the role")]
    RoleNotHeld { account: Principal },

    /// Principal is frozen and may not be the subject of a burn.
    #[error("TR_ERR_105: Account {account} is frozen")]
    AccountFrozen { account: Principal },

    /// Component addresses act only through relays, never as direct callers.
    #[error("TR_ERR_106: {caller} is a component address")]
    ComponentCaller { caller: Principal },

    // =================================================================
    // Balance / Arithmetic Errors (2xx)
    // =================================================================
    /// Not enough balance to perform the operation.
    #[error("TR_ERR_200: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    /// Not enough allowance to perform the operation.
    #[error("TR_ERR_201: Insufficient allowance: need {needed}, have {available}")]
    InsufficientAllowance { needed: Amount, available: Amount },

    /// Checked addition or multiplication overflowed.
    #[error("TR_ERR_202: Arithmetic overflow")]
    ArithmeticOverflow,

    /// Checked subtraction underflowed.
    #[error("TR_ERR_203: Arithmetic underflow")]
    ArithmeticUnderflow,

    /// Division or remainder by zero.
    #[error("TR_ERR_204: Division by zero")]
    DivisionByZero,

    /// Ledger bookkeeping disagrees with itself.
    #[error("TR_ERR_205: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    /// A foreign ledger refused the recovery transfer.
    #[error("TR_ERR_206: Foreign ledger {ledger} rejected transfer of {amount}")]
    ForeignTransferFailed { ledger: Principal, amount: Amount },

    /// No foreign ledger is registered at this address.
    #[error("TR_ERR_207: Unknown foreign ledger {0}")]
    UnknownForeignLedger(Principal),

    // =================================================================
    // Deployment Lifecycle Errors (3xx)
    // =================================================================
    /// Tranche id outside the supported range.
    #[error("TR_ERR_300: Deployment id {0} out of range")]
    DeploymentOutOfRange(u8),

    /// A deployment with this id already exists.
    #[error("TR_ERR_301: Deployment {0} already exists")]
    DeploymentExists(DeploymentId),

    /// The predecessor tranche has not been created yet.
    #[error("TR_ERR_302: Deployment {id} requires deployment {missing} first")]
    DeploymentOutOfOrder {
        id: DeploymentId,
        missing: DeploymentId,
    },

    /// No deployment with this id exists.
    #[error("TR_ERR_303: Deployment {0} not found")]
    DeploymentNotFound(DeploymentId),

    /// The lock-up clock was already started.
    #[error("TR_ERR_304: Lock-up already started for deployment {0}")]
    LockUpAlreadyStarted(DeploymentId),

    /// Redemption attempted before any lock-up was started.
    #[error("TR_ERR_305: Lock-up not started for deployment {0}")]
    LockUpNotStarted(DeploymentId),

    /// Redemption attempted before the unlock time passed.
    #[error("TR_ERR_306: Deployment {id} locked until {unlock_time}")]
    StillLocked {
        id: DeploymentId,
        unlock_time: chrono::DateTime<chrono::Utc>,
    },

    // =================================================================
    // Quorum Errors (4xx)
    // =================================================================
    /// Caller is not one of the three quorum principals.
    #[error("TR_ERR_400: Caller {caller} is not a quorum principal")]
    NotQuorumPrincipal { caller: Principal },

    /// The slot for the current sequence number already holds a proposal.
    #[error("TR_ERR_401: Proposal slot {0} already occupied")]
    ProposalSlotOccupied(SequenceNumber),

    /// Confirmation parameters differ from the filed proposal.
    #[error("TR_ERR_402: Proposal {key} parameter mismatch")]
    ProposalParameterMismatch { key: SequenceNumber },

    /// The authorizer is bound to a different main ledger.
    #[error("TR_ERR_403: Authorizer bound to ledger {expected}, got {actual}")]
    LedgerMismatch {
        expected: Principal,
        actual: Principal,
    },

    /// Quorum principals must be three distinct, non-null principals.
    #[error("TR_ERR_404: Invalid quorum: {reason}")]
    InvalidQuorum { reason: String },

    // =================================================================
    // Configuration / Internal (9xx)
    // =================================================================
    /// Invalid configuration.
    #[error("TR_ERR_900: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("TR_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// The substrate clock may not move backwards.
    #[error("TR_ERR_902: Clock regression")]
    ClockRegression,

    /// Time arithmetic left the representable range.
    #[error("TR_ERR_903: Clock overflow")]
    ClockOverflow,
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, TrancheError>;

impl From<serde_json::Error> for TrancheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_display() {
        let err = TrancheError::InsufficientBalance {
            needed: Amount::new(100),
            available: Amount::new(50),
        };
        let msg = format!("{err}");
        assert!(msg.starts_with("TR_ERR_200"), "Got: {msg}");
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn all_errors_have_tr_err_prefix() {
        let errors = vec![
            TrancheError::NullPrincipal { context: "mint" },
            TrancheError::ArithmeticOverflow,
            TrancheError::DeploymentOutOfRange(61),
            TrancheError::ProposalSlotOccupied(SequenceNumber(7)),
            TrancheError::Configuration("bad".into()),
            TrancheError::ClockOverflow,
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("TR_ERR_"),
                "Error missing TR_ERR_ prefix: {msg}"
            );
        }
    }

    #[test]
    fn serde_json_error_converts() {
        let err: TrancheError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, TrancheError::Serialization(_)));
    }
}
