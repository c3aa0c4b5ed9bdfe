//! Identifiers used throughout the tranche ledger.
//!
//! Principals are 20-byte addresses. Addresses of hosted components (the main
//! ledger, its deployment instruments, the quorum authorizer) are derived
//! deterministically from their parent with SHA-256, so every replica of the
//! substrate computes the same address for the same creation.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{TrancheError, constants};

// ---------------------------------------------------------------------------
// Principal
// ---------------------------------------------------------------------------

/// Opaque identity of an account, instrument, or authorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Principal(pub [u8; 20]);

impl Principal {
    /// The null principal. Never a live role holder, balance key, or proposer.
    pub const NULL: Self = Self([0u8; 20]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Deterministic principal for a named participant.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"tranche:principal:v1:");
        hasher.update(label.as_bytes());
        Self::truncate(&hasher.finalize())
    }

    /// Address of the `nonce`-th component created by `parent`.
    #[must_use]
    pub fn derive_child(parent: Self, nonce: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"tranche:address:v1:");
        hasher.update(parent.0);
        hasher.update(nonce.to_le_bytes());
        Self::truncate(&hasher.finalize())
    }

    fn truncate(digest: &[u8]) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Self(bytes)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Reject the null principal with a context tag for the error.
    pub fn ensure_live(self, context: &'static str) -> crate::Result<Self> {
        if self.is_null() {
            Err(TrancheError::NullPrincipal { context })
        } else {
            Ok(self)
        }
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Principal {
    /// Random non-null principal for tests.
    pub fn random() -> Self {
        loop {
            let candidate = Self(rand::random::<[u8; 20]>());
            if !candidate.is_null() {
                return candidate;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DeploymentId
// ---------------------------------------------------------------------------

/// Tranche identifier, always within `1..=MAX_DEPLOYMENTS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DeploymentId(u8);

impl DeploymentId {
    pub const FIRST: Self = Self(1);

    /// Validate a raw tranche id.
    pub fn new(raw: u8) -> crate::Result<Self> {
        if (1..=constants::MAX_DEPLOYMENTS).contains(&raw) {
            Ok(Self(raw))
        } else {
            Err(TrancheError::DeploymentOutOfRange(raw))
        }
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// The tranche that must exist before this one, if any.
    #[must_use]
    pub fn predecessor(self) -> Option<Self> {
        (self.0 > 1).then(|| Self(self.0 - 1))
    }

    /// Iterate every valid tranche id in creation order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=constants::MAX_DEPLOYMENTS).map(Self)
    }
}

impl TryFrom<u8> for DeploymentId {
    type Error = TrancheError;

    fn try_from(raw: u8) -> crate::Result<Self> {
        Self::new(raw)
    }
}

impl From<DeploymentId> for u8 {
    fn from(id: DeploymentId) -> Self {
        id.0
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tranche:{:02}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SequenceNumber
// ---------------------------------------------------------------------------

/// Monotonically increasing identifier of one unit of execution.
///
/// Issued by the substrate starting at 1, so a zero value never names a
/// real operation. Used as the proposal slot key by the quorum authorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SequenceNumber(pub u64);

impl SequenceNumber {
    /// # Errors
    /// `ArithmeticOverflow` past `u64::MAX`.
    pub fn next(self) -> crate::Result<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or(TrancheError::ArithmeticOverflow)
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seq:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_principals_are_deterministic() {
        assert_eq!(Principal::from_label("alice"), Principal::from_label("alice"));
        assert_ne!(Principal::from_label("alice"), Principal::from_label("bob"));
    }

    #[test]
    fn derived_children_differ_by_nonce() {
        let parent = Principal::from_label("issuer");
        let a = Principal::derive_child(parent, 1);
        let b = Principal::derive_child(parent, 2);
        assert_ne!(a, b);
        assert_eq!(a, Principal::derive_child(parent, 1));
        assert!(!a.is_null());
    }

    #[test]
    fn null_principal_rejected() {
        let err = Principal::NULL.ensure_live("test").unwrap_err();
        assert!(matches!(err, TrancheError::NullPrincipal { context: "test" }));
        assert!(Principal::random().ensure_live("test").is_ok());
    }

    #[test]
    fn display_is_hex_address() {
        let p = Principal::from_bytes([0xab; 20]);
        assert_eq!(format!("{p}"), format!("0x{}", "ab".repeat(20)));
    }

    #[test]
    fn deployment_id_bounds() {
        assert!(DeploymentId::new(0).is_err());
        assert!(DeploymentId::new(1).is_ok());
        assert!(DeploymentId::new(60).is_ok());
        assert!(matches!(
            DeploymentId::new(61),
            Err(TrancheError::DeploymentOutOfRange(61))
        ));
    }

    #[test]
    fn deployment_id_predecessor() {
        assert_eq!(DeploymentId::FIRST.predecessor(), None);
        let ten = DeploymentId::new(10).unwrap();
        assert_eq!(ten.predecessor(), Some(DeploymentId::new(9).unwrap()));
        assert_eq!(DeploymentId::all().count(), 60);
    }

    #[test]
    fn deployment_id_serde_validates() {
        let id: DeploymentId = serde_json::from_str("7").unwrap();
        assert_eq!(id.get(), 7);
        assert!(serde_json::from_str::<DeploymentId>("0").is_err());
        assert!(serde_json::from_str::<DeploymentId>("61").is_err());
    }

    #[test]
    fn sequence_next() {
        assert_eq!(SequenceNumber(5).next(), Ok(SequenceNumber(6)));
        assert_eq!(
            SequenceNumber(u64::MAX).next(),
            Err(TrancheError::ArithmeticOverflow)
        );
    }
}
