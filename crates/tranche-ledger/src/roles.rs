//! Role membership and the admin registry.
//!
//! [`RoleSet`] is the generic "does principal X hold role R" primitive.
//! [`AdminRegistry`] layers admin semantics on top: seeded with its creator,
//! grows through admin-gated grants, and shrinks only through self-removal.
//!
//! There is no floor on the admin set. Renouncing the last admin leaves every
//! admin-gated operation permanently unreachable.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tranche_types::{LedgerEvent, Principal, Result, TrancheError};

/// Set of principals holding one role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet {
    members: BTreeSet<Principal>,
}

impl RoleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has(&self, account: Principal) -> bool {
        self.members.contains(&account)
    }

    /// # Errors
    /// `NullPrincipal` for the null principal, `RoleAlreadyGranted` if
    /// `account` is already a member.
    pub fn add(&mut self, account: Principal) -> Result<()> {
        account.ensure_live("role grant")?;
        if !self.members.insert(account) {
            return Err(TrancheError::RoleAlreadyGranted { account });
        }
        Ok(())
    }

    /// # Errors
    /// `NullPrincipal` for the null principal, `RoleNotHeld` if `account`
    /// is not a member.
    pub fn remove(&mut self, account: Principal) -> Result<()> {
        account.ensure_live("role removal")?;
        if !self.members.remove(&account) {
            return Err(TrancheError::RoleNotHeld { account });
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Principal> + '_ {
        self.members.iter().copied()
    }
}

/// Administrators of one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRegistry {
    admins: RoleSet,
}

impl AdminRegistry {
    /// Registry whose only admin is `creator`.
    pub fn new(creator: Principal) -> Result<Self> {
        let mut admins = RoleSet::new();
        admins.add(creator)?;
        Ok(Self { admins })
    }

    #[must_use]
    pub fn is_admin(&self, account: Principal) -> bool {
        self.admins.has(account)
    }

    pub fn ensure_admin(&self, caller: Principal) -> Result<()> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(TrancheError::NotAdmin { caller })
        }
    }

    /// Grant the admin role. Only an existing admin may call.
    ///
    /// Returns the event for the host to record.
    pub fn add_admin(&mut self, caller: Principal, account: Principal) -> Result<LedgerEvent> {
        self.ensure_admin(caller)?;
        self.admins.add(account)?;
        tracing::info!(%caller, %account, "Admin added");
        Ok(LedgerEvent::AdminAdded { account })
    }

    /// Remove the caller's own admin role.
    pub fn renounce_admin(&mut self, caller: Principal) -> Result<LedgerEvent> {
        self.admins.remove(caller)?;
        if self.admins.is_empty() {
            tracing::warn!(%caller, "Last admin renounced; admin-gated operations are now unreachable");
        } else {
            tracing::info!(%caller, "Admin renounced");
        }
        Ok(LedgerEvent::AdminRemoved { account: caller })
    }

    #[must_use]
    pub fn admins(&self) -> &RoleSet {
        &self.admins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_set_rejects_redundant_changes() {
        let mut roles = RoleSet::new();
        let a = Principal::random();
        roles.add(a).unwrap();
        assert!(roles.has(a));
        assert_eq!(roles.add(a), Err(TrancheError::RoleAlreadyGranted { account: a }));
        roles.remove(a).unwrap();
        assert_eq!(roles.remove(a), Err(TrancheError::RoleNotHeld { account: a }));
    }

    #[test]
    fn role_set_rejects_null() {
        let mut roles = RoleSet::new();
        assert!(roles.add(Principal::NULL).is_err());
        assert!(roles.remove(Principal::NULL).is_err());
    }

    #[test]
    fn creator_is_seeded() {
        let creator = Principal::random();
        let registry = AdminRegistry::new(creator).unwrap();
        assert!(registry.is_admin(creator));
        assert_eq!(registry.admins().len(), 1);
        assert!(AdminRegistry::new(Principal::NULL).is_err());
    }

    #[test]
    fn only_admin_can_add() {
        let creator = Principal::random();
        let mut registry = AdminRegistry::new(creator).unwrap();
        let outsider = Principal::random();
        let err = registry.add_admin(outsider, outsider).unwrap_err();
        assert_eq!(err, TrancheError::NotAdmin { caller: outsider });

        let event = registry.add_admin(creator, outsider).unwrap();
        assert_eq!(event, LedgerEvent::AdminAdded { account: outsider });
        assert!(registry.is_admin(outsider));
    }

    #[test]
    fn renounce_can_empty_the_set() {
        let creator = Principal::random();
        let mut registry = AdminRegistry::new(creator).unwrap();
        let event = registry.renounce_admin(creator).unwrap();
        assert_eq!(event, LedgerEvent::AdminRemoved { account: creator });
        assert!(registry.admins().is_empty());
        // Nobody can add an admin any more.
        assert!(registry.add_admin(creator, creator).is_err());
    }

    #[test]
    fn non_admin_cannot_renounce() {
        let mut registry = AdminRegistry::new(Principal::random()).unwrap();
        let outsider = Principal::random();
        assert_eq!(
            registry.renounce_admin(outsider),
            Err(TrancheError::RoleNotHeld { account: outsider })
        );
    }
}
