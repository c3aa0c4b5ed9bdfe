//! Frozen-account registry and the gate that enforces it.
//!
//! [`FreezeGate`] decorates any [`BaseLedger`]: it checks the frozen flags of
//! the principals involved, then delegates. Transfers touching a frozen
//! principal are a *soft* failure (`Ok(false)`, nothing moves); burns of a
//! frozen principal's balance are a *hard* failure.
//!
//! Mint, allowance-setting and balance queries are not gated.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tranche_types::{Amount, LedgerEvent, Principal, Result, TrancheError};

use crate::ledger::BaseLedger;

/// Per-principal frozen flags (default: not frozen).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenRegistry {
    frozen: BTreeSet<Principal>,
}

impl FrozenRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_frozen(&self, account: Principal) -> bool {
        self.frozen.contains(&account)
    }

    /// Set `account`'s flag. Returns the event to record, or `None` when the
    /// flag already had the requested value.
    pub fn set_frozen(&mut self, account: Principal, frozen: bool) -> Result<Option<LedgerEvent>> {
        account.ensure_live("freeze target")?;
        if self.is_frozen(account) == frozen {
            return Ok(None);
        }
        if frozen {
            self.frozen.insert(account);
            Ok(Some(LedgerEvent::Freeze { account }))
        } else {
            self.frozen.remove(&account);
            Ok(Some(LedgerEvent::Unfreeze { account }))
        }
    }

    #[must_use]
    pub fn frozen_count(&self) -> usize {
        self.frozen.len()
    }
}

/// Gate-check-then-delegate wrapper over a ledger.
pub struct FreezeGate<'a, L: BaseLedger + ?Sized> {
    frozen: &'a FrozenRegistry,
    ledger: &'a mut L,
}

impl<'a, L: BaseLedger + ?Sized> FreezeGate<'a, L> {
    pub fn new(frozen: &'a FrozenRegistry, ledger: &'a mut L) -> Self {
        Self { frozen, ledger }
    }

    fn blocked(&self, from: Principal, to: Principal) -> bool {
        if self.frozen.is_frozen(from) || self.frozen.is_frozen(to) {
            tracing::debug!(%from, %to, "Transfer refused: frozen principal");
            true
        } else {
            false
        }
    }

    fn ensure_not_frozen(&self, account: Principal) -> Result<()> {
        if self.frozen.is_frozen(account) {
            Err(TrancheError::AccountFrozen { account })
        } else {
            Ok(())
        }
    }

    /// `Ok(false)` if either side is frozen; otherwise delegates.
    pub fn transfer(&mut self, from: Principal, to: Principal, amount: Amount) -> Result<bool> {
        if self.blocked(from, to) {
            return Ok(false);
        }
        self.ledger.transfer(from, to, amount)?;
        Ok(true)
    }

    /// `Ok(false)` if either side is frozen; otherwise delegates.
    pub fn transfer_from(
        &mut self,
        spender: Principal,
        from: Principal,
        to: Principal,
        amount: Amount,
    ) -> Result<bool> {
        if self.blocked(from, to) {
            return Ok(false);
        }
        self.ledger.transfer_from(spender, from, to, amount)?;
        Ok(true)
    }

    /// # Errors
    /// `AccountFrozen` if `account` is frozen.
    pub fn burn(&mut self, account: Principal, amount: Amount) -> Result<()> {
        self.ensure_not_frozen(account)?;
        self.ledger.burn(account, amount)
    }

    /// # Errors
    /// `AccountFrozen` if `account` is frozen.
    pub fn burn_from(&mut self, spender: Principal, account: Principal, amount: Amount) -> Result<()> {
        self.ensure_not_frozen(account)?;
        self.ledger.burn_from(spender, account, amount)
    }

    #[must_use]
    pub fn balance_of(&self, account: Principal) -> Amount {
        self.ledger.balance_of(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ledger;

    fn funded() -> (Ledger, Principal, Principal) {
        let mut ledger = Ledger::new(Principal::random(), "Test", "TST", 0);
        let (alice, bob) = (Principal::random(), Principal::random());
        ledger.mint(alice, Amount::new(100)).unwrap();
        (ledger, alice, bob)
    }

    #[test]
    fn set_frozen_is_idempotent() {
        let mut registry = FrozenRegistry::new();
        let a = Principal::random();
        assert_eq!(
            registry.set_frozen(a, true).unwrap(),
            Some(LedgerEvent::Freeze { account: a })
        );
        assert_eq!(registry.set_frozen(a, true).unwrap(), None);
        assert_eq!(
            registry.set_frozen(a, false).unwrap(),
            Some(LedgerEvent::Unfreeze { account: a })
        );
        assert_eq!(registry.set_frozen(a, false).unwrap(), None);
        assert!(registry.set_frozen(Principal::NULL, true).is_err());
    }

    #[test]
    fn registry_serializes_as_list() {
        let mut registry = FrozenRegistry::new();
        registry.set_frozen(Principal::random(), true).unwrap();
        let json = serde_json::to_string(&registry).unwrap();
        let back: FrozenRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, registry);
        assert_eq!(back.frozen_count(), 1);
    }

    #[test]
    fn transfer_passes_when_unfrozen() {
        let (mut ledger, alice, bob) = funded();
        let registry = FrozenRegistry::new();
        let moved = FreezeGate::new(&registry, &mut ledger)
            .transfer(alice, bob, Amount::new(10))
            .unwrap();
        assert!(moved);
        assert_eq!(ledger.balance_of(bob), Amount::new(10));
    }

    #[test]
    fn frozen_source_or_destination_soft_fails() {
        let (mut ledger, alice, bob) = funded();
        let mut registry = FrozenRegistry::new();
        registry.set_frozen(alice, true).unwrap();

        let mut gate = FreezeGate::new(&registry, &mut ledger);
        assert!(!gate.transfer(alice, bob, Amount::new(10)).unwrap());
        assert!(!gate.transfer(bob, alice, Amount::ZERO).unwrap());
        assert_eq!(gate.balance_of(alice), Amount::new(100));
        assert_eq!(ledger.events().len(), 1, "only the mint event");
    }

    #[test]
    fn frozen_transfer_from_soft_fails() {
        let (mut ledger, alice, bob) = funded();
        let spender = Principal::random();
        ledger.approve(alice, spender, Amount::new(50)).unwrap();
        let mut registry = FrozenRegistry::new();
        registry.set_frozen(bob, true).unwrap();

        let moved = FreezeGate::new(&registry, &mut ledger)
            .transfer_from(spender, alice, bob, Amount::new(5))
            .unwrap();
        assert!(!moved);
        assert_eq!(ledger.allowance(alice, spender), Amount::new(50));
    }

    #[test]
    fn frozen_burn_hard_fails() {
        let (mut ledger, alice, _) = funded();
        let mut registry = FrozenRegistry::new();
        registry.set_frozen(alice, true).unwrap();
        let err = FreezeGate::new(&registry, &mut ledger)
            .burn(alice, Amount::new(1))
            .unwrap_err();
        assert_eq!(err, TrancheError::AccountFrozen { account: alice });
        assert_eq!(ledger.total_supply(), Amount::new(100));
    }

    #[test]
    fn frozen_burn_from_hard_fails() {
        let (mut ledger, alice, _) = funded();
        let spender = Principal::random();
        ledger.approve(alice, spender, Amount::new(10)).unwrap();
        let mut registry = FrozenRegistry::new();
        registry.set_frozen(alice, true).unwrap();
        assert!(
            FreezeGate::new(&registry, &mut ledger)
                .burn_from(spender, alice, Amount::new(1))
                .is_err()
        );
    }

    #[test]
    fn gated_errors_still_propagate() {
        let (mut ledger, alice, bob) = funded();
        let registry = FrozenRegistry::new();
        let err = FreezeGate::new(&registry, &mut ledger)
            .transfer(alice, bob, Amount::new(1_000))
            .unwrap_err();
        assert!(matches!(err, TrancheError::InsufficientBalance { .. }));
    }
}
