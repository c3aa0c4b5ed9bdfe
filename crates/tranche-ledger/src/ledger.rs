//! Base fungible ledger.
//!
//! Tracks supply, per-principal balances and per-(owner, spender) allowances
//! for one instrument. Every mutation is validate-then-commit: all checked
//! arithmetic is evaluated before any field is written, so a failed call
//! leaves the ledger and its event log untouched.
//!
//! The ledger performs no access control and knows nothing about frozen
//! accounts; hosts wrap it in a [`FreezeGate`](crate::FreezeGate) and check
//! callers themselves.

use std::collections::BTreeMap;

use tranche_types::{Amount, EventLog, LedgerEvent, Principal, Result, TrancheError};

use crate::supply_conservation::SupplyConservation;

/// The balance-moving capability a [`FreezeGate`](crate::FreezeGate) decorates.
pub trait BaseLedger {
    fn balance_of(&self, account: Principal) -> Amount;

    fn transfer(&mut self, from: Principal, to: Principal, amount: Amount) -> Result<()>;

    fn transfer_from(
        &mut self,
        spender: Principal,
        from: Principal,
        to: Principal,
        amount: Amount,
    ) -> Result<()>;

    fn burn(&mut self, account: Principal, amount: Amount) -> Result<()>;

    fn burn_from(&mut self, spender: Principal, account: Principal, amount: Amount) -> Result<()>;
}

/// Balance sheet of a single instrument.
#[derive(Debug, Clone)]
pub struct Ledger {
    address: Principal,
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: Amount,
    /// Non-zero balances only; absent keys read as zero.
    balances: BTreeMap<Principal, Amount>,
    allowances: BTreeMap<(Principal, Principal), Amount>,
    history: SupplyConservation,
    events: EventLog,
}

impl Ledger {
    #[must_use]
    pub fn new(
        address: Principal,
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
    ) -> Self {
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            total_supply: Amount::ZERO,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            history: SupplyConservation::new(),
            events: EventLog::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Metadata / queries
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn address(&self) -> Principal {
        self.address
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    #[must_use]
    pub fn balance_of(&self, account: Principal) -> Amount {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn allowance(&self, owner: Principal, spender: Principal) -> Amount {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Principals with a non-zero balance, in address order.
    pub fn holders(&self) -> impl Iterator<Item = (Principal, Amount)> + '_ {
        self.balances.iter().map(|(p, a)| (*p, *a))
    }

    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Record an event attributed to this instrument by its host
    /// (freeze toggles, admin changes).
    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.emit(event);
    }

    #[must_use]
    pub fn history(&self) -> &SupplyConservation {
        &self.history
    }

    pub fn sum_of_balances(&self) -> Result<Amount> {
        self.balances
            .values()
            .try_fold(Amount::ZERO, |acc, b| acc.checked_add(*b))
    }

    /// Check `total_supply == Σ balances == mints − burns`.
    pub fn verify_supply(&self) -> Result<()> {
        self.history.verify(self.total_supply, self.sum_of_balances()?)
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Create `amount` new units for `account`.
    pub fn mint(&mut self, account: Principal, amount: Amount) -> Result<()> {
        account.ensure_live("mint recipient")?;
        let new_supply = self.total_supply.checked_add(amount)?;
        let new_balance = self.balance_of(account).checked_add(amount)?;
        let mut history = self.history.clone();
        history.record_mint(amount)?;

        self.total_supply = new_supply;
        self.set_balance(account, new_balance);
        self.history = history;
        self.events.emit(LedgerEvent::Transfer {
            from: Principal::NULL,
            to: account,
            amount,
        });
        tracing::debug!(ledger = %self.symbol, %account, %amount, "Minted");
        Ok(())
    }

    /// Move `amount` from `from` to `to`. Zero-amount transfers are allowed
    /// and still emit `Transfer`.
    pub fn transfer(&mut self, from: Principal, to: Principal, amount: Amount) -> Result<()> {
        from.ensure_live("transfer source")?;
        to.ensure_live("transfer destination")?;
        let from_balance = self.balance_of(from);
        let new_from = from_balance
            .checked_sub(amount)
            .map_err(|_| TrancheError::InsufficientBalance {
                needed: amount,
                available: from_balance,
            })?;

        if from != to {
            let new_to = self.balance_of(to).checked_add(amount)?;
            self.set_balance(from, new_from);
            self.set_balance(to, new_to);
        }
        self.events.emit(LedgerEvent::Transfer { from, to, amount });
        tracing::debug!(ledger = %self.symbol, %from, %to, %amount, "Transferred");
        Ok(())
    }

    /// Set the allowance of `spender` over `owner`'s balance.
    pub fn approve(&mut self, owner: Principal, spender: Principal, amount: Amount) -> Result<()> {
        owner.ensure_live("approval owner")?;
        spender.ensure_live("approval spender")?;
        self.set_allowance(owner, spender, amount);
        self.events.emit(LedgerEvent::Approval {
            owner,
            spender,
            amount,
        });
        Ok(())
    }

    pub fn increase_allowance(
        &mut self,
        owner: Principal,
        spender: Principal,
        added: Amount,
    ) -> Result<()> {
        let new_allowance = self.allowance(owner, spender).checked_add(added)?;
        self.approve(owner, spender, new_allowance)
    }

    pub fn decrease_allowance(
        &mut self,
        owner: Principal,
        spender: Principal,
        subtracted: Amount,
    ) -> Result<()> {
        let current = self.allowance(owner, spender);
        let new_allowance =
            current
                .checked_sub(subtracted)
                .map_err(|_| TrancheError::InsufficientAllowance {
                    needed: subtracted,
                    available: current,
                })?;
        self.approve(owner, spender, new_allowance)
    }

    /// Move `amount` from `from` to `to`, consuming `spender`'s allowance.
    pub fn transfer_from(
        &mut self,
        spender: Principal,
        from: Principal,
        to: Principal,
        amount: Amount,
    ) -> Result<()> {
        let new_allowance = self.spend_allowance(from, spender, amount)?;
        self.transfer(from, to, amount)?;
        self.set_allowance(from, spender, new_allowance);
        Ok(())
    }

    /// Destroy `amount` of `account`'s balance.
    pub fn burn(&mut self, account: Principal, amount: Amount) -> Result<()> {
        account.ensure_live("burn account")?;
        let balance = self.balance_of(account);
        let new_balance = balance
            .checked_sub(amount)
            .map_err(|_| TrancheError::InsufficientBalance {
                needed: amount,
                available: balance,
            })?;
        let new_supply = self.total_supply.checked_sub(amount)?;
        let mut history = self.history.clone();
        history.record_burn(amount)?;

        self.total_supply = new_supply;
        self.set_balance(account, new_balance);
        self.history = history;
        self.events.emit(LedgerEvent::Transfer {
            from: account,
            to: Principal::NULL,
            amount,
        });
        tracing::debug!(ledger = %self.symbol, %account, %amount, "Burned");
        Ok(())
    }

    /// Destroy `amount` of `account`'s balance, consuming `spender`'s allowance.
    pub fn burn_from(&mut self, spender: Principal, account: Principal, amount: Amount) -> Result<()> {
        let new_allowance = self.spend_allowance(account, spender, amount)?;
        self.burn(account, amount)?;
        self.set_allowance(account, spender, new_allowance);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn spend_allowance(&self, owner: Principal, spender: Principal, amount: Amount) -> Result<Amount> {
        spender.ensure_live("spender")?;
        let available = self.allowance(owner, spender);
        available
            .checked_sub(amount)
            .map_err(|_| TrancheError::InsufficientAllowance {
                needed: amount,
                available,
            })
    }

    fn set_balance(&mut self, account: Principal, amount: Amount) {
        if amount.is_zero() {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, amount);
        }
    }

    fn set_allowance(&mut self, owner: Principal, spender: Principal, amount: Amount) {
        if amount.is_zero() {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }
}

impl BaseLedger for Ledger {
    fn balance_of(&self, account: Principal) -> Amount {
        Ledger::balance_of(self, account)
    }

    fn transfer(&mut self, from: Principal, to: Principal, amount: Amount) -> Result<()> {
        Ledger::transfer(self, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: Principal,
        from: Principal,
        to: Principal,
        amount: Amount,
    ) -> Result<()> {
        Ledger::transfer_from(self, spender, from, to, amount)
    }

    fn burn(&mut self, account: Principal, amount: Amount) -> Result<()> {
        Ledger::burn(self, account, amount)
    }

    fn burn_from(&mut self, spender: Principal, account: Principal, amount: Amount) -> Result<()> {
        Ledger::burn_from(self, spender, account, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> Ledger {
        Ledger::new(Principal::random(), "Test", "TST", 18)
    }

    #[test]
    fn mint_increases_supply_and_balance() {
        let mut l = ledger();
        let alice = Principal::random();
        l.mint(alice, Amount::new(1000)).unwrap();
        assert_eq!(l.total_supply(), Amount::new(1000));
        assert_eq!(l.balance_of(alice), Amount::new(1000));
        assert_eq!(
            l.events().last(),
            Some(&LedgerEvent::Transfer {
                from: Principal::NULL,
                to: alice,
                amount: Amount::new(1000)
            })
        );
        l.verify_supply().unwrap();
    }

    #[test]
    fn mint_to_null_rejected() {
        let mut l = ledger();
        let err = l.mint(Principal::NULL, Amount::new(1)).unwrap_err();
        assert!(matches!(err, TrancheError::NullPrincipal { .. }));
        assert!(l.events().is_empty());
    }

    #[test]
    fn mint_overflow_leaves_state_unchanged() {
        let mut l = ledger();
        let alice = Principal::random();
        l.mint(alice, Amount::new(u128::MAX)).unwrap();
        let err = l.mint(alice, Amount::new(1)).unwrap_err();
        assert_eq!(err, TrancheError::ArithmeticOverflow);
        assert_eq!(l.total_supply(), Amount::new(u128::MAX));
        assert_eq!(l.events().len(), 1);
    }

    #[test]
    fn transfer_moves_balance() {
        let mut l = ledger();
        let (alice, bob) = (Principal::random(), Principal::random());
        l.mint(alice, Amount::new(100)).unwrap();
        l.transfer(alice, bob, Amount::new(40)).unwrap();
        assert_eq!(l.balance_of(alice), Amount::new(60));
        assert_eq!(l.balance_of(bob), Amount::new(40));
        l.verify_supply().unwrap();
    }

    #[test]
    fn transfer_insufficient_fails() {
        let mut l = ledger();
        let (alice, bob) = (Principal::random(), Principal::random());
        l.mint(alice, Amount::new(10)).unwrap();
        let err = l.transfer(alice, bob, Amount::new(11)).unwrap_err();
        assert!(matches!(err, TrancheError::InsufficientBalance { .. }));
        assert_eq!(l.balance_of(alice), Amount::new(10));
        assert_eq!(l.balance_of(bob), Amount::ZERO);
    }

    #[test]
    fn transfer_to_null_rejected() {
        let mut l = ledger();
        let alice = Principal::random();
        l.mint(alice, Amount::new(10)).unwrap();
        assert!(l.transfer(alice, Principal::NULL, Amount::new(1)).is_err());
    }

    #[test]
    fn zero_transfer_emits_event() {
        let mut l = ledger();
        let (alice, bob) = (Principal::random(), Principal::random());
        l.transfer(alice, bob, Amount::ZERO).unwrap();
        assert_eq!(l.events().len(), 1);
        assert_eq!(l.holders().count(), 0);
    }

    #[test]
    fn self_transfer_keeps_balance() {
        let mut l = ledger();
        let alice = Principal::random();
        l.mint(alice, Amount::new(10)).unwrap();
        l.transfer(alice, alice, Amount::new(10)).unwrap();
        assert_eq!(l.balance_of(alice), Amount::new(10));
        l.verify_supply().unwrap();
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let mut l = ledger();
        let (owner, spender, to) = (Principal::random(), Principal::random(), Principal::random());
        l.mint(owner, Amount::new(100)).unwrap();
        l.approve(owner, spender, Amount::new(50)).unwrap();
        l.transfer_from(spender, owner, to, Amount::new(30)).unwrap();
        assert_eq!(l.allowance(owner, spender), Amount::new(20));
        assert_eq!(l.balance_of(to), Amount::new(30));

        let err = l.transfer_from(spender, owner, to, Amount::new(21)).unwrap_err();
        assert!(matches!(err, TrancheError::InsufficientAllowance { .. }));
    }

    #[test]
    fn transfer_from_failure_keeps_allowance() {
        let mut l = ledger();
        let (owner, spender, to) = (Principal::random(), Principal::random(), Principal::random());
        l.mint(owner, Amount::new(5)).unwrap();
        l.approve(owner, spender, Amount::new(50)).unwrap();
        assert!(l.transfer_from(spender, owner, to, Amount::new(10)).is_err());
        assert_eq!(l.allowance(owner, spender), Amount::new(50));
    }

    #[test]
    fn allowance_adjustments() {
        let mut l = ledger();
        let (owner, spender) = (Principal::random(), Principal::random());
        l.increase_allowance(owner, spender, Amount::new(10)).unwrap();
        l.increase_allowance(owner, spender, Amount::new(5)).unwrap();
        assert_eq!(l.allowance(owner, spender), Amount::new(15));
        l.decrease_allowance(owner, spender, Amount::new(15)).unwrap();
        assert_eq!(l.allowance(owner, spender), Amount::ZERO);
        assert!(l.decrease_allowance(owner, spender, Amount::new(1)).is_err());
    }

    #[test]
    fn approve_null_spender_rejected() {
        let mut l = ledger();
        assert!(l.approve(Principal::random(), Principal::NULL, Amount::new(1)).is_err());
    }

    #[test]
    fn burn_reduces_supply() {
        let mut l = ledger();
        let alice = Principal::random();
        l.mint(alice, Amount::new(100)).unwrap();
        l.burn(alice, Amount::new(100)).unwrap();
        assert_eq!(l.total_supply(), Amount::ZERO);
        assert_eq!(l.balance_of(alice), Amount::ZERO);
        assert_eq!(l.history().total_burned(), Amount::new(100));
        l.verify_supply().unwrap();
    }

    #[test]
    fn burn_exceeding_balance_fails() {
        let mut l = ledger();
        let alice = Principal::random();
        l.mint(alice, Amount::new(1)).unwrap();
        let err = l.burn(alice, Amount::new(2)).unwrap_err();
        assert!(matches!(err, TrancheError::InsufficientBalance { .. }));
        assert_eq!(l.total_supply(), Amount::new(1));
    }

    #[test]
    fn burn_from_consumes_allowance() {
        let mut l = ledger();
        let (owner, spender) = (Principal::random(), Principal::random());
        l.mint(owner, Amount::new(100)).unwrap();
        l.approve(owner, spender, Amount::new(60)).unwrap();
        l.burn_from(spender, owner, Amount::new(60)).unwrap();
        assert_eq!(l.total_supply(), Amount::new(40));
        assert_eq!(l.allowance(owner, spender), Amount::ZERO);
    }
}
