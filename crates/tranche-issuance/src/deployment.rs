//! Deployment instrument — one fixed-supply sub-ledger per tranche.
//!
//! The full tranche supply is minted to the issuing principal (the main
//! ledger) at creation. The issuer distributes it, starts the one-shot
//! lock-up clock, and relays redemptions once the clock has run out.
//! Redemption is all-or-nothing: the holder's whole balance is burned here
//! and the same amount is credited on the main ledger.

use chrono::{DateTime, Duration, Utc};
use tranche_ledger::{FreezeGate, FrozenRegistry, Ledger};
use tranche_types::{
    Amount, DeploymentId, DeploymentPhase, ExecutionContext, LedgerConfig, Principal, Result,
    TrancheError, constants,
};

/// A tranche's sub-ledger and its lock-up clock.
#[derive(Debug, Clone)]
pub struct DeploymentInstrument {
    id: DeploymentId,
    issuer: Principal,
    mint_amount: Amount,
    ledger: Ledger,
    created_at: DateTime<Utc>,
    /// Set exactly once by `start_lock_up`.
    unlock_time: Option<DateTime<Utc>>,
    redeemed_total: Amount,
}

impl DeploymentInstrument {
    /// Create tranche `id`, minting `mint_amount` entirely to `issuer`.
    pub fn create(
        ctx: &ExecutionContext,
        id: DeploymentId,
        mint_amount: Amount,
        issuer: Principal,
        config: &LedgerConfig,
    ) -> Result<Self> {
        issuer.ensure_live("deployment issuer")?;
        let address = Principal::derive_child(issuer, u64::from(id.get()));
        let mut ledger = Ledger::new(
            address,
            config.deployment_name(id),
            config.deployment_symbol(id),
            config.decimals,
        );
        ledger.mint(issuer, mint_amount)?;

        Ok(Self {
            id,
            issuer,
            mint_amount,
            ledger,
            created_at: ctx.now,
            unlock_time: None,
            redeemed_total: Amount::ZERO,
        })
    }

    fn ensure_issuer(&self, caller: Principal) -> Result<()> {
        if caller == self.issuer {
            Ok(())
        } else {
            Err(TrancheError::NotIssuer { caller })
        }
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Arm the lock-up: `unlock_time = now + 182 days`. One-shot.
    ///
    /// # Errors
    /// `NotIssuer` for any other caller, `LockUpAlreadyStarted` on re-arm,
    /// `ClockOverflow` if the unlock time is not representable.
    pub fn start_lock_up(&mut self, ctx: &ExecutionContext) -> Result<DateTime<Utc>> {
        self.ensure_issuer(ctx.caller)?;
        if self.unlock_time.is_some() {
            return Err(TrancheError::LockUpAlreadyStarted(self.id));
        }
        let unlock_time = ctx
            .now
            .checked_add_signed(Duration::days(constants::LOCK_UP_DAYS))
            .ok_or(TrancheError::ClockOverflow)?;
        self.unlock_time = Some(unlock_time);
        tracing::info!(deployment = %self.id, %unlock_time, "Lock-up started");
        Ok(unlock_time)
    }

    /// Retire `account`'s whole balance and credit it on `main` from the
    /// issuer's reserve. Returns the amount redeemed; zero is a no-op.
    ///
    /// # Errors
    /// - `NotIssuer` unless relayed by the issuer
    /// - `LockUpNotStarted` / `StillLocked` before the unlock time has passed
    /// - `AccountFrozen` if `account` is frozen
    pub fn redeem(
        &mut self,
        ctx: &ExecutionContext,
        account: Principal,
        frozen: &FrozenRegistry,
        main: &mut Ledger,
    ) -> Result<Amount> {
        self.ensure_issuer(ctx.caller)?;
        let unlock_time = self
            .unlock_time
            .ok_or(TrancheError::LockUpNotStarted(self.id))?;
        if ctx.now <= unlock_time {
            return Err(TrancheError::StillLocked {
                id: self.id,
                unlock_time,
            });
        }

        let amount = self.ledger.balance_of(account);
        if amount.is_zero() {
            return Ok(Amount::ZERO);
        }

        // The credit side must be able to succeed before anything is burned.
        let reserve = main.balance_of(self.issuer);
        if reserve < amount {
            return Err(TrancheError::InsufficientBalance {
                needed: amount,
                available: reserve,
            });
        }
        let redeemed_total = self.redeemed_total.checked_add(amount)?;

        FreezeGate::new(frozen, &mut self.ledger).burn(account, amount)?;
        main.transfer(self.issuer, account, amount)?;
        self.redeemed_total = redeemed_total;

        tracing::info!(deployment = %self.id, %account, %amount, "Redeemed");
        Ok(amount)
    }

    // ---------------------------------------------------------------------
    // Holder surface
    // ---------------------------------------------------------------------

    /// Transfer from the caller. `Ok(false)` if either side is frozen.
    pub fn transfer(
        &mut self,
        ctx: &ExecutionContext,
        frozen: &FrozenRegistry,
        to: Principal,
        amount: Amount,
    ) -> Result<bool> {
        FreezeGate::new(frozen, &mut self.ledger).transfer(ctx.caller, to, amount)
    }

    /// Allowance-consuming transfer by the caller. `Ok(false)` if either side is frozen.
    pub fn transfer_from(
        &mut self,
        ctx: &ExecutionContext,
        frozen: &FrozenRegistry,
        from: Principal,
        to: Principal,
        amount: Amount,
    ) -> Result<bool> {
        FreezeGate::new(frozen, &mut self.ledger).transfer_from(ctx.caller, from, to, amount)
    }

    pub fn approve(&mut self, ctx: &ExecutionContext, spender: Principal, amount: Amount) -> Result<()> {
        self.ledger.approve(ctx.caller, spender, amount)
    }

    pub fn increase_allowance(&mut self, ctx: &ExecutionContext, spender: Principal, added: Amount) -> Result<()> {
        self.ledger.increase_allowance(ctx.caller, spender, added)
    }

    pub fn decrease_allowance(
        &mut self,
        ctx: &ExecutionContext,
        spender: Principal,
        subtracted: Amount,
    ) -> Result<()> {
        self.ledger.decrease_allowance(ctx.caller, spender, subtracted)
    }

    /// Burn from the caller's balance without any main-ledger credit.
    pub fn burn(&mut self, ctx: &ExecutionContext, frozen: &FrozenRegistry, amount: Amount) -> Result<()> {
        FreezeGate::new(frozen, &mut self.ledger).burn(ctx.caller, amount)
    }

    pub fn burn_from(
        &mut self,
        ctx: &ExecutionContext,
        frozen: &FrozenRegistry,
        account: Principal,
        amount: Amount,
    ) -> Result<()> {
        FreezeGate::new(frozen, &mut self.ledger).burn_from(ctx.caller, account, amount)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn id(&self) -> DeploymentId {
        self.id
    }

    #[must_use]
    pub fn address(&self) -> Principal {
        self.ledger.address()
    }

    #[must_use]
    pub fn issuer(&self) -> Principal {
        self.issuer
    }

    #[must_use]
    pub fn mint_amount(&self) -> Amount {
        self.mint_amount
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn unlock_time(&self) -> Option<DateTime<Utc>> {
        self.unlock_time
    }

    #[must_use]
    pub fn phase(&self, now: DateTime<Utc>) -> DeploymentPhase {
        DeploymentPhase::at(self.unlock_time, now)
    }

    /// Time left until redemption opens, if the lock-up is running.
    #[must_use]
    pub fn time_until_unlock(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.unlock_time
            .filter(|t| now <= *t)
            .map(|t| t - now)
    }

    #[must_use]
    pub fn redeemed_total(&self) -> Amount {
        self.redeemed_total
    }

    #[must_use]
    pub fn balance_of(&self, account: Principal) -> Amount {
        self.ledger.balance_of(account)
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        issuer: Principal,
        holder: Principal,
        main: Ledger,
        frozen: FrozenRegistry,
        instrument: DeploymentInstrument,
        start: DateTime<Utc>,
    }

    fn fixture() -> Fixture {
        let issuer = Principal::random();
        let start = Utc::now();
        let ctx = ExecutionContext::at(issuer, 1, start);
        let id = DeploymentId::new(4).unwrap();
        let config = LedgerConfig::default();
        let mut instrument =
            DeploymentInstrument::create(&ctx, id, Amount::new(10_000), issuer, &config).unwrap();
        let mut main = Ledger::new(issuer, "Main", "MN", 18);
        main.mint(issuer, Amount::new(10_000)).unwrap();

        let holder = Principal::random();
        let frozen = FrozenRegistry::new();
        assert!(instrument.transfer(&ctx, &frozen, holder, Amount::new(1_000)).unwrap());
        Fixture {
            issuer,
            holder,
            main,
            frozen,
            instrument,
            start,
        }
    }

    fn ctx(caller: Principal, now: DateTime<Utc>) -> ExecutionContext {
        ExecutionContext::at(caller, 2, now)
    }

    #[test]
    fn create_mints_to_issuer_and_names_from_id() {
        let f = fixture();
        assert_eq!(f.instrument.ledger().total_supply(), Amount::new(10_000));
        assert_eq!(f.instrument.balance_of(f.issuer), Amount::new(9_000));
        assert_eq!(f.instrument.ledger().name(), "Tranche Deployment 04");
        assert_eq!(f.instrument.ledger().symbol(), "TD04");
        assert_eq!(f.instrument.phase(f.start), DeploymentPhase::Minted);
    }

    #[test]
    fn lock_up_is_one_shot_and_issuer_only() {
        let mut f = fixture();
        let outsider = Principal::random();
        assert!(matches!(
            f.instrument.start_lock_up(&ctx(outsider, f.start)),
            Err(TrancheError::NotIssuer { .. })
        ));

        let unlock = f.instrument.start_lock_up(&ctx(f.issuer, f.start)).unwrap();
        assert_eq!(unlock, f.start + Duration::days(182));
        assert_eq!(f.instrument.phase(f.start), DeploymentPhase::Locked);

        let later = f.start + Duration::days(1);
        let err = f.instrument.start_lock_up(&ctx(f.issuer, later)).unwrap_err();
        assert!(matches!(err, TrancheError::LockUpAlreadyStarted(_)));
        assert_eq!(f.instrument.unlock_time(), Some(unlock));
    }

    #[test]
    fn lock_up_past_clock_range_fails() {
        let mut f = fixture();
        let end_of_time = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        let err = f.instrument.start_lock_up(&ctx(f.issuer, end_of_time)).unwrap_err();
        assert_eq!(err, TrancheError::ClockOverflow);
        assert_eq!(f.instrument.unlock_time(), None);
    }

    #[test]
    fn redeem_without_lock_up_fails() {
        let mut f = fixture();
        let err = f
            .instrument
            .redeem(&ctx(f.issuer, f.start), f.holder, &f.frozen, &mut f.main)
            .unwrap_err();
        assert!(matches!(err, TrancheError::LockUpNotStarted(_)));
    }

    #[test]
    fn redeem_before_unlock_fails() {
        let mut f = fixture();
        f.instrument.start_lock_up(&ctx(f.issuer, f.start)).unwrap();
        let at_unlock = f.start + Duration::days(182);
        let err = f
            .instrument
            .redeem(&ctx(f.issuer, at_unlock), f.holder, &f.frozen, &mut f.main)
            .unwrap_err();
        assert!(matches!(err, TrancheError::StillLocked { .. }));
        assert_eq!(f.instrument.balance_of(f.holder), Amount::new(1_000));
    }

    #[test]
    fn redeem_after_unlock_swaps_balance() {
        let mut f = fixture();
        f.instrument.start_lock_up(&ctx(f.issuer, f.start)).unwrap();
        let later = f.start + Duration::days(183);
        let redeemed = f
            .instrument
            .redeem(&ctx(f.issuer, later), f.holder, &f.frozen, &mut f.main)
            .unwrap();
        assert_eq!(redeemed, Amount::new(1_000));
        assert_eq!(f.instrument.balance_of(f.holder), Amount::ZERO);
        assert_eq!(f.main.balance_of(f.holder), Amount::new(1_000));
        assert_eq!(f.instrument.ledger().total_supply(), Amount::new(9_000));
        assert_eq!(f.instrument.redeemed_total(), Amount::new(1_000));
        assert_eq!(f.instrument.phase(later), DeploymentPhase::Unlockable);
        f.instrument.ledger().verify_supply().unwrap();
        f.main.verify_supply().unwrap();
    }

    #[test]
    fn redeem_zero_balance_is_noop() {
        let mut f = fixture();
        f.instrument.start_lock_up(&ctx(f.issuer, f.start)).unwrap();
        let later = f.start + Duration::days(183);
        let nobody = Principal::random();
        let events_before = f.instrument.ledger().events().len();
        let redeemed = f
            .instrument
            .redeem(&ctx(f.issuer, later), nobody, &f.frozen, &mut f.main)
            .unwrap();
        assert_eq!(redeemed, Amount::ZERO);
        assert_eq!(f.instrument.ledger().events().len(), events_before);
    }

    #[test]
    fn redeem_frozen_holder_hard_fails() {
        let mut f = fixture();
        f.instrument.start_lock_up(&ctx(f.issuer, f.start)).unwrap();
        f.frozen.set_frozen(f.holder, true).unwrap();
        let later = f.start + Duration::days(183);
        let err = f
            .instrument
            .redeem(&ctx(f.issuer, later), f.holder, &f.frozen, &mut f.main)
            .unwrap_err();
        assert_eq!(err, TrancheError::AccountFrozen { account: f.holder });
        assert_eq!(f.main.balance_of(f.holder), Amount::ZERO);
    }

    #[test]
    fn redeem_only_via_issuer() {
        let mut f = fixture();
        f.instrument.start_lock_up(&ctx(f.issuer, f.start)).unwrap();
        let later = f.start + Duration::days(183);
        let err = f
            .instrument
            .redeem(&ctx(f.holder, later), f.holder, &f.frozen, &mut f.main)
            .unwrap_err();
        assert!(matches!(err, TrancheError::NotIssuer { .. }));
    }

    #[test]
    fn time_until_unlock_counts_down() {
        let mut f = fixture();
        assert_eq!(f.instrument.time_until_unlock(f.start), None);
        f.instrument.start_lock_up(&ctx(f.issuer, f.start)).unwrap();
        let mid = f.start + Duration::days(100);
        assert_eq!(f.instrument.time_until_unlock(mid), Some(Duration::days(82)));
        assert_eq!(
            f.instrument.time_until_unlock(f.start + Duration::days(183)),
            None
        );
    }

    #[test]
    fn holder_transfer_gated_by_freeze() {
        let mut f = fixture();
        let other = Principal::random();
        f.frozen.set_frozen(other, true).unwrap();
        let moved = f
            .instrument
            .transfer(&ctx(f.holder, f.start), &f.frozen, other, Amount::new(1))
            .unwrap();
        assert!(!moved);
        assert_eq!(f.instrument.balance_of(f.holder), Amount::new(1_000));
    }
}
