//! Main ledger — tranche orchestration host.
//!
//! `MainLedger` owns the main instrument's [`Ledger`], its admin set, the
//! frozen registry shared by every instrument, and all deployment
//! instruments. Every mutating entry point takes an [`ExecutionContext`]
//! naming the caller; access checks happen here before anything is touched.
//!
//! ## Access
//!
//! | Operation | Caller |
//! |-----------|--------|
//! | `create_deployment`, `distribute`, `start_lock_up`, `force_redeem_unlocked`, `grant_quorum_admin` | issuer |
//! | `toggle_freeze`, `recover_stray_tokens`, `add_admin`, `renounce_admin` | admin |
//! | `redeem_unlocked`, token surface | anyone |

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tranche_ledger::{AdminRegistry, ForeignLedger, FreezeGate, FrozenRegistry, Ledger};
use tranche_types::{
    Amount, DeploymentId, ExecutionContext, LedgerConfig, LedgerEvent, Principal, Result,
    TrancheError,
};

use crate::deployment::DeploymentInstrument;
use crate::schedule;

/// The main instrument and everything it hosts.
#[derive(Debug, Clone)]
pub struct MainLedger {
    issuer: Principal,
    config: LedgerConfig,
    token: Ledger,
    frozen: FrozenRegistry,
    admins: AdminRegistry,
    deployments: BTreeMap<DeploymentId, DeploymentInstrument>,
    /// Address granted admin through `grant_quorum_admin`, if any.
    quorum: Option<Principal>,
}

impl MainLedger {
    /// Construct the main ledger. The caller becomes issuer and first admin.
    pub fn new(ctx: &ExecutionContext, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        let issuer = ctx.caller.ensure_live("issuer")?;
        let address = Principal::derive_child(issuer, ctx.sequence.0);
        let admins = AdminRegistry::new(issuer)?;
        let mut token = Ledger::new(address, &config.name, &config.symbol, config.decimals);
        token.emit(LedgerEvent::AdminAdded { account: issuer });

        tracing::info!(%address, %issuer, symbol = %config.symbol, "Main ledger created");
        Ok(Self {
            issuer,
            config,
            token,
            frozen: FrozenRegistry::new(),
            admins,
            deployments: BTreeMap::new(),
            quorum: None,
        })
    }

    fn ensure_issuer(&self, caller: Principal) -> Result<()> {
        if caller == self.issuer {
            Ok(())
        } else {
            Err(TrancheError::NotIssuer { caller })
        }
    }

    /// Context for calls this ledger makes into its own instruments.
    fn relay(&self, ctx: &ExecutionContext) -> ExecutionContext {
        ctx.as_caller(self.address())
    }

    // ---------------------------------------------------------------------
    // Tranche issuance
    // ---------------------------------------------------------------------

    /// Create tranche `raw_id` and mint its scheduled amount both on the new
    /// instrument and, as redemption reserve, on the main ledger.
    ///
    /// # Errors
    /// - `NotIssuer` for any caller other than the issuer
    /// - `DeploymentOutOfRange` unless `1 ≤ raw_id ≤ 60`
    /// - `DeploymentExists` if the tranche was already created
    /// - `DeploymentOutOfOrder` if tranche `raw_id − 1` does not exist
    pub fn create_deployment(&mut self, ctx: &ExecutionContext, raw_id: u8) -> Result<Principal> {
        self.ensure_issuer(ctx.caller)?;
        let id = DeploymentId::new(raw_id)?;
        if self.deployments.contains_key(&id) {
            return Err(TrancheError::DeploymentExists(id));
        }
        if let Some(missing) = id.predecessor() {
            if !self.deployments.contains_key(&missing) {
                return Err(TrancheError::DeploymentOutOfOrder { id, missing });
            }
        }

        let mint_amount = schedule::mint_amount(id, self.config.decimals)?;
        let instrument = DeploymentInstrument::create(
            &self.relay(ctx),
            id,
            mint_amount,
            self.address(),
            &self.config,
        )?;
        self.token.mint(self.address(), mint_amount)?;

        let address = instrument.address();
        self.deployments.insert(id, instrument);
        tracing::info!(deployment = %id, %address, %mint_amount, "Deployment created");
        Ok(address)
    }

    /// Send `amount` of tranche `id` from the main ledger's holding to `to`.
    /// `Ok(false)` if `to` is frozen.
    pub fn distribute(
        &mut self,
        ctx: &ExecutionContext,
        to: Principal,
        amount: Amount,
        id: DeploymentId,
    ) -> Result<bool> {
        self.ensure_issuer(ctx.caller)?;
        let relay = self.relay(ctx);
        let instrument = self
            .deployments
            .get_mut(&id)
            .ok_or(TrancheError::DeploymentNotFound(id))?;
        let moved = instrument.transfer(&relay, &self.frozen, to, amount)?;
        if moved {
            tracing::info!(deployment = %id, %to, %amount, "Distributed");
        }
        Ok(moved)
    }

    pub fn start_lock_up(&mut self, ctx: &ExecutionContext, id: DeploymentId) -> Result<DateTime<Utc>> {
        self.ensure_issuer(ctx.caller)?;
        let relay = self.relay(ctx);
        self.deployment_mut(id)?.start_lock_up(&relay)
    }

    /// Redeem the caller's whole balance of tranche `id`.
    pub fn redeem_unlocked(&mut self, ctx: &ExecutionContext, id: DeploymentId) -> Result<Amount> {
        self.redeem_for(ctx, id, ctx.caller)
    }

    /// Redeem `account`'s whole balance of tranche `id` on its behalf.
    /// The lock-up applies exactly as for `redeem_unlocked`.
    pub fn force_redeem_unlocked(
        &mut self,
        ctx: &ExecutionContext,
        id: DeploymentId,
        account: Principal,
    ) -> Result<Amount> {
        self.ensure_issuer(ctx.caller)?;
        self.redeem_for(ctx, id, account)
    }

    fn redeem_for(&mut self, ctx: &ExecutionContext, id: DeploymentId, account: Principal) -> Result<Amount> {
        let relay = self.relay(ctx);
        let instrument = self
            .deployments
            .get_mut(&id)
            .ok_or(TrancheError::DeploymentNotFound(id))?;
        instrument.redeem(&relay, account, &self.frozen, &mut self.token)
    }

    // ---------------------------------------------------------------------
    // Admin actions
    // ---------------------------------------------------------------------

    /// Move this ledger's whole balance on `foreign` to the caller.
    ///
    /// # Errors
    /// `NotAdmin`, or `ForeignTransferFailed` if the foreign ledger refuses.
    pub fn recover_stray_tokens(
        &mut self,
        ctx: &ExecutionContext,
        foreign: &mut dyn ForeignLedger,
    ) -> Result<Amount> {
        self.admins.ensure_admin(ctx.caller)?;
        let holder = self.address();
        let amount = foreign.balance_of(holder);
        if !foreign.transfer(holder, ctx.caller, amount) {
            return Err(TrancheError::ForeignTransferFailed {
                ledger: foreign.address(),
                amount,
            });
        }
        tracing::info!(ledger = %foreign.address(), to = %ctx.caller, %amount, "Stray tokens recovered");
        Ok(amount)
    }

    /// Set `account`'s frozen flag. Returns whether the flag changed; an
    /// unchanged flag emits nothing.
    pub fn toggle_freeze(&mut self, ctx: &ExecutionContext, account: Principal, set_frozen: bool) -> Result<bool> {
        self.admins.ensure_admin(ctx.caller)?;
        match self.frozen.set_frozen(account, set_frozen)? {
            Some(event) => {
                tracing::info!(%account, frozen = set_frozen, by = %ctx.caller, "Freeze flag changed");
                self.token.emit(event);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn add_admin(&mut self, ctx: &ExecutionContext, account: Principal) -> Result<()> {
        let event = self.admins.add_admin(ctx.caller, account)?;
        self.token.emit(event);
        Ok(())
    }

    /// Drop the caller's own admin role. Nothing stops the set from emptying.
    pub fn renounce_admin(&mut self, ctx: &ExecutionContext) -> Result<()> {
        let event = self.admins.renounce_admin(ctx.caller)?;
        self.token.emit(event);
        Ok(())
    }

    /// Grant admin to a quorum authorizer's address. Issuer-only, once.
    pub fn grant_quorum_admin(&mut self, ctx: &ExecutionContext, authorizer: Principal) -> Result<()> {
        self.ensure_issuer(ctx.caller)?;
        if let Some(existing) = self.quorum {
            return Err(TrancheError::InvalidQuorum {
                reason: format!("ledger already bound to authorizer {existing}"),
            });
        }
        self.add_admin(ctx, authorizer)?;
        self.quorum = Some(authorizer);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Main token surface
    // ---------------------------------------------------------------------

    /// `Ok(false)` if the caller or `to` is frozen.
    pub fn transfer(&mut self, ctx: &ExecutionContext, to: Principal, amount: Amount) -> Result<bool> {
        FreezeGate::new(&self.frozen, &mut self.token).transfer(ctx.caller, to, amount)
    }

    /// `Ok(false)` if `from` or `to` is frozen.
    pub fn transfer_from(
        &mut self,
        ctx: &ExecutionContext,
        from: Principal,
        to: Principal,
        amount: Amount,
    ) -> Result<bool> {
        FreezeGate::new(&self.frozen, &mut self.token).transfer_from(ctx.caller, from, to, amount)
    }

    pub fn approve(&mut self, ctx: &ExecutionContext, spender: Principal, amount: Amount) -> Result<()> {
        self.token.approve(ctx.caller, spender, amount)
    }

    pub fn increase_allowance(&mut self, ctx: &ExecutionContext, spender: Principal, added: Amount) -> Result<()> {
        self.token.increase_allowance(ctx.caller, spender, added)
    }

    pub fn decrease_allowance(
        &mut self,
        ctx: &ExecutionContext,
        spender: Principal,
        subtracted: Amount,
    ) -> Result<()> {
        self.token.decrease_allowance(ctx.caller, spender, subtracted)
    }

    pub fn burn(&mut self, ctx: &ExecutionContext, amount: Amount) -> Result<()> {
        FreezeGate::new(&self.frozen, &mut self.token).burn(ctx.caller, amount)
    }

    pub fn burn_from(&mut self, ctx: &ExecutionContext, account: Principal, amount: Amount) -> Result<()> {
        FreezeGate::new(&self.frozen, &mut self.token).burn_from(ctx.caller, account, amount)
    }

    // ---------------------------------------------------------------------
    // Tranche holder surface
    // ---------------------------------------------------------------------

    pub fn deployment_transfer(
        &mut self,
        ctx: &ExecutionContext,
        id: DeploymentId,
        to: Principal,
        amount: Amount,
    ) -> Result<bool> {
        let instrument = self
            .deployments
            .get_mut(&id)
            .ok_or(TrancheError::DeploymentNotFound(id))?;
        instrument.transfer(ctx, &self.frozen, to, amount)
    }

    pub fn deployment_approve(
        &mut self,
        ctx: &ExecutionContext,
        id: DeploymentId,
        spender: Principal,
        amount: Amount,
    ) -> Result<()> {
        self.deployment_mut(id)?.approve(ctx, spender, amount)
    }

    pub fn deployment_transfer_from(
        &mut self,
        ctx: &ExecutionContext,
        id: DeploymentId,
        from: Principal,
        to: Principal,
        amount: Amount,
    ) -> Result<bool> {
        let instrument = self
            .deployments
            .get_mut(&id)
            .ok_or(TrancheError::DeploymentNotFound(id))?;
        instrument.transfer_from(ctx, &self.frozen, from, to, amount)
    }

    pub fn deployment_increase_allowance(
        &mut self,
        ctx: &ExecutionContext,
        id: DeploymentId,
        spender: Principal,
        added: Amount,
    ) -> Result<()> {
        self.deployment_mut(id)?.increase_allowance(ctx, spender, added)
    }

    pub fn deployment_decrease_allowance(
        &mut self,
        ctx: &ExecutionContext,
        id: DeploymentId,
        spender: Principal,
        subtracted: Amount,
    ) -> Result<()> {
        self.deployment_mut(id)?.decrease_allowance(ctx, spender, subtracted)
    }

    /// Burn tranche balance outright. Nothing is credited on the main ledger.
    pub fn deployment_burn(&mut self, ctx: &ExecutionContext, id: DeploymentId, amount: Amount) -> Result<()> {
        let instrument = self
            .deployments
            .get_mut(&id)
            .ok_or(TrancheError::DeploymentNotFound(id))?;
        instrument.burn(ctx, &self.frozen, amount)
    }

    pub fn deployment_burn_from(
        &mut self,
        ctx: &ExecutionContext,
        id: DeploymentId,
        account: Principal,
        amount: Amount,
    ) -> Result<()> {
        let instrument = self
            .deployments
            .get_mut(&id)
            .ok_or(TrancheError::DeploymentNotFound(id))?;
        instrument.burn_from(ctx, &self.frozen, account, amount)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn address(&self) -> Principal {
        self.token.address()
    }

    #[must_use]
    pub fn issuer(&self) -> Principal {
        self.issuer
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The main instrument's ledger.
    #[must_use]
    pub fn token(&self) -> &Ledger {
        &self.token
    }

    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.token.total_supply()
    }

    #[must_use]
    pub fn balance_of(&self, account: Principal) -> Amount {
        self.token.balance_of(account)
    }

    #[must_use]
    pub fn allowance(&self, owner: Principal, spender: Principal) -> Amount {
        self.token.allowance(owner, spender)
    }

    #[must_use]
    pub fn is_frozen(&self, account: Principal) -> bool {
        self.frozen.is_frozen(account)
    }

    #[must_use]
    pub fn frozen(&self) -> &FrozenRegistry {
        &self.frozen
    }

    #[must_use]
    pub fn is_admin(&self, account: Principal) -> bool {
        self.admins.is_admin(account)
    }

    #[must_use]
    pub fn admins(&self) -> &AdminRegistry {
        &self.admins
    }

    #[must_use]
    pub fn quorum(&self) -> Option<Principal> {
        self.quorum
    }

    #[must_use]
    pub fn deployment(&self, id: DeploymentId) -> Option<&DeploymentInstrument> {
        self.deployments.get(&id)
    }

    fn deployment_mut(&mut self, id: DeploymentId) -> Result<&mut DeploymentInstrument> {
        self.deployments
            .get_mut(&id)
            .ok_or(TrancheError::DeploymentNotFound(id))
    }

    /// Created tranches in id order.
    pub fn deployments(&self) -> impl Iterator<Item = &DeploymentInstrument> + '_ {
        self.deployments.values()
    }

    #[must_use]
    pub fn deployment_count(&self) -> usize {
        self.deployments.len()
    }

    /// Check supply conservation on the main ledger and every tranche.
    pub fn verify_supply(&self) -> Result<()> {
        self.token.verify_supply()?;
        for instrument in self.deployments.values() {
            instrument.ledger().verify_supply()?;
        }
        Ok(())
    }

    /// Check that everything ever minted on the main ledger was minted in
    /// lockstep with a tranche.
    pub fn verify_tranche_backing(&self) -> Result<()> {
        let tranche_total = self
            .deployments
            .values()
            .try_fold(Amount::ZERO, |acc, d| acc.checked_add(d.mint_amount()))?;
        let main_minted = self.token.history().total_minted();
        if main_minted != tranche_total {
            return Err(TrancheError::SupplyInvariantViolation {
                reason: format!("main minted {main_minted}, tranches minted {tranche_total}"),
            });
        }
        Ok(())
    }
}
