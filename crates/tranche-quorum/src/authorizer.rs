//! Quorum authorizer — 2-of-3 propose/confirm over privileged actions.
//!
//! Each proposal is filed under the sequence number of the operation that
//! filed it, so the key is single-use by construction: the substrate never
//! issues the same sequence number twice.
//!
//! ## Handshake
//!
//! ```text
//! principal A: propose_or_confirm(action, params, New)       → Proposed(S)
//! principal B: propose_or_confirm(action, params, Confirm(S)) → slot S reset → action runs → Executed
//! ```
//!
//! Confirmations that cannot apply (empty slot, self-confirmation, other
//! action) are tolerated no-ops. Same action with different parameters is
//! rejected and the slot stays filed.

use std::collections::BTreeMap;

use tranche_issuance::MainLedger;
use tranche_ledger::ForeignLedgerDirectory;
use tranche_types::{
    ActionParams, ActionType, ExecutionContext, IgnoreReason, Principal, Proposal, ProposalRef,
    QuorumOutcome, Result, SequenceNumber, TrancheError, constants,
};

/// The quorum principals, the bound main ledger, and the filed proposals.
#[derive(Debug, Clone)]
pub struct QuorumAuthorizer {
    address: Principal,
    principals: [Principal; 3],
    ledger: Principal,
    slots: BTreeMap<SequenceNumber, Proposal>,
}

impl QuorumAuthorizer {
    /// Create an authorizer bound to `main` and grant it admin there.
    ///
    /// # Errors
    /// `InvalidQuorum` unless the three principals are live and distinct;
    /// whatever `MainLedger::grant_quorum_admin` rejects (non-issuer caller,
    /// ledger already bound).
    pub fn deploy(
        ctx: &ExecutionContext,
        main: &mut MainLedger,
        principals: [Principal; 3],
    ) -> Result<Self> {
        validate_principals(&principals)?;
        let address = Principal::derive_child(main.address(), constants::QUORUM_ADDRESS_NONCE);
        main.grant_quorum_admin(ctx, address)?;

        tracing::info!(%address, ledger = %main.address(), "Quorum authorizer deployed");
        Ok(Self {
            address,
            principals,
            ledger: main.address(),
            slots: BTreeMap::new(),
        })
    }

    /// File a new proposal or confirm the one named by `key`.
    ///
    /// # Errors
    /// - `NotQuorumPrincipal` if the caller is not one of the three
    /// - `LedgerMismatch` if `main` is not the bound ledger
    /// - `ProposalSlotOccupied` when filing twice in one operation
    /// - `ProposalParameterMismatch` when confirming the right action with
    ///   different parameters
    /// - any error of the executed action (the slot is restored)
    pub fn propose_or_confirm(
        &mut self,
        ctx: &ExecutionContext,
        main: &mut MainLedger,
        foreign: &mut dyn ForeignLedgerDirectory,
        action: ActionType,
        params: ActionParams,
        key: ProposalRef,
    ) -> Result<QuorumOutcome> {
        self.ensure_principal(ctx.caller)?;
        if main.address() != self.ledger {
            return Err(TrancheError::LedgerMismatch {
                expected: self.ledger,
                actual: main.address(),
            });
        }

        match key {
            ProposalRef::New => self.file(ctx, action, params),
            ProposalRef::Confirm(slot) => self.confirm(ctx, main, foreign, action, params, slot),
        }
    }

    fn file(&mut self, ctx: &ExecutionContext, action: ActionType, params: ActionParams) -> Result<QuorumOutcome> {
        let slot = ctx.sequence;
        if self.slots.contains_key(&slot) {
            return Err(TrancheError::ProposalSlotOccupied(slot));
        }
        self.slots.insert(
            slot,
            Proposal {
                action,
                proposer: ctx.caller,
                params,
            },
        );
        tracing::info!(%slot, %action, proposer = %ctx.caller, target = %params.address, flag = params.flag, "Proposal filed");
        Ok(QuorumOutcome::Proposed(slot))
    }

    fn confirm(
        &mut self,
        ctx: &ExecutionContext,
        main: &mut MainLedger,
        foreign: &mut dyn ForeignLedgerDirectory,
        action: ActionType,
        params: ActionParams,
        slot: SequenceNumber,
    ) -> Result<QuorumOutcome> {
        let Some(proposal) = self.slots.get(&slot).copied() else {
            return Ok(ignored(slot, ctx.caller, IgnoreReason::EmptySlot));
        };
        if proposal.proposer == ctx.caller {
            return Ok(ignored(slot, ctx.caller, IgnoreReason::SelfConfirmation));
        }
        if proposal.action != action {
            return Ok(ignored(slot, ctx.caller, IgnoreReason::ActionMismatch));
        }
        if proposal.params != params {
            tracing::warn!(%slot, %action, confirmer = %ctx.caller, "Confirmation parameters differ from proposal");
            return Err(TrancheError::ProposalParameterMismatch { key: slot });
        }

        // Reset before acting.
        self.slots.remove(&slot);
        if let Err(err) = self.execute(ctx, main, foreign, action, params) {
            self.slots.insert(slot, proposal);
            return Err(err);
        }
        tracing::info!(%slot, %action, proposer = %proposal.proposer, confirmer = %ctx.caller, "Proposal executed");
        Ok(QuorumOutcome::Executed(action))
    }

    /// Run `action` on the main ledger with the authorizer as caller.
    fn execute(
        &self,
        ctx: &ExecutionContext,
        main: &mut MainLedger,
        foreign: &mut dyn ForeignLedgerDirectory,
        action: ActionType,
        params: ActionParams,
    ) -> Result<()> {
        let ctx = ctx.as_caller(self.address);
        match action {
            ActionType::ToggleFreeze => {
                main.toggle_freeze(&ctx, params.address, params.flag)?;
            }
            ActionType::RecoverTokens => {
                let ledger = foreign
                    .foreign_ledger_mut(params.address)
                    .ok_or(TrancheError::UnknownForeignLedger(params.address))?;
                main.recover_stray_tokens(&ctx, ledger)?;
            }
            ActionType::AddAdmin => main.add_admin(&ctx, params.address)?,
            ActionType::RenounceAdmin => main.renounce_admin(&ctx)?,
        }
        Ok(())
    }

    fn ensure_principal(&self, caller: Principal) -> Result<()> {
        if self.is_principal(caller) {
            Ok(())
        } else {
            Err(TrancheError::NotQuorumPrincipal { caller })
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Address the authorizer acts under on the main ledger.
    #[must_use]
    pub fn address(&self) -> Principal {
        self.address
    }

    #[must_use]
    pub fn principals(&self) -> [Principal; 3] {
        self.principals
    }

    #[must_use]
    pub fn is_principal(&self, account: Principal) -> bool {
        self.principals.contains(&account)
    }

    /// The main ledger this authorizer is bound to.
    #[must_use]
    pub fn ledger(&self) -> Principal {
        self.ledger
    }

    #[must_use]
    pub fn pending(&self, slot: SequenceNumber) -> Option<&Proposal> {
        self.slots.get(&slot)
    }

    /// Filed, unexecuted proposals. Stale ones are never cleaned up.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.slots.len()
    }
}

fn ignored(slot: SequenceNumber, caller: Principal, reason: IgnoreReason) -> QuorumOutcome {
    tracing::warn!(%slot, %caller, ?reason, "Confirmation ignored");
    QuorumOutcome::Ignored(reason)
}

fn validate_principals(principals: &[Principal; 3]) -> Result<()> {
    if principals.iter().any(Principal::is_null) {
        return Err(TrancheError::InvalidQuorum {
            reason: "null principal".into(),
        });
    }
    let [a, b, c] = principals;
    if a == b || a == c || b == c {
        return Err(TrancheError::InvalidQuorum {
            reason: "principals must be distinct".into(),
        });
    }
    Ok(())
}
