//! Serialized execution substrate.
//!
//! Owns the whole shared state ([`World`]), the sequence counter, and the
//! clock. Operations run one at a time through [`Substrate::execute`]: each
//! gets a fresh sequence number and the current time, and a failed operation
//! leaves the world exactly as it found it.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use tranche_issuance::MainLedger;
use tranche_ledger::Ledger;
use tranche_types::{
    ActionParams, ActionType, ExecutionContext, LedgerConfig, Principal, ProposalRef,
    QuorumOutcome, Result, SequenceNumber, TrancheError,
};

use crate::authorizer::QuorumAuthorizer;

/// All state reachable by an operation.
#[derive(Debug, Clone)]
pub struct World {
    pub main: MainLedger,
    pub quorum: Option<QuorumAuthorizer>,
    /// External ledgers, keyed by address, available to stray-asset recovery.
    pub foreign: BTreeMap<Principal, Ledger>,
}

impl World {
    /// Deploy the quorum authorizer over the main ledger.
    pub fn deploy_quorum(&mut self, ctx: &ExecutionContext, principals: [Principal; 3]) -> Result<Principal> {
        let quorum = QuorumAuthorizer::deploy(ctx, &mut self.main, principals)?;
        let address = quorum.address();
        self.quorum = Some(quorum);
        Ok(address)
    }

    /// Route a quorum call to the deployed authorizer.
    pub fn propose_or_confirm(
        &mut self,
        ctx: &ExecutionContext,
        action: ActionType,
        params: ActionParams,
        key: ProposalRef,
    ) -> Result<QuorumOutcome> {
        let quorum = self.quorum.as_mut().ok_or_else(|| TrancheError::InvalidQuorum {
            reason: "no quorum authorizer deployed".into(),
        })?;
        quorum.propose_or_confirm(ctx, &mut self.main, &mut self.foreign, action, params, key)
    }

    /// Register an external ledger. Its address is the map key.
    pub fn add_foreign_ledger(&mut self, ledger: Ledger) -> Principal {
        let address = ledger.address();
        self.foreign.insert(address, ledger);
        address
    }

    #[must_use]
    pub fn foreign_ledger(&self, address: Principal) -> Option<&Ledger> {
        self.foreign.get(&address)
    }

    /// Whether `account` is the main ledger, one of its tranches, or the
    /// quorum authorizer.
    #[must_use]
    pub fn is_component(&self, account: Principal) -> bool {
        account == self.main.address()
            || self.main.deployments().any(|d| d.address() == account)
            || self.quorum.as_ref().is_some_and(|q| q.address() == account)
    }
}

/// Serializes operations over a [`World`].
#[derive(Debug)]
pub struct Substrate {
    world: World,
    /// Last sequence number handed out.
    sequence: SequenceNumber,
    now: DateTime<Utc>,
}

impl Substrate {
    /// Construct the main ledger as operation 1, issued by `issuer`.
    pub fn genesis(issuer: Principal, config: LedgerConfig, now: DateTime<Utc>) -> Result<Self> {
        let sequence = SequenceNumber(1);
        let ctx = ExecutionContext {
            caller: issuer,
            sequence,
            now,
        };
        let main = MainLedger::new(&ctx, config)?;
        Ok(Self {
            world: World {
                main,
                quorum: None,
                foreign: BTreeMap::new(),
            },
            sequence,
            now,
        })
    }

    /// Run one operation as `caller`.
    ///
    /// The sequence number is consumed even if the operation fails; the
    /// world is rolled back to its state before the call.
    ///
    /// `caller` is taken as already authenticated. Component addresses
    /// (the main ledger, its tranches, the authorizer) are rejected, since
    /// only relays may act under them.
    ///
    /// # Errors
    /// `ComponentCaller` for a component address, `ArithmeticOverflow` once
    /// sequence numbers are exhausted, or whatever `op` returns.
    pub fn execute<T>(
        &mut self,
        caller: Principal,
        op: impl FnOnce(&ExecutionContext, &mut World) -> Result<T>,
    ) -> Result<T> {
        self.sequence = self.sequence.next()?;
        if self.world.is_component(caller) {
            return Err(TrancheError::ComponentCaller { caller });
        }
        let ctx = ExecutionContext {
            caller,
            sequence: self.sequence,
            now: self.now,
        };
        let snapshot = self.world.clone();
        match op(&ctx, &mut self.world) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::debug!(sequence = %ctx.sequence, %caller, %err, "Operation rolled back");
                self.world = snapshot;
                Err(err)
            }
        }
    }

    /// Move the clock forward.
    ///
    /// # Errors
    /// `ClockRegression` for a negative duration, `ClockOverflow` past the
    /// representable range.
    pub fn advance_time(&mut self, by: Duration) -> Result<DateTime<Utc>> {
        if by < Duration::zero() {
            return Err(TrancheError::ClockRegression);
        }
        self.now = self
            .now
            .checked_add_signed(by)
            .ok_or(TrancheError::ClockOverflow)?;
        Ok(self.now)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Last sequence number handed out.
    #[must_use]
    pub fn sequence(&self) -> SequenceNumber {
        self.sequence
    }

    /// Sequence number the next operation will run under.
    ///
    /// # Errors
    /// `ArithmeticOverflow` once sequence numbers are exhausted.
    pub fn next_sequence(&self) -> Result<SequenceNumber> {
        self.sequence.next()
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[must_use]
    pub fn main(&self) -> &MainLedger {
        &self.world.main
    }

    #[must_use]
    pub fn quorum(&self) -> Option<&QuorumAuthorizer> {
        self.world.quorum.as_ref()
    }
}
