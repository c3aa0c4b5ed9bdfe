//! Foreign fungible ledgers, as seen by stray-asset recovery.
//!
//! A foreign ledger is any external balance sheet that might end up holding
//! a balance for one of our instruments' addresses. Recovery only needs its
//! balance query and a boolean-returning transfer.

use std::collections::BTreeMap;

use tranche_types::{Amount, Principal};

use crate::Ledger;

/// External fungible ledger.
pub trait ForeignLedger {
    /// Address the ledger is registered under.
    fn address(&self) -> Principal;

    fn balance_of(&self, account: Principal) -> Amount;

    /// Transfer on behalf of `sender`. `false` means the ledger refused.
    fn transfer(&mut self, sender: Principal, to: Principal, amount: Amount) -> bool;
}

/// Lookup of foreign ledgers by address.
pub trait ForeignLedgerDirectory {
    fn foreign_ledger_mut(&mut self, address: Principal) -> Option<&mut dyn ForeignLedger>;
}

impl ForeignLedger for Ledger {
    fn address(&self) -> Principal {
        Ledger::address(self)
    }

    fn balance_of(&self, account: Principal) -> Amount {
        Ledger::balance_of(self, account)
    }

    fn transfer(&mut self, sender: Principal, to: Principal, amount: Amount) -> bool {
        match Ledger::transfer(self, sender, to, amount) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(ledger = %self.address(), %sender, %to, %err, "Foreign transfer refused");
                false
            }
        }
    }
}

impl ForeignLedgerDirectory for BTreeMap<Principal, Ledger> {
    fn foreign_ledger_mut(&mut self, address: Principal) -> Option<&mut dyn ForeignLedger> {
        self.get_mut(&address).map(|l| l as &mut dyn ForeignLedger)
    }
}

/// A directory with no foreign ledgers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoForeignLedgers;

impl ForeignLedgerDirectory for NoForeignLedgers {
    fn foreign_ledger_mut(&mut self, _address: Principal) -> Option<&mut dyn ForeignLedger> {
        None
    }
}
