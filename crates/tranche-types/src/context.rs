//! Per-operation execution context.
//!
//! The substrate serializes every operation and hands each one a context
//! naming the calling principal, a fresh sequence number, and the current
//! timestamp. Components read time and sequence only through this value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Principal, SequenceNumber};

/// Read-only view of the substrate for the duration of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// The principal invoking the operation.
    pub caller: Principal,
    /// Sequence number of this operation; strictly greater for every later one.
    pub sequence: SequenceNumber,
    /// Timestamp of this operation; never decreases.
    pub now: DateTime<Utc>,
}

impl ExecutionContext {
    /// The same operation re-entering a hosted component under another
    /// caller identity (e.g. the main ledger calling its own tranche).
    #[must_use]
    pub fn as_caller(&self, caller: Principal) -> Self {
        Self { caller, ..*self }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl ExecutionContext {
    /// Build a context directly, bypassing the substrate.
    pub fn at(caller: Principal, sequence: u64, now: DateTime<Utc>) -> Self {
        Self {
            caller,
            sequence: SequenceNumber(sequence),
            now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_caller_keeps_sequence_and_time() {
        let now = Utc::now();
        let ctx = ExecutionContext::at(Principal::random(), 9, now);
        let other = Principal::random();
        let relayed = ctx.as_caller(other);
        assert_eq!(relayed.caller, other);
        assert_eq!(relayed.sequence, SequenceNumber(9));
        assert_eq!(relayed.now, now);
    }
}
