//! Ledger events for the audit trail.
//!
//! Every state change attributed to an event emits exactly one
//! [`LedgerEvent`]; no-ops emit nothing. Events are fire-and-forget: each
//! instrument appends to its own [`EventLog`] and nobody acknowledges them.

use serde::{Deserialize, Serialize};

use crate::{Amount, Principal};

/// A state change on one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEvent {
    /// Balance moved. Mints come from, and burns go to, the null principal.
    Transfer {
        from: Principal,
        to: Principal,
        amount: Amount,
    },
    /// Allowance set for `spender` over `owner`'s balance.
    Approval {
        owner: Principal,
        spender: Principal,
        amount: Amount,
    },
    /// Account frozen.
    Freeze { account: Principal },
    /// Account unfrozen.
    Unfreeze { account: Principal },
    /// Admin role granted.
    AdminAdded { account: Principal },
    /// Admin role removed.
    AdminRemoved { account: Principal },
}

impl std::fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transfer { .. } => write!(f, "TRANSFER"),
            Self::Approval { .. } => write!(f, "APPROVAL"),
            Self::Freeze { .. } => write!(f, "FREEZE"),
            Self::Unfreeze { .. } => write!(f, "UNFREEZE"),
            Self::AdminAdded { .. } => write!(f, "ADMIN_ADDED"),
            Self::AdminRemoved { .. } => write!(f, "ADMIN_REMOVED"),
        }
    }
}

/// Append-only list of events emitted by one instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<LedgerEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    #[must_use]
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    #[must_use]
    pub fn last(&self) -> Option<&LedgerEvent> {
        self.events.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Count events matching a predicate.
    pub fn count_where(&self, predicate: impl Fn(&LedgerEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_display() {
        let account = Principal::from_label("a");
        assert_eq!(format!("{}", LedgerEvent::Freeze { account }), "FREEZE");
        assert_eq!(
            format!("{}", LedgerEvent::AdminRemoved { account }),
            "ADMIN_REMOVED"
        );
    }

    #[test]
    fn event_serializes_with_tag() {
        let event = LedgerEvent::Unfreeze {
            account: Principal::from_label("a"),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"UNFREEZE\""), "Got: {json}");
        let back: LedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn log_appends_in_order() {
        let mut log = EventLog::new();
        assert!(log.is_empty());
        let account = Principal::from_label("a");
        log.emit(LedgerEvent::Freeze { account });
        log.emit(LedgerEvent::Unfreeze { account });
        assert_eq!(log.len(), 2);
        assert_eq!(log.last(), Some(&LedgerEvent::Unfreeze { account }));
        assert_eq!(
            log.count_where(|e| matches!(e, LedgerEvent::Freeze { .. })),
            1
        );
    }
}
