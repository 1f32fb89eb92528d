//! Transfer requests and the tracked transaction's state machine.
//!
//! ```text
//! Idle -> Pending -> Confirming -> Confirmed
//!            \            \
//!             -> Failed    -> Failed
//! ```
//!
//! All transitions go through [`reduce`]. Every event carries the
//! [`RequestId`] of the submission it belongs to; events for anything but the
//! currently tracked request are dropped.

use std::fmt;

use alloy_primitives::B256;

/// Monotonic identity of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Recipient and amount as entered in the form, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub recipient: String,
    /// Decimal token quantity, e.g. `"0.05"`.
    pub amount: String,
}

/// The single tracked transaction record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransferState {
    #[default]
    Idle,
    /// Handed to the wallet; no hash yet.
    Pending { id: RequestId },
    /// Broadcast; waiting for the receipt.
    Confirming { id: RequestId, hash: B256 },
    Confirmed { id: RequestId, hash: B256 },
    /// `hash` is `None` when the wallet never broadcast the transaction.
    Failed {
        id: RequestId,
        hash: Option<B256>,
        reason: String,
    },
}

impl TransferState {
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            TransferState::Idle => None,
            TransferState::Pending { id }
            | TransferState::Confirming { id, .. }
            | TransferState::Confirmed { id, .. }
            | TransferState::Failed { id, .. } => Some(*id),
        }
    }

    pub fn hash(&self) -> Option<B256> {
        match self {
            TransferState::Confirming { hash, .. } | TransferState::Confirmed { hash, .. } => {
                Some(*hash)
            }
            TransferState::Failed { hash, .. } => *hash,
            TransferState::Idle | TransferState::Pending { .. } => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TransferState::Pending { .. })
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self, TransferState::Confirming { .. })
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, TransferState::Confirmed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TransferState::Failed { .. })
    }

    /// Confirmed or failed; no further events apply.
    pub fn is_terminal(&self) -> bool {
        self.is_confirmed() || self.is_failed()
    }
}

/// Notifications that drive [`TransferState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    Submitted(RequestId),
    HashReceived(RequestId, B256),
    ReceiptConfirmed(RequestId),
    ReceiptFailed(RequestId, String),
    SubmissionFailed(RequestId, String),
}

impl TransferEvent {
    pub fn request_id(&self) -> RequestId {
        match self {
            TransferEvent::Submitted(id)
            | TransferEvent::HashReceived(id, _)
            | TransferEvent::ReceiptConfirmed(id)
            | TransferEvent::ReceiptFailed(id, _)
            | TransferEvent::SubmissionFailed(id, _) => *id,
        }
    }
}

/// Computes the next state. Stale or out-of-order events leave the state
/// unchanged.
pub fn reduce(state: &TransferState, event: TransferEvent) -> TransferState {
    let tracked = state.request_id();

    if let TransferEvent::Submitted(id) = event {
        // A newer submission replaces whatever is tracked.
        return match tracked {
            Some(current) if id <= current => state.clone(),
            _ => TransferState::Pending { id },
        };
    }

    if tracked != Some(event.request_id()) {
        return state.clone();
    }

    match (state, event) {
        (TransferState::Pending { id }, TransferEvent::HashReceived(_, hash)) => {
            TransferState::Confirming { id: *id, hash }
        }
        (TransferState::Pending { id }, TransferEvent::SubmissionFailed(_, reason)) => {
            TransferState::Failed {
                id: *id,
                hash: None,
                reason,
            }
        }
        (TransferState::Confirming { id, hash }, TransferEvent::ReceiptConfirmed(_)) => {
            TransferState::Confirmed { id: *id, hash: *hash }
        }
        (TransferState::Confirming { id, hash }, TransferEvent::ReceiptFailed(_, reason)) => {
            TransferState::Failed {
                id: *id,
                hash: Some(*hash),
                reason,
            }
        }
        (state, _) => state.clone(),
    }
}
