//! Issues `transfer` calls and drives the tracked [`TransferState`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::contract::ContractDescriptor;
use crate::session::{ContractCall, WalletSession};
use crate::transfer::{reduce, RequestId, TransferEvent, TransferRequest, TransferState};

pub struct TransferSubmitter {
    session: Arc<dyn WalletSession>,
    contract: Arc<ContractDescriptor>,
    next_id: AtomicU64,
    state: Arc<watch::Sender<TransferState>>,
}

impl TransferSubmitter {
    pub fn new(session: Arc<dyn WalletSession>, contract: Arc<ContractDescriptor>) -> Self {
        let (state, _) = watch::channel(TransferState::Idle);
        Self {
            session,
            contract,
            next_id: AtomicU64::new(1),
            state: Arc::new(state),
        }
    }

    /// Current tracked state.
    pub fn state(&self) -> TransferState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<TransferState> {
        self.state.subscribe()
    }

    /// Submits one `transfer(recipient, amount)` call.
    ///
    /// The state is `Pending` for the returned id as soon as this returns.
    /// The spawned task performs exactly one `write_contract` and then waits
    /// for the receipt. A later submission replaces this one in the tracked
    /// state; this task's events are then ignored. Must be called from
    /// within a tokio runtime.
    pub fn submit(&self, request: TransferRequest) -> (RequestId, JoinHandle<()>) {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        apply(&self.state, TransferEvent::Submitted(id));

        let call = ContractCall::new(
            Arc::clone(&self.contract),
            "transfer",
            vec![request.recipient, request.amount],
        );
        let session = Arc::clone(&self.session);
        let state = Arc::clone(&self.state);

        info!(request = %id, to = %call.args[0], amount = %call.args[1], "submitting transfer");

        let handle = tokio::spawn(async move {
            let hash = match session.write_contract(&call).await {
                Ok(hash) => hash,
                Err(e) => {
                    warn!(request = %id, error = %e, "transfer was not submitted");
                    apply(&state, TransferEvent::SubmissionFailed(id, e.to_string()));
                    return;
                }
            };

            info!(request = %id, tx = %hash, "transfer broadcast");
            apply(&state, TransferEvent::HashReceived(id, hash));

            match session.wait_for_receipt(hash).await {
                Ok(receipt) => {
                    info!(request = %id, tx = %hash, block = ?receipt.block_number, "transfer confirmed");
                    apply(&state, TransferEvent::ReceiptConfirmed(id));
                }
                Err(e) => {
                    warn!(request = %id, tx = %hash, error = %e, "transfer failed");
                    apply(&state, TransferEvent::ReceiptFailed(id, e.to_string()));
                }
            }
        });

        (id, handle)
    }
}

fn apply(state: &watch::Sender<TransferState>, event: TransferEvent) {
    state.send_if_modified(|current| {
        let next = reduce(current, event);
        if next == *current {
            return false;
        }
        *current = next;
        true
    });
}
