//! End-to-end tests of the transfer workflow against a scripted wallet
//! session: descriptor -> balance -> form -> submit -> state -> page.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use chain_eth::error::EthError;
use tokio::sync::Semaphore;

use transfer_core::balance::read_balance;
use transfer_core::config::{AppConfig, RawConfig};
use transfer_core::contract::ContractDescriptor;
use transfer_core::error::SessionError;
use transfer_core::rpc_session::open_session;
use transfer_core::session::{ContractCall, Receipt, WalletSession};
use transfer_core::submitter::TransferSubmitter;
use transfer_core::transfer::{RequestId, TransferState};
use transfer_core::view::{Page, TransferForm};

const ACCOUNT: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";
const RECIPIENT: &str = "0xA0Cf798816D4b9b9866b5330EEa46a18382f251e";

fn descriptor() -> Arc<ContractDescriptor> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../constants.json");
    Arc::new(ContractDescriptor::load(std::path::Path::new(path)).unwrap())
}

fn tokens(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

fn scripted_hash(n: u64) -> B256 {
    B256::from_str(&format!("0xabc{n:061x}")).unwrap()
}

/// Wallet session double. Receipts are held until the test releases them.
struct ScriptedSession {
    account: Option<Address>,
    balance: Mutex<Option<U256>>,
    revert: bool,
    writes: Mutex<Vec<ContractCall>>,
    issued: AtomicU64,
    receipts: Semaphore,
}

impl ScriptedSession {
    fn connected(balance: U256) -> Arc<Self> {
        Arc::new(Self::new(Some(Address::from_str(ACCOUNT).unwrap()), Some(balance), false))
    }

    fn new(account: Option<Address>, balance: Option<U256>, revert: bool) -> Self {
        Self {
            account,
            balance: Mutex::new(balance),
            revert,
            writes: Mutex::new(Vec::new()),
            issued: AtomicU64::new(0),
            receipts: Semaphore::new(0),
        }
    }

    fn writes(&self) -> Vec<ContractCall> {
        self.writes.lock().unwrap().clone()
    }

    fn release_receipts(&self, n: usize) {
        self.receipts.add_permits(n);
    }
}

#[async_trait]
impl WalletSession for ScriptedSession {
    fn account(&self) -> Option<Address> {
        self.account
    }

    async fn write_contract(&self, call: &ContractCall) -> Result<B256, SessionError> {
        self.writes.lock().unwrap().push(call.clone());
        self.account.ok_or(SessionError::NotConnected)?;
        // A real wallet rejects calls it cannot encode.
        call.calldata()?;
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(scripted_hash(n))
    }

    async fn read_contract(&self, call: &ContractCall) -> Result<Vec<u8>, SessionError> {
        call.calldata()?;
        match *self.balance.lock().unwrap() {
            Some(raw) => Ok(raw.to_be_bytes::<32>().to_vec()),
            None => Err(SessionError::Chain(EthError::Transport("offline".into()))),
        }
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<Receipt, SessionError> {
        self.receipts
            .acquire()
            .await
            .map_err(|_| SessionError::ReceiptTimeout(tx_hash))?
            .forget();
        if self.revert {
            return Err(SessionError::Reverted(tx_hash));
        }
        Ok(Receipt {
            tx_hash,
            block_number: Some(1),
        })
    }
}

async fn settle(submitter: &TransferSubmitter) -> TransferState {
    let mut updates = submitter.subscribe();
    let state = updates.wait_for(|s| s.is_terminal()).await.unwrap().clone();
    state
}

#[tokio::test]
async fn end_to_end_transfer_scenario() {
    let session = ScriptedSession::connected(tokens(10));
    let contract = descriptor();

    let mut page = Page {
        account: session.account(),
        balance: read_balance(session.as_ref(), &contract).await,
        form: TransferForm::new(RECIPIENT, "0.05"),
        ..Page::default()
    };
    assert!(page.lines().contains(&"Tu balance es de: 10".to_string()));

    let submitter = TransferSubmitter::new(session.clone(), contract);
    let (id, task) = submitter.submit(page.form.submit().unwrap());
    assert_eq!(id, RequestId(1));

    // The spawned task has not run yet on the current-thread runtime.
    page.state = submitter.state();
    assert!(page.state.is_pending());
    assert!(!page.submit_enabled());

    let mut updates = submitter.subscribe();
    page.state = updates.wait_for(|s| s.is_confirming()).await.unwrap().clone();
    let text = page.to_string();
    assert!(text.contains("Waiting for confirmation..."));
    assert!(text.contains(&format!("Transaction Hash: {}", scripted_hash(0))));
    assert!(text.contains("Transaction Hash: 0xabc"));
    assert!(!text.contains("Transaction confirmed."));

    session.release_receipts(1);
    page.state = settle(&submitter).await;
    task.await.unwrap();

    let text = page.to_string();
    assert!(text.contains("Transaction confirmed."));
    assert!(!text.contains("Waiting for confirmation..."));
    assert!(text.contains(&format!("Transaction Hash: {}", scripted_hash(0))));

    let writes = session.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].function, "transfer");
    assert_eq!(writes[0].args, vec![RECIPIENT.to_string(), "0.05".to_string()]);
}

#[tokio::test]
async fn each_submission_issues_exactly_one_write() {
    let session = ScriptedSession::connected(tokens(1));
    let submitter = TransferSubmitter::new(session.clone(), descriptor());

    for amount in ["1", "0.5", "0.000000000000000001"] {
        let before = session.writes().len();
        let (_, task) = submitter.submit(TransferForm::new(RECIPIENT, amount).submit().unwrap());
        session.release_receipts(1);
        task.await.unwrap();

        let writes = session.writes();
        assert_eq!(writes.len(), before + 1);
        assert_eq!(writes.last().unwrap().args[1], amount);
    }
    assert!(submitter.state().is_confirmed());
}

#[tokio::test]
async fn no_connected_account_fails_quietly() {
    let session = Arc::new(ScriptedSession::new(None, Some(tokens(5)), false));
    let contract = descriptor();

    assert!(read_balance(session.as_ref(), &contract).await.is_none());

    let submitter = TransferSubmitter::new(session.clone(), contract);
    let (_, task) = submitter.submit(TransferForm::new(RECIPIENT, "1").submit().unwrap());
    task.await.unwrap();

    let state = submitter.state();
    match &state {
        TransferState::Failed { hash, reason, .. } => {
            assert!(hash.is_none());
            assert_eq!(reason, "no wallet connected");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(session.writes().len(), 1);

    let page = Page {
        state,
        ..Page::default()
    };
    let text = page.to_string();
    assert!(text.contains("[ Connect Wallet ]"));
    assert!(text.contains("Transaction failed."));
    assert!(page.submit_enabled());
}

#[tokio::test]
async fn malformed_input_is_rejected_by_the_session() {
    let session = ScriptedSession::connected(tokens(1));
    let submitter = TransferSubmitter::new(session.clone(), descriptor());

    let (_, task) = submitter.submit(TransferForm::new("0xA0Cf…251e", "0.05").submit().unwrap());
    task.await.unwrap();

    assert!(matches!(
        submitter.state(),
        TransferState::Failed { hash: None, .. }
    ));
    assert_eq!(session.writes().len(), 1);
}

#[tokio::test]
async fn reverted_transfer_keeps_hash() {
    let session = Arc::new(ScriptedSession::new(
        Some(Address::from_str(ACCOUNT).unwrap()),
        Some(tokens(1)),
        true,
    ));
    let submitter = TransferSubmitter::new(session.clone(), descriptor());

    let (_, task) = submitter.submit(TransferForm::new(RECIPIENT, "2").submit().unwrap());
    session.release_receipts(1);
    task.await.unwrap();

    let state = submitter.state();
    assert!(state.is_failed());
    assert_eq!(state.hash(), Some(scripted_hash(0)));
}

#[tokio::test]
async fn later_submission_wins() {
    let session = ScriptedSession::connected(tokens(3));
    let submitter = TransferSubmitter::new(session.clone(), descriptor());

    let (first, first_task) = submitter.submit(TransferForm::new(RECIPIENT, "1").submit().unwrap());
    let (second, second_task) = submitter.submit(TransferForm::new(RECIPIENT, "2").submit().unwrap());
    assert!(second > first);
    assert_eq!(submitter.state(), TransferState::Pending { id: second });

    session.release_receipts(2);
    first_task.await.unwrap();
    second_task.await.unwrap();

    // Both calls went out, but only the second one is tracked.
    let writes = session.writes();
    assert_eq!(writes.len(), 2);
    let second_write = writes.iter().position(|c| c.args[1] == "2").unwrap();

    let state = submitter.state();
    assert!(state.is_confirmed());
    assert_eq!(state.request_id(), Some(second));
    assert_eq!(state.hash(), Some(scripted_hash(second_write as u64)));
}

#[tokio::test]
async fn balance_unavailable_renders_blank() {
    let session = Arc::new(ScriptedSession::new(
        Some(Address::from_str(ACCOUNT).unwrap()),
        None,
        false,
    ));
    let balance = read_balance(session.as_ref(), &descriptor()).await;
    assert!(balance.is_none());

    let page = Page {
        account: session.account(),
        balance,
        ..Page::default()
    };
    assert_eq!(page.lines()[4], "");
}

#[tokio::test]
async fn balance_formats_raw_units() {
    let raw = U256::from_str_radix("50000000000000000000", 10).unwrap();
    let session = ScriptedSession::connected(raw);

    let balance = read_balance(session.as_ref(), &descriptor()).await.unwrap();
    assert_eq!(balance.raw, raw);
    assert_eq!(balance.to_string(), "50");

    *session.balance.lock().unwrap() = Some(tokens(49));
    let refreshed = read_balance(session.as_ref(), &descriptor()).await.unwrap();
    assert_eq!(refreshed.to_string(), "49");
}

#[tokio::test]
async fn unreachable_endpoint_still_renders_and_send_fails() {
    let mut config = AppConfig::from_raw(RawConfig {
        project_id: Some("test-project".into()),
        rpc_url: Some("http://127.0.0.1:9".into()),
        ..RawConfig::default()
    })
    .unwrap();
    let session = open_session(&mut config).await.unwrap();
    let contract = descriptor();

    let mut page = Page {
        account: session.account(),
        balance: read_balance(session.as_ref(), &contract).await,
        form: TransferForm::new(RECIPIENT, "0.05"),
        ..Page::default()
    };
    let lines = page.lines();
    assert_eq!(lines[0], "[ Connect Wallet ]");
    assert_eq!(lines[4], "");

    let submitter = TransferSubmitter::new(session, contract);
    let (_, task) = submitter.submit(page.form.submit().unwrap());
    task.await.unwrap();

    page.state = submitter.state();
    match &page.state {
        TransferState::Failed { hash, reason, .. } => {
            assert!(hash.is_none());
            assert_eq!(reason, "no wallet connected");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(page.to_string().contains("Transaction failed."));
}
