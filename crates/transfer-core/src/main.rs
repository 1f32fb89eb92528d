use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use transfer_core::balance::read_balance;
use transfer_core::config::{AppConfig, RawConfig};
use transfer_core::contract::ContractDescriptor;
use transfer_core::error::AppError;
use transfer_core::rpc_session::open_session;
use transfer_core::session::WalletSession;
use transfer_core::submitter::TransferSubmitter;
use transfer_core::view::{Page, TransferForm};

#[derive(Parser)]
#[command(name = "token-transfer", version, about = "Send ERC-20 tokens from a wallet session")]
struct Cli {
    /// Client project identifier.
    #[arg(long, env = "PROJECT_ID")]
    project_id: Option<String>,

    #[arg(long, env = "CHAIN_ID")]
    chain_id: Option<u64>,

    #[arg(long, env = "RPC_URL")]
    rpc_url: Option<String>,

    /// Hex private key for local signing; without it the endpoint's account is used.
    #[arg(long, env = "WALLET_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    #[arg(long, env = "RECEIPT_POLL_MS")]
    receipt_poll_ms: Option<u64>,

    #[arg(long, env = "RECEIPT_TIMEOUT_SECS")]
    receipt_timeout_secs: Option<u64>,

    /// Contract descriptor JSON.
    #[arg(long, default_value = "constants.json")]
    contract: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the connected account and its balance.
    Show,
    /// Transfer tokens and follow the transaction until it settles.
    Send {
        /// Recipient address.
        #[arg(long)]
        address: String,
        /// Amount in whole tokens, e.g. 0.05.
        #[arg(long)]
        value: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let mut config = AppConfig::from_raw(RawConfig {
        project_id: cli.project_id,
        chain_id: cli.chain_id,
        rpc_url: cli.rpc_url,
        private_key: cli.private_key,
        receipt_poll_ms: cli.receipt_poll_ms,
        receipt_timeout_secs: cli.receipt_timeout_secs,
    })?;
    info!(chain = config.chain.name, rpc = %config.rpc_url, "configuration loaded");

    let contract = Arc::new(ContractDescriptor::load(&cli.contract)?);
    let session = open_session(&mut config).await?;

    let mut page = Page {
        account: session.account(),
        balance: read_balance(session.as_ref(), &contract).await,
        ..Page::default()
    };

    let (address, value) = match cli.command {
        Command::Show => {
            print!("{page}");
            return Ok(ExitCode::SUCCESS);
        }
        Command::Send { address, value } => (address, value),
    };

    page.form = TransferForm::new(address, value);
    let request = page.form.submit()?;

    let submitter = TransferSubmitter::new(Arc::clone(&session), Arc::clone(&contract));
    let mut updates = submitter.subscribe();
    let (id, task) = submitter.submit(request);

    loop {
        page.state = updates.borrow_and_update().clone();
        if page.state.is_confirmed() {
            // The transfer changed the balance.
            page.balance = read_balance(session.as_ref(), &contract).await;
        }
        println!("{page}");

        if page.state.is_terminal() || updates.changed().await.is_err() {
            break;
        }
    }

    if let Err(e) = task.await {
        error!(request = %id, error = %e, "transfer task aborted");
    }

    if let Some(hash) = page.state.hash() {
        info!(explorer = %config.chain.tx_url(&hash.to_string()), "transaction");
    }

    Ok(if page.state.is_confirmed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
