use hiddenpay_state::{AnchorAccount, HiddenPayProgramError};
use solana_client::client_error::ClientError;
use solana_sdk::instruction::InstructionError;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::TransactionError;
use std::error::Error;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::core::connection::SolConnection;
use crate::error::{HiddenPaySdkError, Result};

/// System program `AccountAlreadyInUse`, surfaced when an `init` target exists.
const ACCOUNT_ALREADY_IN_USE: u32 = 0;

//=============================================================================
// Account Fetching & Parsing
//=============================================================================

/// Fetch raw account data, failing if the account does not exist
pub async fn fetch_account_data(
    connection: &impl SolConnection,
    address: &Pubkey,
) -> Result<Vec<u8>> {
    let account = connection
        .get_account(address)
        .await
        .map_err(|e| HiddenPaySdkError::Connection(e.to_string()))?
        .ok_or(HiddenPaySdkError::AccountNotFound(*address))?;

    Ok(account.data)
}

/// Fetch and decode an Anchor account owned by the program
pub async fn fetch_anchor_account<T: AnchorAccount>(
    connection: &impl SolConnection,
    address: &Pubkey,
) -> Result<T> {
    let data = fetch_account_data(connection, address).await?;
    T::try_from_account_data(&data)
        .map_err(|e| HiddenPaySdkError::InvalidAccountData(e.to_string()))
}

//=============================================================================
// Ledger Error Classification
//=============================================================================

fn transaction_error(err: &(dyn Error + Send + Sync + 'static)) -> Option<TransactionError> {
    if let Some(client_err) = err.downcast_ref::<ClientError>() {
        return client_err.get_transaction_error();
    }
    err.downcast_ref::<TransactionError>().cloned()
}

/// Map a failed submission to the SDK taxonomy.
///
/// `init_target` is the account the instruction creates, if any; a system
/// program "already in use" failure is reported against it.
pub fn classify_submit_error(
    err: Box<dyn Error + Send + Sync>,
    init_target: Option<Pubkey>,
) -> HiddenPaySdkError {
    match (transaction_error(err.as_ref()), init_target) {
        (
            Some(TransactionError::InstructionError(_, InstructionError::Custom(ACCOUNT_ALREADY_IN_USE))),
            Some(target),
        ) => HiddenPaySdkError::AccountAlreadyExists(target),
        (Some(TransactionError::AlreadyProcessed), _) => {
            HiddenPaySdkError::SubmitFailed("transaction already processed".to_string())
        },
        (Some(TransactionError::InstructionError(index, InstructionError::Custom(code))), _) => {
            match HiddenPayProgramError::from_code(code) {
                Some(program_err) => HiddenPaySdkError::SubmitFailed(format!(
                    "instruction {index}: {}",
                    program_err.message()
                )),
                None => HiddenPaySdkError::SubmitFailed(err.to_string()),
            }
        },
        _ => HiddenPaySdkError::SubmitFailed(err.to_string()),
    }
}

//=============================================================================
// Funding
//=============================================================================

/// Poll the balance of `address` until it reaches `min_lamports`.
///
/// Fails with `FundingTimeout` once `timeout` elapses; RPC failures abort the
/// wait immediately.
pub async fn wait_for_balance(
    connection: &impl SolConnection,
    address: &Pubkey,
    min_lamports: u64,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<u64> {
    let deadline = Instant::now() + timeout;

    loop {
        let balance = connection
            .get_balance(address)
            .await
            .map_err(|e| HiddenPaySdkError::Connection(e.to_string()))?;

        if balance >= min_lamports {
            info!("{} funded with {} lamports", address, balance);
            return Ok(balance);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(HiddenPaySdkError::FundingTimeout {
                address: *address,
                required: min_lamports,
                observed: balance,
            });
        }

        debug!(
            "{} has {} of {} lamports, polling again",
            address, balance, min_lamports
        );
        tokio::time::sleep(poll_interval.min(deadline - now)).await;
    }
}
