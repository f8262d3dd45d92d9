use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::error::Error;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::config::SdkConfig;

/// Ledger RPC surface used by the SDK.
#[async_trait]
pub trait SolConnection: Send + Sync {
    /// Submit a signed transaction and wait for confirmation.
    async fn send_transaction(
        &self,
        tx: &Transaction,
    ) -> Result<Signature, Box<dyn Error + Send + Sync>>;
    async fn get_account(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Option<Account>, Box<dyn Error + Send + Sync>>;
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, Box<dyn Error + Send + Sync>>;
    async fn get_latest_blockhash(&self) -> Result<Hash, Box<dyn Error + Send + Sync>>;
}

/// `SolConnection` over JSON-RPC.
///
/// Reads are bounded by `request_timeout` and retried once; submissions are
/// neither bounded nor retried.
pub struct RpcConnection {
    client: RpcClient,
    request_timeout: Duration,
}

impl RpcConnection {
    pub fn new(config: &SdkConfig) -> Self {
        let client =
            RpcClient::new_with_commitment(config.rpc_url().to_string(), config.commitment_config());
        Self {
            client,
            request_timeout: config.request_timeout(),
        }
    }

    pub fn with_client(client: RpcClient, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }

    async fn bounded_read<T, F, Fut>(
        &self,
        what: &str,
        op: F,
    ) -> Result<T, Box<dyn Error + Send + Sync>>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, solana_client::client_error::ClientError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err: Box<dyn Error + Send + Sync> =
                match tokio::time::timeout(self.request_timeout, op()).await {
                    Ok(Ok(value)) => return Ok(value),
                    Ok(Err(e)) => Box::new(e),
                    Err(_) => format!("{what} timed out after {:?}", self.request_timeout).into(),
                };

            if attempt >= 2 {
                return Err(err);
            }
            warn!("{} failed, retrying once: {}", what, err);
        }
    }
}

#[async_trait]
impl SolConnection for RpcConnection {
    async fn send_transaction(
        &self,
        tx: &Transaction,
    ) -> Result<Signature, Box<dyn Error + Send + Sync>> {
        debug!("Submitting transaction {:?}", tx.signatures.first());
        let signature = self.client.send_and_confirm_transaction(tx).await?;
        Ok(signature)
    }

    async fn get_account(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Option<Account>, Box<dyn Error + Send + Sync>> {
        let commitment = self.client.commitment();
        self.bounded_read("getAccountInfo", || async move {
            self.client
                .get_account_with_commitment(pubkey, commitment)
                .await
                .map(|response| response.value)
        })
        .await
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, Box<dyn Error + Send + Sync>> {
        self.bounded_read("getBalance", || self.client.get_balance(pubkey))
            .await
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, Box<dyn Error + Send + Sync>> {
        self.bounded_read("getLatestBlockhash", || self.client.get_latest_blockhash())
            .await
    }
}
