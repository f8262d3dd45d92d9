// Example: Registering a merchant from a local keypair
//
// This example demonstrates how to:
// 1. Load SDK configuration from HIDDENPAY_* environment variables
// 2. Back a wallet session with a local keypair instead of a browser wallet
// 3. Wait for the keypair to be funded
// 4. Create the merchant account and read it back

use async_trait::async_trait;
use hiddenpay_sdk::core::constants::LAMPORTS_PER_SOL;
use hiddenpay_sdk::session::{
    ConnectOptions, InjectedProvider, ProviderError, ProviderEvent, ProviderRegistry,
};
use hiddenpay_sdk::{
    wait_for_balance, AccountVerifier, MemorySessionStore, RpcConnection, SdkConfig,
    TransactionOrchestrator, WalletProvider, WalletSession, WalletType,
};
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

/// Wallet that signs with an in-process keypair.
struct LocalWallet {
    keypair: Keypair,
    events: broadcast::Sender<ProviderEvent>,
}

#[async_trait]
impl WalletProvider for LocalWallet {
    async fn connect(&self, _options: ConnectOptions) -> Result<Pubkey, ProviderError> {
        Ok(self.keypair.pubkey())
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn public_key(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction, ProviderError> {
        let blockhash = tx.message.recent_blockhash;
        tx.try_sign(&[&self.keypair], blockhash)
            .map_err(|e| ProviderError::Internal(e.to_string()))?;
        Ok(tx)
    }

    async fn sign_all_transactions(
        &self,
        txs: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, ProviderError> {
        let mut signed = Vec::with_capacity(txs.len());
        for tx in txs {
            signed.push(self.sign_transaction(tx).await?);
        }
        Ok(signed)
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, ProviderError> {
        Ok(self.keypair.sign_message(message))
    }

    async fn sign_and_send_transaction(
        &self,
        _tx: Transaction,
        _options: RpcSendTransactionConfig,
    ) -> Result<Signature, ProviderError> {
        Err(ProviderError::Unsupported("sign_and_send_transaction"))
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

struct LocalRegistry(Arc<LocalWallet>);

impl ProviderRegistry for LocalRegistry {
    fn discover(&self, wallet_type: WalletType) -> Option<InjectedProvider> {
        Some(InjectedProvider::new(wallet_type, self.0.clone()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Configuration and RPC connection
    let config = SdkConfig::from_env()?;
    let connection = Arc::new(RpcConnection::new(&config));

    // 2. Session backed by a fresh local keypair
    let (events, _) = broadcast::channel(4);
    let wallet = Arc::new(LocalWallet {
        keypair: Keypair::new(),
        events,
    });
    let session = WalletSession::new(
        Arc::new(LocalRegistry(wallet.clone())),
        Arc::new(MemorySessionStore::new()),
    );
    let authority = session.connect(WalletType::Phantom).await?;

    // 3. Fund it, e.g. `solana airdrop 1 <authority> --url devnet`
    println!("Fund {} to continue:", authority);
    println!("  {}", config.explorer_url(&authority));
    wait_for_balance(
        connection.as_ref(),
        &authority,
        LAMPORTS_PER_SOL / 10,
        config.funding_poll_interval(),
        Duration::from_secs(300),
    )
    .await?;

    // 4. Create the merchant and read it back
    let orchestrator = TransactionOrchestrator::new(connection.clone(), session, config.program_id);
    let receipt = orchestrator.create_merchant("Example Merchant").await?;

    let verifier = AccountVerifier::new(connection, config.program_id);
    if let Some(merchant) = verifier.fetch_merchant(&receipt.address).await? {
        println!("Created merchant {:?}:", merchant.name);
        println!("  Address: {}", receipt.address);
        println!("  Signature: {}", receipt.signature);
        println!("  Explorer: {}", config.explorer_url(&receipt.address));
    }

    Ok(())
}
