//! Injected wallet providers.
//!
//! Browser wallets expose themselves on a shared host object. Here that lookup
//! goes through a `ProviderRegistry` handed to the session, and each wallet is
//! one variant of `InjectedProvider` wrapping the common `WalletProvider`
//! capability.

use async_trait::async_trait;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::error::HiddenPaySdkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletType {
    Phantom,
    Solflare,
    Backpack,
}

impl WalletType {
    pub const ALL: [WalletType; 3] = [WalletType::Phantom, WalletType::Solflare, WalletType::Backpack];

    pub fn as_str(&self) -> &'static str {
        match self {
            WalletType::Phantom => "phantom",
            WalletType::Solflare => "solflare",
            WalletType::Backpack => "backpack",
        }
    }

    /// Where to send the user when the wallet is not installed.
    pub fn install_url(&self) -> &'static str {
        match self {
            WalletType::Phantom => "https://phantom.app/",
            WalletType::Solflare => "https://solflare.com/",
            WalletType::Backpack => "https://backpack.app/",
        }
    }
}

impl fmt::Display for WalletType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletType {
    type Err = HiddenPaySdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WalletType::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| HiddenPaySdkError::InvalidParameter(format!("unknown wallet type {s}")))
    }
}

/// Errors reported by a wallet provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("Wallet disconnected")]
    Disconnected,

    #[error("Operation not supported by this wallet: {0}")]
    Unsupported(&'static str),

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Only succeed without a prompt if the site is already trusted
    pub only_if_trusted: bool,
}

/// Events a provider emits on its own initiative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderEvent {
    Disconnect,
    /// The user switched accounts inside the wallet; `None` means no account
    /// is exposed any more.
    AccountChanged(Option<Pubkey>),
}

/// Signing capability shared by every injected wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn connect(&self, options: ConnectOptions) -> Result<Pubkey, ProviderError>;

    async fn disconnect(&self) -> Result<(), ProviderError>;

    /// Whether the wallet already has an authorized session with this site.
    fn is_connected(&self) -> bool;

    fn public_key(&self) -> Option<Pubkey>;

    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction, ProviderError>;

    async fn sign_all_transactions(
        &self,
        txs: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, ProviderError>;

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, ProviderError>;

    async fn sign_and_send_transaction(
        &self,
        tx: Transaction,
        options: RpcSendTransactionConfig,
    ) -> Result<Signature, ProviderError>;

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

/// A discovered wallet, tagged by kind.
#[derive(Clone)]
pub enum InjectedProvider {
    Phantom(Arc<dyn WalletProvider>),
    Solflare(Arc<dyn WalletProvider>),
    Backpack(Arc<dyn WalletProvider>),
}

impl InjectedProvider {
    pub fn new(wallet_type: WalletType, provider: Arc<dyn WalletProvider>) -> Self {
        match wallet_type {
            WalletType::Phantom => InjectedProvider::Phantom(provider),
            WalletType::Solflare => InjectedProvider::Solflare(provider),
            WalletType::Backpack => InjectedProvider::Backpack(provider),
        }
    }

    pub fn wallet_type(&self) -> WalletType {
        match self {
            InjectedProvider::Phantom(_) => WalletType::Phantom,
            InjectedProvider::Solflare(_) => WalletType::Solflare,
            InjectedProvider::Backpack(_) => WalletType::Backpack,
        }
    }

    pub fn capability(&self) -> &dyn WalletProvider {
        match self {
            InjectedProvider::Phantom(p)
            | InjectedProvider::Solflare(p)
            | InjectedProvider::Backpack(p) => p.as_ref(),
        }
    }
}

impl fmt::Debug for InjectedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InjectedProvider")
            .field(&self.wallet_type())
            .finish()
    }
}

/// Looks up injected wallets in the host environment.
pub trait ProviderRegistry: Send + Sync {
    fn discover(&self, wallet_type: WalletType) -> Option<InjectedProvider>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_type_round_trips_storage_name() {
        for wallet in WalletType::ALL {
            assert_eq!(wallet.as_str().parse::<WalletType>().unwrap(), wallet);
        }
        assert!("metamask".parse::<WalletType>().is_err());
    }

    #[test]
    fn test_install_urls() {
        assert_eq!(WalletType::Phantom.install_url(), "https://phantom.app/");
        assert_eq!(WalletType::Backpack.install_url(), "https://backpack.app/");
    }
}
