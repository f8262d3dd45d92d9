use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::session::provider::WalletType;

/// SDK-specific error types for HiddenPay operations
#[derive(Debug, Error)]
pub enum HiddenPaySdkError {
    /// No injected provider for the requested wallet; the UI may send the
    /// user to `install_url`.
    #[error("{wallet_type} wallet not found, install it from {install_url}")]
    ProviderNotFound {
        wallet_type: WalletType,
        install_url: &'static str,
    },

    /// A connect attempt is already in flight
    #[error("A wallet connection is already in progress")]
    AlreadyConnecting,

    /// The user declined the request inside the wallet UI
    #[error("User rejected the request")]
    UserRejected,

    #[error("Wallet connection failed: {0}")]
    ConnectFailed(String),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Signing failed: {0}")]
    SignFailed(String),

    #[error("Transaction submission failed: {0}")]
    SubmitFailed(String),

    /// Seed material the runtime would reject (too long, too many seeds)
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    /// The ledger refused to initialize an account that already exists
    #[error("Account already exists: {0}")]
    AccountAlreadyExists(Pubkey),

    /// RPC error while checking an account, distinct from "absent"
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// Account not found on-chain
    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),

    /// Invalid account data or deserialization error
    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Connection or RPC error
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Balance of {address} still {observed} lamports, {required} required")]
    FundingTimeout {
        address: Pubkey,
        required: u64,
        observed: u64,
    },

    /// Borsh serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] std::io::Error),
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, HiddenPaySdkError>;
