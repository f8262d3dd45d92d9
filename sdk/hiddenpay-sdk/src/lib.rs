pub mod core;
pub mod error;
pub mod orchestrator;
pub mod program;
pub mod session;
pub mod utils;
pub mod verifier;

pub use crate::core::config::{Cluster, SdkConfig};
pub use crate::core::connection::{RpcConnection, SolConnection};
pub use crate::error::{HiddenPaySdkError, Result};
pub use crate::orchestrator::{
    CreateProductParams, OperationReceipt, SubscribeParams, TransactionOrchestrator,
};
pub use crate::program::{
    derive_merchant_pda, derive_platform_pda, derive_product_pda, derive_subscription_pda,
    AccountRole,
};
pub use crate::session::{
    FileSessionStore, MemorySessionStore, SessionSnapshot, SessionStore, WalletProvider,
    WalletSession, WalletType,
};
pub use crate::utils::wait_for_balance;
pub use crate::verifier::{AccountVerifier, SubscriptionStatus};

pub mod state {
    pub use hiddenpay_state::{
        AnchorAccount, HiddenPayInstruction, Merchant, Platform, Subscription,
        SubscriptionProduct,
    };
}
