//! Ledger-side checks on derived accounts.

use hiddenpay_state::{AnchorAccount, Merchant, Platform, Subscription, SubscriptionProduct};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;

use crate::core::connection::SolConnection;
use crate::error::{HiddenPaySdkError, Result};
use crate::program::pda;

/// Expiry-aware reading of a subscription account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// No account at the address
    Missing,
    Active { expires_at: i64 },
    Expired { expired_at: i64 },
    Cancelled,
}

impl SubscriptionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active { .. })
    }
}

pub struct AccountVerifier<C: SolConnection> {
    connection: Arc<C>,
    program_id: Pubkey,
}

impl<C: SolConnection> AccountVerifier<C> {
    pub fn new(connection: Arc<C>, program_id: Pubkey) -> Self {
        Self {
            connection,
            program_id,
        }
    }

    /// Subscription address for a (subscriber, product) pair.
    pub fn subscription_address(&self, subscriber: &Pubkey, product: &Pubkey) -> Result<Pubkey> {
        Ok(pda::derive_subscription_pda(&self.program_id, subscriber, product)?.0)
    }

    /// `true` iff an account exists at `address`.
    ///
    /// Presence only: a cancelled or lapsed subscription still verifies. Use
    /// [`Self::subscription_status`] when expiry matters.
    pub async fn verify_subscription(&self, address: &Pubkey) -> Result<bool> {
        let exists = self
            .connection
            .get_account(address)
            .await
            .map_err(|e| HiddenPaySdkError::VerificationFailed(e.to_string()))?
            .is_some();

        debug!("Subscription {} exists: {}", address, exists);
        Ok(exists)
    }

    /// Decode the subscription at `address` and judge it at unix time `now`.
    pub async fn subscription_status(&self, address: &Pubkey, now: i64) -> Result<SubscriptionStatus> {
        let Some(subscription) = self.fetch_subscription(address).await? else {
            return Ok(SubscriptionStatus::Missing);
        };

        let status = if !subscription.is_active {
            SubscriptionStatus::Cancelled
        } else if subscription.is_valid_at(now) {
            SubscriptionStatus::Active {
                expires_at: subscription.expires_at(),
            }
        } else {
            SubscriptionStatus::Expired {
                expired_at: subscription.expires_at(),
            }
        };
        Ok(status)
    }

    pub async fn fetch_subscription(&self, address: &Pubkey) -> Result<Option<Subscription>> {
        self.fetch(address).await
    }

    pub async fn fetch_product(&self, address: &Pubkey) -> Result<Option<SubscriptionProduct>> {
        self.fetch(address).await
    }

    pub async fn fetch_merchant(&self, address: &Pubkey) -> Result<Option<Merchant>> {
        self.fetch(address).await
    }

    pub async fn fetch_platform(&self) -> Result<Option<Platform>> {
        let (platform, _) = pda::derive_platform_pda(&self.program_id)?;
        self.fetch(&platform).await
    }

    async fn fetch<T: AnchorAccount>(&self, address: &Pubkey) -> Result<Option<T>> {
        let Some(account) = self
            .connection
            .get_account(address)
            .await
            .map_err(|e| HiddenPaySdkError::VerificationFailed(e.to_string()))?
        else {
            return Ok(None);
        };

        if account.owner != self.program_id {
            return Err(HiddenPaySdkError::InvalidAccountData(format!(
                "{} {} is owned by {}, not the program",
                T::NAME,
                address,
                account.owner
            )));
        }

        T::try_from_account_data(&account.data)
            .map(Some)
            .map_err(|e| HiddenPaySdkError::InvalidAccountData(e.to_string()))
    }
}
