//! Account layouts owned by the HiddenPay program.
//!
//! Every account is `[discriminator (8)][borsh body][zero padding]`, the body
//! allocated at its maximum size (`8 + LEN`).

use borsh::{BorshDeserialize, BorshSerialize};
use solana_pubkey::Pubkey;

use crate::discriminator::{account_discriminator, DISCRIMINATOR_LEN};
use crate::error::HiddenPayStateError;

/// Common behaviour for Anchor-encoded accounts.
pub trait AnchorAccount: BorshSerialize + BorshDeserialize + Sized {
    /// Type name used for the account discriminator.
    const NAME: &'static str;

    /// Maximum body size, discriminator excluded.
    const LEN: usize;

    fn discriminator() -> [u8; DISCRIMINATOR_LEN] {
        account_discriminator(Self::NAME)
    }

    /// Decode from raw account data, checking the discriminator.
    /// Trailing padding after the body is ignored.
    fn try_from_account_data(data: &[u8]) -> Result<Self, HiddenPayStateError> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(HiddenPayStateError::DataTooSmall(data.len()));
        }
        if data[..DISCRIMINATOR_LEN] != Self::discriminator() {
            return Err(HiddenPayStateError::DiscriminatorMismatch(Self::NAME));
        }

        let mut body = &data[DISCRIMINATOR_LEN..];
        Self::deserialize(&mut body).map_err(|e| HiddenPayStateError::Decode(Self::NAME, e))
    }

    /// Encode as the program would lay the account out on-chain.
    fn to_account_data(&self) -> Result<Vec<u8>, std::io::Error> {
        let mut data = Vec::with_capacity(DISCRIMINATOR_LEN + Self::LEN);
        data.extend_from_slice(&Self::discriminator());
        self.serialize(&mut data)?;
        if data.len() < DISCRIMINATOR_LEN + Self::LEN {
            data.resize(DISCRIMINATOR_LEN + Self::LEN, 0);
        }
        Ok(data)
    }
}

/// Platform singleton.
///
/// PDA Seeds: ["platform"]
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub authority: Pubkey,
    pub total_subscriptions: u64,
    pub total_merchants: u64,
    pub bump: u8,
}

impl AnchorAccount for Platform {
    const NAME: &'static str = "Platform";
    const LEN: usize = 32 + 8 + 8 + 1;
}

/// Merchant account, one per authority.
///
/// PDA Seeds: ["merchant", authority]
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Merchant {
    pub authority: Pubkey,
    pub name: String,
    pub total_products: u32,
    pub total_revenue: u64,
    pub is_verified: bool,
    pub bump: u8,
}

impl AnchorAccount for Merchant {
    const NAME: &'static str = "Merchant";
    const LEN: usize = 32 + (4 + 50) + 4 + 8 + 1 + 1;
}

/// Subscription product offered by a merchant.
///
/// PDA Seeds: ["product", merchant, name]
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionProduct {
    pub merchant: Pubkey,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub duration_days: u32,
    pub token_mint: Pubkey,
    pub total_subscribers: u64,
    pub is_active: bool,
    pub bump: u8,
}

impl AnchorAccount for SubscriptionProduct {
    const NAME: &'static str = "SubscriptionProduct";
    const LEN: usize = 32 + (4 + 50) + (4 + 200) + 8 + 4 + 32 + 8 + 1 + 1;
}

/// Subscription pass held by a subscriber for one product.
///
/// PDA Seeds: ["subscription", user, product]
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub user: Pubkey,
    pub product: Pubkey,
    pub merchant: Pubkey,
    pub start_time: i64,
    pub end_time: i64,
    pub is_active: bool,
    pub proof_hash: [u8; 32],
    pub bump: u8,
}

impl AnchorAccount for Subscription {
    const NAME: &'static str = "Subscription";
    const LEN: usize = 32 + 32 + 32 + 8 + 8 + 1 + 32 + 1;
}

impl Subscription {
    /// Unix timestamp after which the pass lapses.
    pub fn expires_at(&self) -> i64 {
        self.end_time
    }

    /// Mirrors the program's `verify_subscription` check.
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.is_active && now <= self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> SubscriptionProduct {
        SubscriptionProduct {
            merchant: Pubkey::new_unique(),
            name: "Pro".to_string(),
            description: "Monthly access".to_string(),
            price: 1_000_000,
            duration_days: 30,
            token_mint: Pubkey::default(),
            total_subscribers: 0,
            is_active: true,
            bump: 254,
        }
    }

    #[test]
    fn test_account_data_is_padded_to_allocated_size() {
        let data = sample_product().to_account_data().unwrap();
        assert_eq!(data.len(), DISCRIMINATOR_LEN + SubscriptionProduct::LEN);
    }

    #[test]
    fn test_decode_ignores_trailing_padding() {
        let product = sample_product();
        let data = product.to_account_data().unwrap();
        let decoded = SubscriptionProduct::try_from_account_data(&data).unwrap();
        assert_eq!(decoded, product);
    }

    #[test]
    fn test_decode_rejects_foreign_discriminator() {
        let data = sample_product().to_account_data().unwrap();
        let err = Merchant::try_from_account_data(&data).unwrap_err();
        assert!(matches!(err, HiddenPayStateError::DiscriminatorMismatch("Merchant")));
    }

    #[test]
    fn test_decode_rejects_short_data() {
        let err = Platform::try_from_account_data(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, HiddenPayStateError::DataTooSmall(3)));
    }

    #[test]
    fn test_subscription_validity_window() {
        let sub = Subscription {
            user: Pubkey::new_unique(),
            product: Pubkey::new_unique(),
            merchant: Pubkey::new_unique(),
            start_time: 1_000,
            end_time: 1_000 + 30 * 86_400,
            is_active: true,
            proof_hash: [0; 32],
            bump: 255,
        };
        assert!(sub.is_valid_at(1_000));
        assert!(sub.is_valid_at(sub.end_time));
        assert!(!sub.is_valid_at(sub.end_time + 1));

        let cancelled = Subscription {
            is_active: false,
            ..sub
        };
        assert!(!cancelled.is_valid_at(1_000));
    }
}
