//! HiddenPay Instruction Definitions
//!
//! Anchor encoding: `[sighash("global:<ix>") (8)][borsh args]`.

use borsh::BorshSerialize;
use solana_pubkey::Pubkey;

use crate::discriminator::{instruction_discriminator, DISCRIMINATOR_LEN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HiddenPayInstruction {
    /// Create the platform singleton
    ///
    /// Accounts:
    /// 0. `[writable]` Platform (PDA: ["platform"])
    /// 1. `[writable, signer]` Authority
    /// 2. `[]` System program
    Initialize,

    /// Register a merchant for the signing authority
    ///
    /// Accounts:
    /// 0. `[writable]` Merchant (PDA: ["merchant", authority])
    /// 1. `[writable]` Platform
    /// 2. `[writable, signer]` Authority
    /// 3. `[]` System program
    CreateMerchant { merchant_name: String },

    /// Create a subscription product under the authority's merchant
    ///
    /// Accounts:
    /// 0. `[writable]` Product (PDA: ["product", merchant, name])
    /// 1. `[writable]` Merchant (PDA: ["merchant", authority])
    /// 2. `[writable, signer]` Authority
    /// 3. `[]` System program
    CreateSubscriptionProduct {
        name: String,
        description: String,
        price: u64,
        duration_days: u32,
        token_mint: Pubkey,
    },

    /// Pay for a product and open a subscription pass
    ///
    /// Accounts:
    /// 0. `[writable]` Subscription (PDA: ["subscription", user, product])
    /// 1. `[writable]` Product
    /// 2. `[writable]` Merchant
    /// 3. `[writable]` Platform
    /// 4. `[writable, signer]` User
    /// 5. `[writable]` User token account
    /// 6. `[writable]` Merchant token account
    /// 7. `[]` Token program
    /// 8. `[]` System program
    Subscribe,

    /// Attach a proof hash to an existing subscription
    ///
    /// Accounts:
    /// 0. `[writable]` Subscription
    /// 1. `[signer]` User
    UpdateZkProof { proof_hash: [u8; 32] },

    /// Deactivate a subscription
    ///
    /// Accounts:
    /// 0. `[writable]` Subscription
    /// 1. `[signer]` User
    CancelSubscription,
}

#[derive(BorshSerialize)]
struct CreateMerchantArgs<'a> {
    merchant_name: &'a String,
}

#[derive(BorshSerialize)]
struct CreateSubscriptionProductArgs<'a> {
    name: &'a String,
    description: &'a String,
    price: u64,
    duration_days: u32,
    token_mint: &'a Pubkey,
}

impl HiddenPayInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::CreateMerchant { .. } => "create_merchant",
            Self::CreateSubscriptionProduct { .. } => "create_subscription_product",
            Self::Subscribe => "subscribe",
            Self::UpdateZkProof { .. } => "update_zk_proof",
            Self::CancelSubscription => "cancel_subscription",
        }
    }

    /// Serialize into instruction data.
    pub fn data(&self) -> Result<Vec<u8>, std::io::Error> {
        let mut data = Vec::with_capacity(DISCRIMINATOR_LEN + 64);
        data.extend_from_slice(&instruction_discriminator(self.name()));

        match self {
            Self::Initialize | Self::Subscribe | Self::CancelSubscription => {},
            Self::CreateMerchant { merchant_name } => {
                CreateMerchantArgs { merchant_name }.serialize(&mut data)?;
            },
            Self::CreateSubscriptionProduct {
                name,
                description,
                price,
                duration_days,
                token_mint,
            } => {
                CreateSubscriptionProductArgs {
                    name,
                    description,
                    price: *price,
                    duration_days: *duration_days,
                    token_mint,
                }
                .serialize(&mut data)?;
            },
            Self::UpdateZkProof { proof_hash } => {
                proof_hash.serialize(&mut data)?;
            },
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argless_instruction_is_discriminator_only() {
        let data = HiddenPayInstruction::Subscribe.data().unwrap();
        assert_eq!(data, vec![254, 28, 191, 138, 156, 179, 183, 53]);
    }

    #[test]
    fn test_create_merchant_layout() {
        let data = HiddenPayInstruction::CreateMerchant {
            merchant_name: "Acme".to_string(),
        }
        .data()
        .unwrap();

        assert_eq!(&data[..8], &instruction_discriminator("create_merchant"));
        assert_eq!(&data[8..12], &4u32.to_le_bytes());
        assert_eq!(&data[12..], b"Acme");
    }

    #[test]
    fn test_create_product_layout() {
        let mint = Pubkey::new_unique();
        let data = HiddenPayInstruction::CreateSubscriptionProduct {
            name: "Pro".to_string(),
            description: "".to_string(),
            price: 5,
            duration_days: 30,
            token_mint: mint,
        }
        .data()
        .unwrap();

        // disc(8) + name(4+3) + description(4) + price(8) + duration(4) + mint(32)
        assert_eq!(data.len(), 8 + 7 + 4 + 8 + 4 + 32);
        assert_eq!(&data[19..27], &5u64.to_le_bytes());
        assert_eq!(&data[27..31], &30u32.to_le_bytes());
        assert_eq!(&data[31..], mint.as_ref());
    }
}
