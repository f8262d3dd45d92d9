//! Deterministic account addresses shared with the on-chain program.

use hiddenpay_state::seeds::{
    MAX_SEED_LEN, MERCHANT_SEED, PLATFORM_SEED, PRODUCT_SEED, SUBSCRIPTION_SEED,
};
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use tracing::debug;

use crate::error::{HiddenPaySdkError, Result};

/// Account role, selecting the domain-separation prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountRole {
    Platform,
    Merchant,
    Product,
    Subscription,
}

impl AccountRole {
    pub fn prefix(&self) -> &'static [u8] {
        match self {
            AccountRole::Platform => PLATFORM_SEED,
            AccountRole::Merchant => MERCHANT_SEED,
            AccountRole::Product => PRODUCT_SEED,
            AccountRole::Subscription => SUBSCRIPTION_SEED,
        }
    }

    /// Number of seeds following the prefix.
    fn arity(&self) -> usize {
        match self {
            AccountRole::Platform => 0,
            AccountRole::Merchant => 1,
            AccountRole::Product | AccountRole::Subscription => 2,
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccountRole::Platform => "platform",
            AccountRole::Merchant => "merchant",
            AccountRole::Product => "product",
            AccountRole::Subscription => "subscription",
        })
    }
}

/// Derive `(address, bump)` for `role` with the role-specific `seeds`.
///
/// Seeds over the runtime limit fail with `InvalidSeed`; they are never
/// truncated.
pub fn derive(program_id: &Pubkey, role: AccountRole, seeds: &[&[u8]]) -> Result<(Pubkey, u8)> {
    if seeds.len() != role.arity() {
        return Err(HiddenPaySdkError::InvalidSeed(format!(
            "{role} takes {} seed(s), got {}",
            role.arity(),
            seeds.len()
        )));
    }
    if let Some((i, seed)) = seeds
        .iter()
        .enumerate()
        .find(|(_, s)| s.len() > MAX_SEED_LEN)
    {
        return Err(HiddenPaySdkError::InvalidSeed(format!(
            "{role} seed {i} is {} bytes, max {MAX_SEED_LEN}",
            seed.len()
        )));
    }

    let mut full: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
    full.push(role.prefix());
    full.extend_from_slice(seeds);

    let (address, bump) = Pubkey::try_find_program_address(&full, program_id).ok_or_else(|| {
        HiddenPaySdkError::InvalidSeed(format!("no off-curve {role} address for seeds"))
    })?;

    debug!("Derived {} PDA {} (bump {})", role, address, bump);
    Ok((address, bump))
}

/// Derive the Platform PDA (singleton)
pub fn derive_platform_pda(program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(program_id, AccountRole::Platform, &[])
}

/// Derive the Merchant PDA for an authority
pub fn derive_merchant_pda(program_id: &Pubkey, authority: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(program_id, AccountRole::Merchant, &[authority.as_ref()])
}

/// Derive the Product PDA from its merchant PDA and name
pub fn derive_product_pda(
    program_id: &Pubkey,
    merchant: &Pubkey,
    name: &str,
) -> Result<(Pubkey, u8)> {
    derive(
        program_id,
        AccountRole::Product,
        &[merchant.as_ref(), name.as_bytes()],
    )
}

/// Derive the Subscription PDA for a (subscriber, product) pair
pub fn derive_subscription_pda(
    program_id: &Pubkey,
    subscriber: &Pubkey,
    product: &Pubkey,
) -> Result<(Pubkey, u8)> {
    derive(
        program_id,
        AccountRole::Subscription,
        &[subscriber.as_ref(), product.as_ref()],
    )
}
