//! PDA seed prefixes.
//!
//! These byte strings are part of the wire contract with the on-chain
//! program. Changing one here without redeploying the program breaks every
//! derived address.

pub const PLATFORM_SEED: &[u8] = b"platform";
pub const MERCHANT_SEED: &[u8] = b"merchant";
pub const PRODUCT_SEED: &[u8] = b"product";
pub const SUBSCRIPTION_SEED: &[u8] = b"subscription";

/// Maximum length of a single seed accepted by the runtime.
pub const MAX_SEED_LEN: usize = 32;
