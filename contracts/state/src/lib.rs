//! HiddenPay State Module
//!
//! Wire contract shared with the on-chain HiddenPay program: seed prefixes,
//! Anchor account layouts and instruction encodings. Nothing in here talks to
//! the network.

pub mod discriminator;
pub mod error;
pub mod instruction;
pub mod seeds;
pub mod state;

pub use discriminator::{account_discriminator, instruction_discriminator, DISCRIMINATOR_LEN};
pub use error::{HiddenPayProgramError, HiddenPayStateError};
pub use instruction::HiddenPayInstruction;
pub use state::{AnchorAccount, Merchant, Platform, Subscription, SubscriptionProduct};

use solana_pubkey::Pubkey;

/// Program ID of the deployed HiddenPay program.
pub const ID: Pubkey = solana_pubkey::pubkey!("HiddenPayProgram111111111111111111111111111");

pub fn id() -> Pubkey {
    ID
}

/// Program-side length limits (enforced by `require!` checks on-chain).
pub const MAX_NAME_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 200;
