use hiddenpay_state::HiddenPayInstruction;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

use crate::core::constants::TOKEN_PROGRAM_ID;
use crate::error::Result;

fn build(
    program_id: &Pubkey,
    instruction: HiddenPayInstruction,
    accounts: Vec<AccountMeta>,
) -> Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: instruction.data()?,
    })
}

pub fn initialize(program_id: &Pubkey, platform: &Pubkey, authority: &Pubkey) -> Result<Instruction> {
    build(
        program_id,
        HiddenPayInstruction::Initialize,
        vec![
            AccountMeta::new(*platform, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

pub fn create_merchant(
    program_id: &Pubkey,
    merchant: &Pubkey,
    platform: &Pubkey,
    authority: &Pubkey,
    merchant_name: String,
) -> Result<Instruction> {
    build(
        program_id,
        HiddenPayInstruction::CreateMerchant { merchant_name },
        vec![
            AccountMeta::new(*merchant, false),
            AccountMeta::new(*platform, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

#[allow(clippy::too_many_arguments)]
pub fn create_subscription_product(
    program_id: &Pubkey,
    product: &Pubkey,
    merchant: &Pubkey,
    authority: &Pubkey,
    name: String,
    description: String,
    price: u64,
    duration_days: u32,
    token_mint: Pubkey,
) -> Result<Instruction> {
    build(
        program_id,
        HiddenPayInstruction::CreateSubscriptionProduct {
            name,
            description,
            price,
            duration_days,
            token_mint,
        },
        vec![
            AccountMeta::new(*product, false),
            AccountMeta::new(*merchant, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

#[allow(clippy::too_many_arguments)]
pub fn subscribe(
    program_id: &Pubkey,
    subscription: &Pubkey,
    product: &Pubkey,
    merchant: &Pubkey,
    platform: &Pubkey,
    user: &Pubkey,
    user_token_account: &Pubkey,
    merchant_token_account: &Pubkey,
) -> Result<Instruction> {
    build(
        program_id,
        HiddenPayInstruction::Subscribe,
        vec![
            AccountMeta::new(*subscription, false),
            AccountMeta::new(*product, false),
            AccountMeta::new(*merchant, false),
            AccountMeta::new(*platform, false),
            AccountMeta::new(*user, true),
            AccountMeta::new(*user_token_account, false),
            AccountMeta::new(*merchant_token_account, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

pub fn update_zk_proof(
    program_id: &Pubkey,
    subscription: &Pubkey,
    user: &Pubkey,
    proof_hash: [u8; 32],
) -> Result<Instruction> {
    build(
        program_id,
        HiddenPayInstruction::UpdateZkProof { proof_hash },
        vec![
            AccountMeta::new(*subscription, false),
            AccountMeta::new_readonly(*user, true),
        ],
    )
}

pub fn cancel_subscription(
    program_id: &Pubkey,
    subscription: &Pubkey,
    user: &Pubkey,
) -> Result<Instruction> {
    build(
        program_id,
        HiddenPayInstruction::CancelSubscription,
        vec![
            AccountMeta::new(*subscription, false),
            AccountMeta::new_readonly(*user, true),
        ],
    )
}
