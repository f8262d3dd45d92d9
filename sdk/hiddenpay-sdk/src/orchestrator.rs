//! Domain operations: derive the target account, build the instruction, sign
//! through the wallet session and submit to the ledger.

use hiddenpay_state::{SubscriptionProduct, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::connection::SolConnection;
use crate::error::{HiddenPaySdkError, Result};
use crate::program::{instructions, pda};
use crate::session::WalletSession;
use crate::utils;

/// Outcome of a submitted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationReceipt {
    /// Account the operation targeted
    pub address: Pubkey,
    /// Ledger transaction signature
    pub signature: Signature,
}

#[derive(Debug, Clone)]
pub struct CreateProductParams {
    /// Merchant PDA the product belongs to
    pub merchant: Pubkey,
    pub name: String,
    pub description: String,
    /// Price in the smallest unit of `token_mint`
    pub price: u64,
    pub duration_days: u16,
    pub token_mint: Pubkey,
}

#[derive(Debug, Clone, Copy)]
pub struct SubscribeParams {
    pub product: Pubkey,
    /// Subscriber's token account paying the price
    pub user_token_account: Pubkey,
    /// Merchant's token account receiving the price
    pub merchant_token_account: Pubkey,
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(HiddenPaySdkError::InvalidParameter(
            "name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(HiddenPaySdkError::InvalidParameter(format!(
            "name is {} bytes, max {}",
            name.len(),
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

impl CreateProductParams {
    fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if self.description.len() > MAX_DESCRIPTION_LEN {
            return Err(HiddenPaySdkError::InvalidParameter(format!(
                "description is {} bytes, max {}",
                self.description.len(),
                MAX_DESCRIPTION_LEN
            )));
        }
        if self.price == 0 {
            return Err(HiddenPaySdkError::InvalidParameter(
                "price must be positive".to_string(),
            ));
        }
        if self.duration_days == 0 {
            return Err(HiddenPaySdkError::InvalidParameter(
                "duration must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct TransactionOrchestrator<C: SolConnection> {
    connection: Arc<C>,
    session: WalletSession,
    program_id: Pubkey,
}

impl<C: SolConnection> TransactionOrchestrator<C> {
    pub fn new(connection: Arc<C>, session: WalletSession, program_id: Pubkey) -> Self {
        Self {
            connection,
            session,
            program_id,
        }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    /// Create the platform singleton with the connected wallet as authority.
    pub async fn initialize_platform(&self) -> Result<OperationReceipt> {
        let authority = self.session.require_public_key()?;
        let (platform, _) = pda::derive_platform_pda(&self.program_id)?;

        let ix = instructions::initialize(&self.program_id, &platform, &authority)?;
        let signature = self.submit(ix, authority, Some(platform)).await?;

        info!("Platform initialized at {} ({})", platform, signature);
        Ok(OperationReceipt {
            address: platform,
            signature,
        })
    }

    /// Register the connected wallet as a merchant.
    ///
    /// The address depends only on the authority, so a second call targets the
    /// same account and fails with `AccountAlreadyExists`.
    pub async fn create_merchant(&self, merchant_name: &str) -> Result<OperationReceipt> {
        let authority = self.session.require_public_key()?;
        validate_name(merchant_name)?;

        let (merchant, _) = pda::derive_merchant_pda(&self.program_id, &authority)?;
        let (platform, _) = pda::derive_platform_pda(&self.program_id)?;
        debug!("Creating merchant {:?} at {}", merchant_name, merchant);

        let ix = instructions::create_merchant(
            &self.program_id,
            &merchant,
            &platform,
            &authority,
            merchant_name.to_string(),
        )?;
        let signature = self.submit(ix, authority, Some(merchant)).await?;

        info!("Merchant created at {} ({})", merchant, signature);
        Ok(OperationReceipt {
            address: merchant,
            signature,
        })
    }

    /// Create a subscription product under `params.merchant`.
    pub async fn create_product(&self, params: CreateProductParams) -> Result<OperationReceipt> {
        let authority = self.session.require_public_key()?;
        params.validate()?;

        let (product, _) = pda::derive_product_pda(&self.program_id, &params.merchant, &params.name)?;
        debug!("Creating product {:?} at {}", params.name, product);

        let ix = instructions::create_subscription_product(
            &self.program_id,
            &product,
            &params.merchant,
            &authority,
            params.name,
            params.description,
            params.price,
            u32::from(params.duration_days),
            params.token_mint,
        )?;
        let signature = self.submit(ix, authority, Some(product)).await?;

        info!("Product created at {} ({})", product, signature);
        Ok(OperationReceipt {
            address: product,
            signature,
        })
    }

    /// Subscribe the connected wallet to `params.product`.
    ///
    /// The address depends only on (subscriber, product), so subscribing to
    /// the same product twice fails with `AccountAlreadyExists`.
    pub async fn subscribe(&self, params: SubscribeParams) -> Result<OperationReceipt> {
        let subscriber = self.session.require_public_key()?;

        let product: SubscriptionProduct =
            utils::fetch_anchor_account(self.connection.as_ref(), &params.product).await?;
        let (subscription, _) =
            pda::derive_subscription_pda(&self.program_id, &subscriber, &params.product)?;
        let (platform, _) = pda::derive_platform_pda(&self.program_id)?;
        debug!(
            "Subscribing {} to {:?} at {}",
            subscriber, product.name, subscription
        );

        let ix = instructions::subscribe(
            &self.program_id,
            &subscription,
            &params.product,
            &product.merchant,
            &platform,
            &subscriber,
            &params.user_token_account,
            &params.merchant_token_account,
        )?;
        let signature = self.submit(ix, subscriber, Some(subscription)).await?;

        info!("Subscription created at {} ({})", subscription, signature);
        Ok(OperationReceipt {
            address: subscription,
            signature,
        })
    }

    /// Deactivate the connected wallet's subscription to `product`.
    pub async fn cancel_subscription(&self, product: &Pubkey) -> Result<OperationReceipt> {
        let subscriber = self.session.require_public_key()?;
        let (subscription, _) = pda::derive_subscription_pda(&self.program_id, &subscriber, product)?;

        let ix = instructions::cancel_subscription(&self.program_id, &subscription, &subscriber)?;
        let signature = self.submit(ix, subscriber, None).await?;

        info!("Subscription {} cancelled ({})", subscription, signature);
        Ok(OperationReceipt {
            address: subscription,
            signature,
        })
    }

    /// Attach a proof hash to the connected wallet's subscription to `product`.
    pub async fn update_zk_proof(
        &self,
        product: &Pubkey,
        proof_hash: [u8; 32],
    ) -> Result<OperationReceipt> {
        let subscriber = self.session.require_public_key()?;
        let (subscription, _) = pda::derive_subscription_pda(&self.program_id, &subscriber, product)?;

        let ix = instructions::update_zk_proof(&self.program_id, &subscription, &subscriber, proof_hash)?;
        let signature = self.submit(ix, subscriber, None).await?;

        info!("Proof updated on {} ({})", subscription, signature);
        Ok(OperationReceipt {
            address: subscription,
            signature,
        })
    }

    async fn submit(
        &self,
        instruction: Instruction,
        payer: Pubkey,
        init_target: Option<Pubkey>,
    ) -> Result<Signature> {
        let blockhash = self
            .connection
            .get_latest_blockhash()
            .await
            .map_err(|e| HiddenPaySdkError::Connection(e.to_string()))?;

        let message = Message::new_with_blockhash(&[instruction], Some(&payer), &blockhash);
        let signed = self
            .session
            .sign_transaction(Transaction::new_unsigned(message))
            .await?;

        self.connection
            .send_transaction(&signed)
            .await
            .map_err(|e| utils::classify_submit_error(e, init_target))
    }
}
