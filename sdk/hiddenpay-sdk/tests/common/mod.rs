#![allow(dead_code)]

use async_trait::async_trait;
use borsh::BorshDeserialize;
use hiddenpay_sdk::core::connection::SolConnection;
use hiddenpay_sdk::session::{
    ConnectOptions, InjectedProvider, MemorySessionStore, ProviderError, ProviderEvent,
    ProviderRegistry, WalletProvider, WalletSession, WalletType,
};
use hiddenpay_state::{
    instruction_discriminator, AnchorAccount, Merchant, Platform, Subscription,
    SubscriptionProduct, DISCRIMINATOR_LEN,
};
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::{
    account::Account,
    hash::Hash,
    instruction::InstructionError,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::{Transaction, TransactionError},
};
use std::collections::HashMap;
use std::error::Error;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

type BoxError = Box<dyn Error + Send + Sync>;

const SECONDS_PER_DAY: i64 = 86_400;

//=============================================================================
// Ledger
//=============================================================================

/// In-memory ledger that executes HiddenPay instructions the way the program
/// does, enough for the SDK to be driven end to end.
pub struct MockLedger {
    pub program_id: Pubkey,
    accounts: Mutex<HashMap<Pubkey, Account>>,
    balances: Mutex<HashMap<Pubkey, u64>>,
    submitted: Mutex<Vec<Transaction>>,
    now: AtomicI64,
    fail_reads: AtomicBool,
}

impl MockLedger {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            accounts: Mutex::new(HashMap::new()),
            balances: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            now: AtomicI64::new(1_700_000_000),
            fail_reads: AtomicBool::new(false),
        }
    }

    pub fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }

    pub fn advance_days(&self, days: i64) {
        self.now.fetch_add(days * SECONDS_PER_DAY, Ordering::SeqCst);
    }

    pub fn set_balance(&self, address: Pubkey, lamports: u64) {
        self.balances.lock().unwrap().insert(address, lamports);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> Vec<Transaction> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn account_exists(&self, address: &Pubkey) -> bool {
        self.accounts.lock().unwrap().contains_key(address)
    }

    pub fn read<T: AnchorAccount>(&self, address: &Pubkey) -> Option<T> {
        let accounts = self.accounts.lock().unwrap();
        let account = accounts.get(address)?;
        T::try_from_account_data(&account.data).ok()
    }

    /// Place a program account directly, bypassing instructions.
    pub fn put<T: AnchorAccount>(&self, address: Pubkey, value: &T) {
        self.write(address, value);
    }

    fn write<T: AnchorAccount>(&self, address: Pubkey, value: &T) {
        let account = Account {
            lamports: 1_000_000,
            data: value.to_account_data().unwrap(),
            owner: self.program_id,
            executable: false,
            rent_epoch: 0,
        };
        self.accounts.lock().unwrap().insert(address, account);
    }

    fn init_target_free(&self, address: &Pubkey) -> Result<(), TransactionError> {
        if self.account_exists(address) {
            // System program AccountAlreadyInUse
            return Err(TransactionError::InstructionError(
                0,
                InstructionError::Custom(0),
            ));
        }
        Ok(())
    }

    fn execute(&self, tx: &Transaction) -> Result<(), TransactionError> {
        tx.verify()?;

        let message = &tx.message;
        let ix = message
            .instructions
            .first()
            .ok_or(TransactionError::InvalidAccountIndex)?;
        let keys: Vec<Pubkey> = ix
            .accounts
            .iter()
            .map(|i| message.account_keys[*i as usize])
            .collect();
        let (disc, args) = ix.data.split_at(DISCRIMINATOR_LEN);
        let program_err = |code: u32| TransactionError::InstructionError(0, InstructionError::Custom(code));
        let invalid = || TransactionError::InstructionError(0, InstructionError::InvalidInstructionData);

        if disc == instruction_discriminator("initialize") {
            self.init_target_free(&keys[0])?;
            self.write(
                keys[0],
                &Platform {
                    authority: keys[1],
                    total_subscriptions: 0,
                    total_merchants: 0,
                    bump: 255,
                },
            );
        } else if disc == instruction_discriminator("create_merchant") {
            let name = String::try_from_slice(args).map_err(|_| invalid())?;
            if name.len() > 50 {
                return Err(program_err(6000));
            }
            self.init_target_free(&keys[0])?;
            self.write(
                keys[0],
                &Merchant {
                    authority: keys[2],
                    name,
                    total_products: 0,
                    total_revenue: 0,
                    is_verified: false,
                    bump: 255,
                },
            );
            if let Some(mut platform) = self.read::<Platform>(&keys[1]) {
                platform.total_merchants += 1;
                self.write(keys[1], &platform);
            }
        } else if disc == instruction_discriminator("create_subscription_product") {
            let (name, description, price, duration_days, token_mint) =
                <(String, String, u64, u32, Pubkey)>::try_from_slice(args).map_err(|_| invalid())?;
            if price == 0 {
                return Err(program_err(6002));
            }
            self.init_target_free(&keys[0])?;
            self.write(
                keys[0],
                &SubscriptionProduct {
                    merchant: keys[1],
                    name,
                    description,
                    price,
                    duration_days,
                    token_mint,
                    total_subscribers: 0,
                    is_active: true,
                    bump: 255,
                },
            );
        } else if disc == instruction_discriminator("subscribe") {
            let mut product = self
                .read::<SubscriptionProduct>(&keys[1])
                .ok_or(TransactionError::AccountNotFound)?;
            if !product.is_active {
                return Err(program_err(6004));
            }
            self.init_target_free(&keys[0])?;
            let now = self.now();
            self.write(
                keys[0],
                &Subscription {
                    user: keys[4],
                    product: keys[1],
                    merchant: keys[2],
                    start_time: now,
                    end_time: now + i64::from(product.duration_days) * SECONDS_PER_DAY,
                    is_active: true,
                    proof_hash: [0; 32],
                    bump: 255,
                },
            );
            product.total_subscribers += 1;
            self.write(keys[1], &product);
        } else if disc == instruction_discriminator("cancel_subscription") {
            let mut sub = self
                .read::<Subscription>(&keys[0])
                .ok_or(TransactionError::AccountNotFound)?;
            sub.is_active = false;
            self.write(keys[0], &sub);
        } else if disc == instruction_discriminator("update_zk_proof") {
            let proof_hash = <[u8; 32]>::try_from_slice(args).map_err(|_| invalid())?;
            let mut sub = self
                .read::<Subscription>(&keys[0])
                .ok_or(TransactionError::AccountNotFound)?;
            sub.proof_hash = proof_hash;
            self.write(keys[0], &sub);
        } else {
            return Err(invalid());
        }
        Ok(())
    }
}

#[async_trait]
impl SolConnection for MockLedger {
    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, BoxError> {
        self.execute(tx).map_err(|e| Box::new(e) as BoxError)?;
        self.submitted.lock().unwrap().push(tx.clone());
        Ok(tx.signatures[0])
    }

    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, BoxError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err("rpc unavailable".into());
        }
        Ok(self.accounts.lock().unwrap().get(pubkey).cloned())
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, BoxError> {
        Ok(self.balances.lock().unwrap().get(pubkey).copied().unwrap_or(0))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, BoxError> {
        Ok(Hash::new_unique())
    }
}

//=============================================================================
// Wallet
//=============================================================================

/// Scriptable stand-in for an injected browser wallet.
pub struct FakeWallet {
    keypair: Mutex<Arc<Keypair>>,
    connected: AtomicBool,
    reject_connect: AtomicBool,
    reject_sign: AtomicBool,
    fail_disconnect: AtomicBool,
    /// Emit `Disconnect` right after approving a connect
    drop_after_connect: AtomicBool,
    /// When set, connecting waits for a notification before completing
    connect_gate: Mutex<Option<Arc<Notify>>>,
    /// When set, signing waits for a notification before completing
    sign_gate: Mutex<Option<Arc<Notify>>>,
    pub sign_started: Notify,
    events: broadcast::Sender<ProviderEvent>,
}

impl FakeWallet {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            keypair: Mutex::new(Arc::new(Keypair::new())),
            connected: AtomicBool::new(false),
            reject_connect: AtomicBool::new(false),
            reject_sign: AtomicBool::new(false),
            fail_disconnect: AtomicBool::new(false),
            drop_after_connect: AtomicBool::new(false),
            connect_gate: Mutex::new(None),
            sign_gate: Mutex::new(None),
            sign_started: Notify::new(),
            events,
        })
    }

    /// A wallet that already trusts the site, as after a page reload.
    pub fn trusted() -> Arc<Self> {
        let wallet = Self::new();
        wallet.connected.store(true, Ordering::SeqCst);
        wallet
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.lock().unwrap().pubkey()
    }

    pub fn set_reject_connect(&self, reject: bool) {
        self.reject_connect.store(reject, Ordering::SeqCst);
    }

    pub fn set_reject_sign(&self, reject: bool) {
        self.reject_sign.store(reject, Ordering::SeqCst);
    }

    pub fn set_fail_disconnect(&self, fail: bool) {
        self.fail_disconnect.store(fail, Ordering::SeqCst);
    }

    pub fn set_drop_after_connect(&self, drop: bool) {
        self.drop_after_connect.store(drop, Ordering::SeqCst);
    }

    pub fn hold_connecting(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.connect_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn hold_signing(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.sign_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// User switches account inside the wallet.
    pub fn switch_account(&self) -> Pubkey {
        let keypair = Arc::new(Keypair::new());
        let pubkey = keypair.pubkey();
        *self.keypair.lock().unwrap() = keypair;
        let _ = self.events.send(ProviderEvent::AccountChanged(Some(pubkey)));
        pubkey
    }

    /// Wallet ends the session on its own, e.g. the user locks it.
    pub fn emit_disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        let _ = self.events.send(ProviderEvent::Disconnect);
    }

    fn signer(&self) -> Arc<Keypair> {
        self.keypair.lock().unwrap().clone()
    }

    async fn before_sign(&self) -> Result<Arc<Keypair>, ProviderError> {
        self.sign_started.notify_one();
        let gate = self.sign_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.reject_sign.load(Ordering::SeqCst) {
            return Err(ProviderError::UserRejected);
        }
        if !self.connected.load(Ordering::SeqCst) {
            return Err(ProviderError::Disconnected);
        }
        Ok(self.signer())
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn connect(&self, _options: ConnectOptions) -> Result<Pubkey, ProviderError> {
        let gate = self.connect_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.reject_connect.load(Ordering::SeqCst) {
            return Err(ProviderError::UserRejected);
        }
        self.connected.store(true, Ordering::SeqCst);
        let public_key = self.pubkey();
        if self.drop_after_connect.load(Ordering::SeqCst) {
            self.emit_disconnect();
        }
        Ok(public_key)
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.connected.store(false, Ordering::SeqCst);
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(ProviderError::Internal("wallet crashed".to_string()));
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn public_key(&self) -> Option<Pubkey> {
        self.is_connected().then(|| self.pubkey())
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction, ProviderError> {
        let signer = self.before_sign().await?;
        let blockhash = tx.message.recent_blockhash;
        tx.try_sign(&[signer.as_ref()], blockhash)
            .map_err(|e| ProviderError::Internal(e.to_string()))?;
        Ok(tx)
    }

    async fn sign_all_transactions(
        &self,
        txs: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, ProviderError> {
        let mut signed = Vec::with_capacity(txs.len());
        for tx in txs {
            signed.push(self.sign_transaction(tx).await?);
        }
        Ok(signed)
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, ProviderError> {
        let signer = self.before_sign().await?;
        Ok(signer.sign_message(message))
    }

    async fn sign_and_send_transaction(
        &self,
        tx: Transaction,
        _options: RpcSendTransactionConfig,
    ) -> Result<Signature, ProviderError> {
        let signed = self.sign_transaction(tx).await?;
        Ok(signed.signatures[0])
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

/// Registry with a fixed set of installed wallets.
#[derive(Default)]
pub struct FakeRegistry {
    wallets: HashMap<WalletType, Arc<FakeWallet>>,
}

impl FakeRegistry {
    pub fn with(mut self, wallet_type: WalletType, wallet: Arc<FakeWallet>) -> Self {
        self.wallets.insert(wallet_type, wallet);
        self
    }
}

impl ProviderRegistry for FakeRegistry {
    fn discover(&self, wallet_type: WalletType) -> Option<InjectedProvider> {
        self.wallets.get(&wallet_type).map(|wallet| {
            InjectedProvider::new(wallet_type, wallet.clone() as Arc<dyn WalletProvider>)
        })
    }
}

//=============================================================================
// Setup
//=============================================================================

pub struct TestContext {
    pub ledger: Arc<MockLedger>,
    pub wallet: Arc<FakeWallet>,
    pub store: Arc<MemorySessionStore>,
    pub session: WalletSession,
}

/// Session with a Phantom wallet installed but not yet connected.
pub fn setup_test_context() -> TestContext {
    let ledger = Arc::new(MockLedger::new(hiddenpay_state::id()));
    let wallet = FakeWallet::new();
    let store = Arc::new(MemorySessionStore::new());
    let registry = FakeRegistry::default().with(WalletType::Phantom, wallet.clone());
    let session = WalletSession::new(Arc::new(registry), store.clone());

    TestContext {
        ledger,
        wallet,
        store,
        session,
    }
}

/// Poll until `condition` holds, giving spawned listener tasks time to run.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
