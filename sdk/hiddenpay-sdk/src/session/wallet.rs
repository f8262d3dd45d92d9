use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::constants::{PUBLIC_KEY_STORAGE_KEY, WALLET_STORAGE_KEY};
use crate::error::{HiddenPaySdkError, Result};
use crate::session::provider::{
    ConnectOptions, InjectedProvider, ProviderError, ProviderEvent, ProviderRegistry, WalletType,
};
use crate::session::store::SessionStore;

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub connected: bool,
    pub connecting: bool,
    pub public_key: Option<Pubkey>,
    pub wallet_type: Option<WalletType>,
}

struct ActiveSession {
    public_key: Pubkey,
    provider: InjectedProvider,
    listener: JoinHandle<()>,
}

#[derive(Default)]
struct SessionState {
    connecting: bool,
    /// `Some` exactly while connected
    active: Option<ActiveSession>,
    generation: u64,
}

struct SessionInner {
    registry: Arc<dyn ProviderRegistry>,
    store: Arc<dyn SessionStore>,
    state: Mutex<SessionState>,
    /// Generation of the live connection, `None` while disconnected
    status: watch::Sender<Option<u64>>,
}

impl SessionInner {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears `connecting` if a connect attempt ends without activating,
/// including when its future is dropped mid-flight.
struct ConnectingGuard<'a> {
    inner: &'a SessionInner,
    armed: bool,
}

impl ConnectingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.lock().connecting = false;
        }
    }
}

/// The application's wallet session.
///
/// Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct WalletSession {
    inner: Arc<SessionInner>,
}

impl WalletSession {
    pub fn new(registry: Arc<dyn ProviderRegistry>, store: Arc<dyn SessionStore>) -> Self {
        let (status, _) = watch::channel(None);
        Self {
            inner: Arc::new(SessionInner {
                registry,
                store,
                state: Mutex::new(SessionState::default()),
                status,
            }),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.lock();
        SessionSnapshot {
            connected: state.active.is_some(),
            connecting: state.connecting,
            public_key: state.active.as_ref().map(|a| a.public_key),
            wallet_type: state.active.as_ref().map(|a| a.provider.wallet_type()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.inner.lock().active.is_some()
    }

    pub fn is_connecting(&self) -> bool {
        self.inner.lock().connecting
    }

    pub fn public_key(&self) -> Option<Pubkey> {
        self.inner.lock().active.as_ref().map(|a| a.public_key)
    }

    pub fn wallet_type(&self) -> Option<WalletType> {
        self.inner
            .lock()
            .active
            .as_ref()
            .map(|a| a.provider.wallet_type())
    }

    /// Connected public key, or `NotConnected`.
    pub fn require_public_key(&self) -> Result<Pubkey> {
        self.public_key().ok_or(HiddenPaySdkError::NotConnected)
    }

    //=========================================================================
    // Lifecycle
    //=========================================================================

    /// Connect to the injected wallet of `wallet_type`, prompting the user.
    ///
    /// Connecting to the wallet already in use returns its key; connecting to
    /// a different wallet ends the current session first.
    pub async fn connect(&self, wallet_type: WalletType) -> Result<Pubkey> {
        let switching = {
            let mut state = self.inner.lock();
            if state.connecting {
                return Err(HiddenPaySdkError::AlreadyConnecting);
            }
            if let Some(active) = &state.active {
                if active.provider.wallet_type() == wallet_type {
                    return Ok(active.public_key);
                }
            }
            state.connecting = true;
            state.active.is_some()
        };
        let guard = ConnectingGuard {
            inner: &self.inner,
            armed: true,
        };

        if switching {
            self.disconnect().await;
        }

        let provider = self.inner.registry.discover(wallet_type).ok_or_else(|| {
            warn!("{} wallet not found", wallet_type);
            HiddenPaySdkError::ProviderNotFound {
                wallet_type,
                install_url: wallet_type.install_url(),
            }
        })?;

        let events = provider.capability().subscribe();
        info!("Requesting authorization from {} wallet", wallet_type);
        let public_key = provider
            .capability()
            .connect(ConnectOptions::default())
            .await
            .map_err(|e| match e {
                ProviderError::UserRejected => HiddenPaySdkError::UserRejected,
                other => HiddenPaySdkError::ConnectFailed(other.to_string()),
            })?;

        self.activate(provider, public_key, events, guard);
        self.persist(wallet_type, &public_key);

        info!("Connected {} wallet {}", wallet_type, public_key);
        Ok(public_key)
    }

    /// Restore a persisted session without prompting.
    ///
    /// Succeeds only if the stored wallet still reports an authorized
    /// session; otherwise the session stays disconnected.
    pub async fn reconnect_on_startup(&self) -> Result<Option<Pubkey>> {
        let store = &self.inner.store;
        let saved_wallet = store
            .get(WALLET_STORAGE_KEY)
            .map_err(|e| HiddenPaySdkError::Storage(e.to_string()))?;
        let saved_key = store
            .get(PUBLIC_KEY_STORAGE_KEY)
            .map_err(|e| HiddenPaySdkError::Storage(e.to_string()))?;

        let (Some(saved_wallet), Some(saved_key)) = (saved_wallet, saved_key) else {
            return Ok(None);
        };
        let Ok(wallet_type) = saved_wallet.parse::<WalletType>() else {
            warn!("Discarding persisted session for unknown wallet {:?}", saved_wallet);
            self.clear_storage();
            return Ok(None);
        };

        {
            let mut state = self.inner.lock();
            if state.connecting {
                return Err(HiddenPaySdkError::AlreadyConnecting);
            }
            if let Some(active) = &state.active {
                return Ok(Some(active.public_key));
            }
            state.connecting = true;
        }
        let guard = ConnectingGuard {
            inner: &self.inner,
            armed: true,
        };

        let Some(provider) = self.inner.registry.discover(wallet_type) else {
            debug!("{} wallet not injected, staying disconnected", wallet_type);
            return Ok(None);
        };
        let capability = provider.capability();
        let events = capability.subscribe();
        let public_key = match capability.public_key() {
            Some(key) if capability.is_connected() => key,
            _ => {
                debug!("{} wallet has no trusted session, staying disconnected", wallet_type);
                return Ok(None);
            },
        };

        self.activate(provider, public_key, events, guard);
        if saved_key != public_key.to_string() {
            self.persist(wallet_type, &public_key);
        }

        info!("Restored {} wallet session {}", wallet_type, public_key);
        Ok(Some(public_key))
    }

    /// End the session. Always leaves the session disconnected with storage
    /// cleared, whatever the provider answers.
    pub async fn disconnect(&self) {
        let active = self.inner.lock().active.take();
        self.inner.status.send_replace(None);
        self.clear_storage();

        if let Some(active) = active {
            active.listener.abort();
            let wallet_type = active.provider.wallet_type();
            if let Err(e) = active.provider.capability().disconnect().await {
                warn!("{} wallet failed to disconnect cleanly: {}", wallet_type, e);
            }
            info!("Disconnected {} wallet {}", wallet_type, active.public_key);
        }
    }

    /// `events` must be subscribed before the provider was asked to connect so
    /// that nothing it emits in between is missed.
    fn activate(
        &self,
        provider: InjectedProvider,
        public_key: Pubkey,
        events: broadcast::Receiver<ProviderEvent>,
        guard: ConnectingGuard<'_>,
    ) {
        let mut state = self.inner.lock();
        state.generation += 1;
        let generation = state.generation;
        let listener = self.spawn_listener(events, generation);
        state.active = Some(ActiveSession {
            public_key,
            provider,
            listener,
        });
        state.connecting = false;
        guard.disarm();
        drop(state);

        self.inner.status.send_replace(Some(generation));
    }

    fn spawn_listener(
        &self,
        mut events: broadcast::Receiver<ProviderEvent>,
        generation: u64,
    ) -> JoinHandle<()> {
        let weak: Weak<SessionInner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Missed {} wallet events", skipped);
                        continue;
                    },
                    Err(RecvError::Closed) => break,
                };
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let session = WalletSession { inner };

                match event {
                    ProviderEvent::Disconnect | ProviderEvent::AccountChanged(None) => {
                        session.handle_provider_disconnect(generation);
                        break;
                    },
                    ProviderEvent::AccountChanged(Some(key)) => {
                        session.handle_account_changed(generation, key);
                    },
                }
            }
        })
    }

    fn handle_provider_disconnect(&self, generation: u64) {
        let active = {
            let mut state = self.inner.lock();
            if state.generation != generation {
                return;
            }
            state.active.take()
        };
        let Some(active) = active else {
            return;
        };

        active.listener.abort();
        self.inner.status.send_replace(None);
        self.clear_storage();
        warn!(
            "{} wallet {} disconnected by provider",
            active.provider.wallet_type(),
            active.public_key
        );
    }

    fn handle_account_changed(&self, generation: u64, public_key: Pubkey) {
        let wallet_type = {
            let mut state = self.inner.lock();
            if state.generation != generation {
                return;
            }
            let Some(active) = state.active.as_mut() else {
                return;
            };
            active.public_key = public_key;
            active.provider.wallet_type()
        };

        self.persist(wallet_type, &public_key);
        info!("{} wallet switched account to {}", wallet_type, public_key);
    }

    fn persist(&self, wallet_type: WalletType, public_key: &Pubkey) {
        let store = &self.inner.store;
        let result = store
            .set(WALLET_STORAGE_KEY, wallet_type.as_str())
            .and_then(|_| store.set(PUBLIC_KEY_STORAGE_KEY, &public_key.to_string()));
        if let Err(e) = result {
            warn!("Failed to persist wallet session: {}", e);
        }
    }

    fn clear_storage(&self) {
        for key in [WALLET_STORAGE_KEY, PUBLIC_KEY_STORAGE_KEY] {
            if let Err(e) = self.inner.store.remove(key) {
                warn!("Failed to clear {}: {}", key, e);
            }
        }
    }

    //=========================================================================
    // Signing
    //=========================================================================

    fn connected_provider(&self) -> Result<(InjectedProvider, u64)> {
        let state = self.inner.lock();
        state
            .active
            .as_ref()
            .map(|a| (a.provider.clone(), state.generation))
            .ok_or(HiddenPaySdkError::NotConnected)
    }

    /// Run a provider request, failing it if the session drops while pending.
    async fn in_session<T, F>(
        &self,
        generation: u64,
        request: F,
        classify: fn(String) -> HiddenPaySdkError,
    ) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, ProviderError>>,
    {
        let mut status = self.inner.status.subscribe();

        tokio::select! {
            result = request => match result {
                Ok(value) => Ok(value),
                Err(ProviderError::Disconnected) => {
                    self.handle_provider_disconnect(generation);
                    Err(classify(ProviderError::Disconnected.to_string()))
                },
                Err(e) => Err(classify(e.to_string())),
            },
            _ = status.wait_for(|s| *s != Some(generation)) => {
                Err(classify("wallet disconnected while the request was pending".to_string()))
            },
        }
    }

    pub async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction> {
        let (provider, generation) = self.connected_provider()?;
        self.in_session(
            generation,
            provider.capability().sign_transaction(tx),
            HiddenPaySdkError::SignFailed,
        )
        .await
    }

    pub async fn sign_all_transactions(&self, txs: Vec<Transaction>) -> Result<Vec<Transaction>> {
        let (provider, generation) = self.connected_provider()?;
        self.in_session(
            generation,
            provider.capability().sign_all_transactions(txs),
            HiddenPaySdkError::SignFailed,
        )
        .await
    }

    /// Sign arbitrary bytes; strings are signed as their UTF-8 encoding.
    pub async fn sign_message(&self, message: impl AsRef<[u8]>) -> Result<Signature> {
        let (provider, generation) = self.connected_provider()?;
        self.in_session(
            generation,
            provider.capability().sign_message(message.as_ref()),
            HiddenPaySdkError::SignFailed,
        )
        .await
    }

    /// Have the wallet sign and submit `tx`, returning the ledger signature.
    pub async fn send_transaction(
        &self,
        tx: Transaction,
        options: Option<RpcSendTransactionConfig>,
    ) -> Result<Signature> {
        let (provider, generation) = self.connected_provider()?;
        let signature = self
            .in_session(
                generation,
                provider
                    .capability()
                    .sign_and_send_transaction(tx, options.unwrap_or_default()),
                HiddenPaySdkError::SubmitFailed,
            )
            .await?;

        info!("Wallet submitted transaction {}", signature);
        Ok(signature)
    }
}
