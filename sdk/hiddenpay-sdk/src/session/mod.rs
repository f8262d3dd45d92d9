pub mod provider;
pub mod store;
pub mod wallet;

pub use provider::{
    ConnectOptions, InjectedProvider, ProviderError, ProviderEvent, ProviderRegistry,
    WalletProvider, WalletType,
};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
pub use wallet::{SessionSnapshot, WalletSession};
