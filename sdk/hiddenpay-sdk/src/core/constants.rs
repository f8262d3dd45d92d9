use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

// Default Program ID for Devnet
pub const DEFAULT_PROGRAM_ID: Pubkey = hiddenpay_state::ID;

pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Durable storage keys for the persisted session.
pub const WALLET_STORAGE_KEY: &str = "hiddenPayWallet";
pub const PUBLIC_KEY_STORAGE_KEY: &str = "hiddenPayPublicKey";

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    /// `Pubkey::default()` stands for native SOL.
    pub mint: Pubkey,
}

impl TokenInfo {
    pub fn is_native(&self) -> bool {
        self.mint == Pubkey::default()
    }
}

/// Payment tokens accepted on devnet.
pub static SUPPORTED_TOKENS: [TokenInfo; 3] = [
    TokenInfo {
        name: "Solana",
        symbol: "SOL",
        decimals: 9,
        mint: Pubkey::new_from_array([0; 32]),
    },
    TokenInfo {
        name: "USD Coin",
        symbol: "USDC",
        decimals: 6,
        mint: pubkey!("4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU"),
    },
    TokenInfo {
        name: "Tether USD",
        symbol: "USDT",
        decimals: 6,
        mint: pubkey!("EJwZgeZrdC8TXTQbQBoL6bfuAnFUUy1PVCMB4DYPzVaS"),
    },
];

pub fn find_token(symbol: &str) -> Option<&'static TokenInfo> {
    SUPPORTED_TOKENS
        .iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
}
