//! SDK configuration

use serde::{Deserialize, Deserializer};
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::core::constants::DEFAULT_PROGRAM_ID;
use crate::error::{HiddenPaySdkError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    Devnet,
    Testnet,
    MainnetBeta,
    Localnet,
}

impl Cluster {
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Cluster::Localnet => "http://localhost:8899",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Localnet => "localnet",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cluster {
    type Err = HiddenPaySdkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet-beta" | "mainnet" => Ok(Cluster::MainnetBeta),
            "localnet" | "localhost" => Ok(Cluster::Localnet),
            other => Err(HiddenPaySdkError::Config(format!("unknown cluster {other}"))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    pub cluster: Cluster,

    /// RPC endpoint; `None` falls back to the cluster default
    pub rpc_url: Option<String>,

    /// Deployed HiddenPay program
    #[serde(deserialize_with = "deserialize_pubkey")]
    pub program_id: Pubkey,

    pub commitment: CommitmentLevel,

    /// Upper bound on a single ledger read (seconds)
    pub request_timeout_secs: u64,

    /// Balance poll interval while waiting for funding (seconds)
    pub funding_poll_interval_secs: u64,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::Devnet,
            rpc_url: None,
            program_id: DEFAULT_PROGRAM_ID,
            commitment: CommitmentLevel::Confirmed,
            request_timeout_secs: 30,
            funding_poll_interval_secs: 2,
        }
    }
}

impl SdkConfig {
    /// Build from `HIDDENPAY_*` environment variables, defaulting anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(cluster) = lookup("HIDDENPAY_CLUSTER") {
            config.cluster = cluster.parse()?;
        }
        if let Some(url) = lookup("HIDDENPAY_RPC_URL") {
            config.rpc_url = Some(url);
        }
        if let Some(id) = lookup("HIDDENPAY_PROGRAM_ID") {
            config.program_id = Pubkey::from_str(&id)
                .map_err(|e| HiddenPaySdkError::Config(format!("HIDDENPAY_PROGRAM_ID: {e}")))?;
        }
        if let Some(level) = lookup("HIDDENPAY_COMMITMENT") {
            config.commitment = CommitmentLevel::from_str(&level)
                .map_err(|e| HiddenPaySdkError::Config(format!("HIDDENPAY_COMMITMENT: {e}")))?;
        }
        if let Some(secs) = lookup("HIDDENPAY_RPC_TIMEOUT_SECS") {
            config.request_timeout_secs = parse_secs("HIDDENPAY_RPC_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = lookup("HIDDENPAY_FUNDING_POLL_SECS") {
            config.funding_poll_interval_secs = parse_secs("HIDDENPAY_FUNDING_POLL_SECS", &secs)?;
        }

        Ok(config)
    }

    pub fn rpc_url(&self) -> &str {
        self.rpc_url
            .as_deref()
            .unwrap_or_else(|| self.cluster.default_rpc_url())
    }

    pub fn commitment_config(&self) -> CommitmentConfig {
        CommitmentConfig {
            commitment: self.commitment,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn funding_poll_interval(&self) -> Duration {
        Duration::from_secs(self.funding_poll_interval_secs)
    }

    /// Solana Explorer link for an address on the configured cluster.
    pub fn explorer_url(&self, address: &Pubkey) -> String {
        match self.cluster {
            Cluster::MainnetBeta => format!("https://explorer.solana.com/address/{address}"),
            Cluster::Localnet => format!(
                "https://explorer.solana.com/address/{address}?cluster=custom&customUrl={}",
                self.rpc_url()
            ),
            cluster => format!("https://explorer.solana.com/address/{address}?cluster={cluster}"),
        }
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    let secs: u64 = value
        .parse()
        .map_err(|_| HiddenPaySdkError::Config(format!("{key} must be a whole number of seconds")))?;
    if secs == 0 {
        return Err(HiddenPaySdkError::Config(format!("{key} must be positive")));
    }
    Ok(secs)
}

fn deserialize_pubkey<'de, D>(deserializer: D) -> std::result::Result<Pubkey, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Pubkey::from_str(&s).map_err(serde::de::Error::custom)
}
