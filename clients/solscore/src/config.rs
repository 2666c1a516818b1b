use anchor_lang::prelude::Pubkey;
use solana_sdk::commitment_config::CommitmentConfig;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{DEFAULT_CACHE_STALE_TIME, DEFAULT_MINT};
use crate::error::ClientError;

/// Solana cluster the client talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cluster {
    Devnet,
    Testnet,
    Mainnet,
    Localnet,
    Custom(String),
}

impl Cluster {
    pub fn rpc_url(&self) -> &str {
        match self {
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::Mainnet => "https://api.mainnet-beta.solana.com",
            Cluster::Localnet => "http://127.0.0.1:8899",
            Cluster::Custom(url) => url,
        }
    }

    /// Value of the explorer's `?cluster=` query parameter, if any
    fn explorer_param(&self) -> Option<String> {
        match self {
            Cluster::Devnet => Some("devnet".to_string()),
            Cluster::Testnet => Some("testnet".to_string()),
            Cluster::Mainnet => None,
            Cluster::Localnet => Some("custom&customUrl=http%3A%2F%2F127.0.0.1%3A8899".to_string()),
            Cluster::Custom(url) => Some(format!("custom&customUrl={}", url)),
        }
    }
}

impl FromStr for Cluster {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devnet" | "d" => Ok(Cluster::Devnet),
            "testnet" | "t" => Ok(Cluster::Testnet),
            "mainnet" | "mainnet-beta" | "m" => Ok(Cluster::Mainnet),
            "localnet" | "localhost" | "l" => Ok(Cluster::Localnet),
            other if other.starts_with("http://") || other.starts_with("https://") => {
                Ok(Cluster::Custom(s.trim().to_string()))
            }
            _ => Err(ClientError::Config(format!("unknown cluster: {}", s))),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cluster::Devnet => write!(f, "devnet"),
            Cluster::Testnet => write!(f, "testnet"),
            Cluster::Mainnet => write!(f, "mainnet"),
            Cluster::Localnet => write!(f, "localnet"),
            Cluster::Custom(url) => write!(f, "{}", url),
        }
    }
}

/// Deployment identities and client tunables.
///
/// Nothing here is global: two configs pointing at different deployments can
/// be used side by side.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub program_id: Pubkey,
    pub mint: Pubkey,
    pub cluster: Cluster,
    pub commitment: CommitmentConfig,
    pub cache_stale_time: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::devnet()
    }
}

impl ClientConfig {
    /// The deployed SolScore program on devnet
    pub fn devnet() -> Self {
        Self {
            program_id: crate::ID,
            mint: DEFAULT_MINT,
            cluster: Cluster::Devnet,
            commitment: CommitmentConfig::confirmed(),
            cache_stale_time: DEFAULT_CACHE_STALE_TIME,
        }
    }

    /// Load configuration from environment variables, falling back to the
    /// devnet deployment for anything unset
    pub fn from_env() -> Result<Self, ClientError> {
        let mut config = Self::devnet();

        if let Ok(value) = std::env::var("SOLSCORE_PROGRAM_ID") {
            config.program_id = parse_pubkey("SOLSCORE_PROGRAM_ID", &value)?;
        }
        if let Ok(value) = std::env::var("SOLSCORE_MINT") {
            config.mint = parse_pubkey("SOLSCORE_MINT", &value)?;
        }
        if let Ok(value) = std::env::var("SOLSCORE_CLUSTER") {
            config.cluster = value.parse()?;
        }
        if let Ok(value) = std::env::var("SOLSCORE_CACHE_SECS") {
            let secs = value.trim().parse::<u64>().map_err(|_| {
                ClientError::Config(format!("SOLSCORE_CACHE_SECS is not a number: {}", value))
            })?;
            config.cache_stale_time = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn with_mint(mut self, mint: Pubkey) -> Self {
        self.mint = mint;
        self
    }

    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn with_cache_stale_time(mut self, stale_time: Duration) -> Self {
        self.cache_stale_time = stale_time;
        self
    }

    /// Explorer link for a confirmed transaction
    pub fn explorer_tx_url(&self, signature: &str) -> String {
        match self.cluster.explorer_param() {
            Some(param) => format!("https://explorer.solana.com/tx/{}?cluster={}", signature, param),
            None => format!("https://explorer.solana.com/tx/{}", signature),
        }
    }
}

fn parse_pubkey(name: &str, value: &str) -> Result<Pubkey, ClientError> {
    Pubkey::from_str(value.trim())
        .map_err(|_| ClientError::Config(format!("{} is not a valid address: {}", name, value)))
}
