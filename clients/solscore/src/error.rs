use thiserror::Error;

/// Errors surfaced by the SolScore client.
///
/// Precondition variants are raised before any request is built. Everything
/// else carries the underlying message verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("Wallet not connected!")]
    WalletNotConnected,

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Market not found: {0}")]
    MarketNotFound(String),

    #[error("Market has already been resolved")]
    MarketResolved,

    #[error("Team index {index} out of range: market has {teams} teams")]
    TeamIndexOutOfRange { index: usize, teams: usize },

    #[error("Maximum stake is {max} USDC")]
    StakeExceedsMax { max: f64 },

    #[error("Address derivation failed: {0}")]
    Derivation(String),

    #[error("Instruction encoding failed: {0}")]
    Encode(String),

    #[error("Transaction failed: {0}")]
    Submission(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Account decode failed: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// True for errors raised before anything was sent
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ClientError::WalletNotConnected
                | ClientError::MissingParameter(_)
                | ClientError::InvalidParameter(_)
                | ClientError::MarketNotFound(_)
                | ClientError::MarketResolved
                | ClientError::TeamIndexOutOfRange { .. }
                | ClientError::StakeExceedsMax { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
