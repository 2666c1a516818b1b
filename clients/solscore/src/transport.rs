use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::Instruction;
use async_trait::async_trait;
use thiserror::Error;

use crate::constants::ALREADY_PROCESSED_MARKER;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The same transaction already landed
    #[error("This transaction has already been processed")]
    AlreadyProcessed,

    /// The cluster or the program refused the transaction
    #[error("{0}")]
    Rejected(String),

    /// Transport-level failure (connection, decode, timeout)
    #[error("{0}")]
    Rpc(String),
}

impl TransportError {
    /// Classify an untyped failure message.
    /// Only used when the underlying error carries no structured code.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains(ALREADY_PROCESSED_MARKER) {
            TransportError::AlreadyProcessed
        } else {
            TransportError::Rejected(message)
        }
    }
}

/// Bulk-scan filter on raw account bytes.
/// Bet and market accounts vary in length, so scans match on bytes only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    Memcmp { offset: usize, bytes: Vec<u8> },
}

/// Everything the client needs from the network and the wallet.
///
/// `signer` is the connected wallet, if any. `send_and_confirm` signs with it,
/// submits, and waits for confirmation at the transport's commitment.
#[async_trait]
pub trait ProgramTransport: Send + Sync {
    fn signer(&self) -> Option<Pubkey>;

    async fn send_and_confirm(&self, instructions: Vec<Instruction>) -> Result<String, TransportError>;

    /// Raw account data, or None if the account does not exist
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, TransportError>;

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: Vec<AccountFilter>,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, TransportError>;
}
