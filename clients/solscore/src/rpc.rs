use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::Instruction;
use async_trait::async_trait;
use solana_account_decoder::UiAccountEncoding;
use solana_client::client_error::ClientError as RpcClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::{Transaction, TransactionError};
use tracing::debug;

use crate::config::ClientConfig;
use crate::transport::{AccountFilter, ProgramTransport, TransportError};

/// Transport backed by a JSON-RPC node and an in-process keypair
pub struct RpcTransport {
    client: RpcClient,
    commitment: CommitmentConfig,
    payer: Option<Keypair>,
}

impl RpcTransport {
    /// Read-only transport: fetches work, every builder fails with
    /// `WalletNotConnected`
    pub fn read_only(config: &ClientConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(config.cluster.rpc_url().to_string(), config.commitment),
            commitment: config.commitment,
            payer: None,
        }
    }

    pub fn with_payer(config: &ClientConfig, payer: Keypair) -> Self {
        Self {
            payer: Some(payer),
            ..Self::read_only(config)
        }
    }
}

/// Prefer the structured error code, fall back to the message text
fn classify(err: RpcClientError) -> TransportError {
    match err.get_transaction_error() {
        Some(TransactionError::AlreadyProcessed) => TransportError::AlreadyProcessed,
        Some(_) => TransportError::Rejected(err.to_string()),
        None => TransportError::from_message(err.to_string()),
    }
}

fn to_rpc_filter(filter: AccountFilter) -> RpcFilterType {
    match filter {
        AccountFilter::Memcmp { offset, bytes } => RpcFilterType::Memcmp(Memcmp::new_raw_bytes(offset, bytes)),
    }
}

#[async_trait]
impl ProgramTransport for RpcTransport {
    fn signer(&self) -> Option<Pubkey> {
        self.payer.as_ref().map(|payer| payer.pubkey())
    }

    async fn send_and_confirm(&self, instructions: Vec<Instruction>) -> Result<String, TransportError> {
        let payer = self
            .payer
            .as_ref()
            .ok_or_else(|| TransportError::Rejected("Wallet not connected!".to_string()))?;

        let blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(|e| TransportError::Rpc(e.to_string()))?;

        let tx = Transaction::new_signed_with_payer(&instructions, Some(&payer.pubkey()), &[payer], blockhash);
        debug!("Sending transaction {} with {} instruction(s)", tx.signatures[0], instructions.len());

        let signature = self.client.send_and_confirm_transaction(&tx).await.map_err(classify)?;
        Ok(signature.to_string())
    }

    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, TransportError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map_err(|e| TransportError::Rpc(e.to_string()))?;

        Ok(response.value.map(|account| account.data))
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: Vec<AccountFilter>,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, TransportError> {
        let config = RpcProgramAccountsConfig {
            filters: if filters.is_empty() {
                None
            } else {
                Some(filters.into_iter().map(to_rpc_filter).collect())
            },
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..Default::default()
            },
            ..Default::default()
        };

        let accounts = self
            .client
            .get_program_accounts_with_config(program_id, config)
            .await
            .map_err(|e| TransportError::Rpc(e.to_string()))?;

        Ok(accounts
            .into_iter()
            .map(|(address, account)| (address, account.data))
            .collect())
    }
}
