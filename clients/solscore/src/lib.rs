//! Client for the SolScore prediction market program.
//!
//! Builds and submits `initialize_market`, `place_bet`, `resolve_market`,
//! `claim_payout` and `close_market` transactions, and reads `Market` / `Bet`
//! accounts back through a staleness-bounded query cache.

use anchor_lang::prelude::*;

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod instructions;
pub mod pda;
pub mod query;
pub mod rpc;
pub mod state;
pub mod transport;
pub mod units;

pub use client::*;
pub use config::{ClientConfig, Cluster};
pub use error::ClientError;
pub use query::{Query, QueryState};
pub use state::{Bet, BetStatus, BetView, Market, MarketView};
pub use transport::{AccountFilter, ProgramTransport, TransportError};

declare_id!("HRTMA5HJ2e27y9t5kttAha2vAKnEYjZ88Gvt8FryP6G6");
