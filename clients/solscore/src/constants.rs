use anchor_lang::prelude::Pubkey;
use anchor_lang::pubkey;
use std::time::Duration;

/// Seed prefix of market PDAs: ["market", league_name, season]
pub const MARKET_SEED: &[u8] = b"market";

/// Seed prefix of bet PDAs: ["bet", user, market]
pub const BET_SEED: &[u8] = b"bet";

/// USDC-style mint used by the deployed program (6 decimals)
pub const DEFAULT_MINT: Pubkey = pubkey!("Gh9ZwEmdLJ8DscKNTkTqPbNwLNNBjuSzaG9Vp2KGtKJr");

/// Stake precision: 1_000_000 = 1.00 USDC
pub const STAKE_SCALE: u64 = 1_000_000;

/// Odds precision: 100 = 1.00x, 250 = 2.50x
pub const ODDS_SCALE: u64 = 100;

/// A market needs at least two teams to bet on
pub const MIN_TEAMS: usize = 2;

/// Team indices travel as `u8`
pub const MAX_TEAMS: usize = u8::MAX as usize + 1;

/// Anchor account discriminator length
pub const DISCRIMINATOR_LEN: usize = 8;

/// Byte offset of `Bet::user` (right after the discriminator)
pub const BET_USER_OFFSET: usize = DISCRIMINATOR_LEN;

/// Byte offset of `Bet::market`
pub const BET_MARKET_OFFSET: usize = DISCRIMINATOR_LEN + 32;

/// How long a fetched record is served from cache before it is refetched
pub const DEFAULT_CACHE_STALE_TIME: Duration = Duration::from_secs(30);

/// RPC error text for a transaction that landed already
pub const ALREADY_PROCESSED_MARKER: &str = "already been processed";

/// Returned instead of a signature when a duplicate submission is detected
pub const ALREADY_PROCESSED_SENTINEL: &str = "Transaction completed (already processed)";

/// Shown in place of odds for a team index with no odds entry
pub const ODDS_UNAVAILABLE: &str = "N/A";
