use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::pubkey::MAX_SEED_LEN;
use anchor_lang::Discriminator;
use std::fmt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::constants::{
    ALREADY_PROCESSED_SENTINEL, BET_MARKET_OFFSET, BET_USER_OFFSET, MAX_TEAMS, MIN_TEAMS,
};
use crate::error::{ClientError, Result};
use crate::instructions::{self, InitializeMarketArgs, PlaceBetArgs, ResolveMarketArgs};
use crate::pda::{bet_address, market_address, vault_address};
use crate::query::{CachedValue, QueryCache, QueryKey};
use crate::state::{Bet, BetView, Market, MarketView};
use crate::transport::{AccountFilter, ProgramTransport, TransportError};
use crate::units::{odds_to_base_units, stake_from_base_units, stake_to_base_units};

/// Market parameters as an admin enters them (display units)
#[derive(Debug, Clone, PartialEq)]
pub struct CreateMarketParams {
    pub league_name: String,
    pub season: String,
    pub teams: Vec<String>,
    pub odds: Vec<f64>,
    pub max_stake: f64,
    pub allowed_bettors: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceBetParams {
    pub market: Pubkey,
    pub team_index: usize,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveMarketParams {
    pub market: Pubkey,
    pub winning_team_index: usize,
}

/// Identifies a market both by address and by the seeds it was derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketSeedsParams {
    pub market: Pubkey,
    pub league_name: String,
    pub season: String,
}

pub type ClaimPayoutParams = MarketSeedsParams;
pub type CloseMarketParams = MarketSeedsParams;

/// Result of a confirmed (or already landed) request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    Confirmed(String),
    AlreadyProcessed,
}

impl TxOutcome {
    /// The transaction signature, or the "already processed" sentinel
    pub fn as_str(&self) -> &str {
        match self {
            TxOutcome::Confirmed(signature) => signature,
            TxOutcome::AlreadyProcessed => ALREADY_PROCESSED_SENTINEL,
        }
    }

    pub fn signature(&self) -> Option<&str> {
        match self {
            TxOutcome::Confirmed(signature) => Some(signature),
            TxOutcome::AlreadyProcessed => None,
        }
    }

    pub fn is_already_processed(&self) -> bool {
        matches!(self, TxOutcome::AlreadyProcessed)
    }
}

impl fmt::Display for TxOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check a bet against the market it targets and normalize it.
/// Nothing is derived or sent if this fails.
pub fn validate_bet(market: &MarketView, team_index: usize, amount: f64) -> Result<PlaceBetArgs> {
    market.check_open()?;
    let team_index = market.check_team_index(team_index)?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ClientError::InvalidParameter(format!("stake must be positive, got {}", amount)));
    }

    let amount_base = stake_to_base_units(amount)?;
    if amount_base == 0 {
        return Err(ClientError::InvalidParameter(format!("stake {} rounds to zero", amount)));
    }
    if amount_base > market.max_stake_amount {
        return Err(ClientError::StakeExceedsMax {
            max: stake_from_base_units(market.max_stake_amount),
        });
    }

    Ok(PlaceBetArgs {
        team_index,
        amount: amount_base,
    })
}

/// Check admin input for a new market and normalize it
pub fn validate_market(params: &CreateMarketParams) -> Result<InitializeMarketArgs> {
    let league_name = params.league_name.as_str();
    let season = params.season.as_str();
    if is_blank(league_name) {
        return Err(ClientError::MissingParameter("league_name"));
    }
    if is_blank(season) {
        return Err(ClientError::MissingParameter("season"));
    }
    for (field, value) in [("league_name", league_name), ("season", season)] {
        if value.len() > MAX_SEED_LEN {
            return Err(ClientError::InvalidParameter(format!(
                "{} is {} bytes, limit is {}",
                field,
                value.len(),
                MAX_SEED_LEN
            )));
        }
    }

    if params.teams.len() != params.odds.len() {
        return Err(ClientError::InvalidParameter(format!(
            "{} teams but {} odds",
            params.teams.len(),
            params.odds.len()
        )));
    }
    if params.teams.len() < MIN_TEAMS {
        return Err(ClientError::InvalidParameter(format!(
            "a market needs at least {} teams",
            MIN_TEAMS
        )));
    }
    if params.teams.len() > MAX_TEAMS {
        return Err(ClientError::InvalidParameter(format!(
            "a market holds at most {} teams, got {}",
            MAX_TEAMS,
            params.teams.len()
        )));
    }
    if params.teams.iter().any(|team| is_blank(team)) {
        return Err(ClientError::MissingParameter("team name"));
    }

    let odds = params
        .odds
        .iter()
        .map(|&o| odds_to_base_units(o))
        .collect::<Result<Vec<_>>>()?;

    if !params.max_stake.is_finite() || params.max_stake <= 0.0 {
        return Err(ClientError::InvalidParameter(format!(
            "max stake must be positive, got {}",
            params.max_stake
        )));
    }
    let max_stake_amount = stake_to_base_units(params.max_stake)?;
    if max_stake_amount == 0 {
        return Err(ClientError::InvalidParameter("max stake rounds to zero".to_string()));
    }

    if params.allowed_bettors == 0 {
        return Err(ClientError::InvalidParameter("allowed bettors must be at least 1".to_string()));
    }

    Ok(InitializeMarketArgs {
        league_name: league_name.to_string(),
        season: season.to_string(),
        teams: params.teams.clone(),
        odds,
        max_stake_amount,
        allowed_bettors: params.allowed_bettors,
    })
}

/// Seeds are derived from the bytes as given, so blank input is rejected
/// but surrounding whitespace is never stripped
fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// SolScore client: request builders plus cached reads
pub struct SolscoreClient<T> {
    config: ClientConfig,
    transport: T,
    cache: QueryCache,
}

impl<T: ProgramTransport> SolscoreClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        let cache = QueryCache::new(config.cache_stale_time);
        Self {
            config,
            transport,
            cache,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn require_signer(&self) -> Result<Pubkey> {
        self.transport.signer().ok_or(ClientError::WalletNotConnected)
    }

    /// Derive the market PDA and check it is the market the caller named
    fn check_market_seeds(&self, params: &MarketSeedsParams) -> Result<()> {
        if is_blank(&params.league_name) || is_blank(&params.season) {
            return Err(ClientError::MissingParameter("league_name and season"));
        }

        let (derived, _) = market_address(&self.config.program_id, &params.league_name, &params.season)?;
        if derived != params.market {
            return Err(ClientError::InvalidParameter(format!(
                "market {} is not {}/{}",
                params.market, params.league_name, params.season
            )));
        }
        Ok(())
    }

    async fn submit(&self, operation: &'static str, instruction: Instruction) -> Result<TxOutcome> {
        let request_id = Uuid::new_v4();
        info!(%request_id, "{}: submitting", operation);

        match self.transport.send_and_confirm(vec![instruction]).await {
            Ok(signature) => {
                info!(
                    %request_id,
                    "{}: confirmed {} ({})",
                    operation,
                    signature,
                    self.config.explorer_tx_url(&signature)
                );
                Ok(TxOutcome::Confirmed(signature))
            }
            Err(TransportError::AlreadyProcessed) => {
                warn!(%request_id, "{}: transaction was already processed", operation);
                Ok(TxOutcome::AlreadyProcessed)
            }
            Err(TransportError::Rejected(message)) | Err(TransportError::Rpc(message)) => {
                error!(%request_id, "{} failed: {}", operation, message);
                Err(ClientError::Submission(message))
            }
        }
    }

    // ---------------------------------------------------------------------
    // Request builders
    // ---------------------------------------------------------------------

    /// initialize_market, signed by the admin
    pub async fn create_market(&self, params: &CreateMarketParams) -> Result<TxOutcome> {
        let admin = self.require_signer()?;
        let args = validate_market(params)?;

        let (market, _) = market_address(&self.config.program_id, &args.league_name, &args.season)?;
        debug!(
            "Market PDA {} vault {}",
            market,
            vault_address(&self.config.mint, &market)
        );

        let ix = instructions::initialize_market(&self.config, &market, &admin, &args)?;
        let outcome = self.submit("initialize_market", ix).await?;
        self.cache.invalidate_market(&market);
        Ok(outcome)
    }

    /// place_bet on an open market
    pub async fn place_bet(&self, params: &PlaceBetParams) -> Result<TxOutcome> {
        let user = self.require_signer()?;

        // Preconditions are checked against the current account, not the cache
        let market = self
            .refetch_market(&params.market)
            .await?
            .ok_or_else(|| ClientError::MarketNotFound(params.market.to_string()))?;
        let args = validate_bet(&market, params.team_index, params.amount)?;

        let (bet, _) = bet_address(&self.config.program_id, &user, &params.market)?;
        debug!("Bet PDA {} for market {}", bet, params.market);

        let ix = instructions::place_bet(&self.config, &bet, &params.market, &user, &args)?;
        let outcome = self.submit("place_bet", ix).await?;
        self.cache.invalidate_market(&params.market);
        Ok(outcome)
    }

    /// resolve_market, signed by the admin
    pub async fn resolve_market(&self, params: &ResolveMarketParams) -> Result<TxOutcome> {
        let admin = self.require_signer()?;

        let market = self
            .refetch_market(&params.market)
            .await?
            .ok_or_else(|| ClientError::MarketNotFound(params.market.to_string()))?;
        market.check_open()?;
        let winning_team_index = market.check_team_index(params.winning_team_index)?;

        let ix = instructions::resolve_market(
            &self.config,
            &params.market,
            &admin,
            &ResolveMarketArgs { winning_team_index },
        )?;
        let outcome = self.submit("resolve_market", ix).await?;
        self.cache.invalidate_market(&params.market);
        Ok(outcome)
    }

    /// claim_payout for the connected wallet's bet
    pub async fn claim_payout(&self, params: &ClaimPayoutParams) -> Result<TxOutcome> {
        let user = self.require_signer()?;
        self.check_market_seeds(params)?;

        let (bet, _) = bet_address(&self.config.program_id, &user, &params.market)?;
        debug!("Claiming bet {} on market {}", bet, params.market);

        let ix = instructions::claim_payout(&self.config, &bet, &params.market, &user);
        let outcome = self.submit("claim_payout", ix).await?;
        self.cache.invalidate_market(&params.market);
        Ok(outcome)
    }

    /// close_market, returning custody to the admin
    pub async fn close_market(&self, params: &CloseMarketParams) -> Result<TxOutcome> {
        let admin = self.require_signer()?;
        self.check_market_seeds(params)?;

        let ix = instructions::close_market(&self.config, &params.market, &admin);
        let outcome = self.submit("close_market", ix).await?;
        self.cache.invalidate_market(&params.market);
        Ok(outcome)
    }

    // ---------------------------------------------------------------------
    // Fetchers
    // ---------------------------------------------------------------------

    /// Single market by address; None if the account does not exist
    pub async fn market(&self, address: &Pubkey) -> Result<Option<MarketView>> {
        if let Some(CachedValue::Market(market)) = self.cache.get(&QueryKey::Market(*address)) {
            return Ok(market);
        }
        self.refetch_market(address).await
    }

    pub async fn refetch_market(&self, address: &Pubkey) -> Result<Option<MarketView>> {
        let market = match self.fetch_account(address).await? {
            Some(data) => Some(Market::decode(&data)?.to_view(address)),
            None => None,
        };
        self.cache.put(QueryKey::Market(*address), CachedValue::Market(market.clone()));
        Ok(market)
    }

    /// Market by the (league, season) pair it was created with
    pub async fn market_by_league(&self, league_name: &str, season: &str) -> Result<Option<MarketView>> {
        if is_blank(league_name) || is_blank(season) {
            return Ok(None);
        }
        let (address, _) = market_address(&self.config.program_id, league_name, season)?;
        self.market(&address).await
    }

    pub async fn all_markets(&self) -> Result<Vec<MarketView>> {
        if let Some(CachedValue::Markets(markets)) = self.cache.get(&QueryKey::AllMarkets) {
            return Ok(markets);
        }
        self.refetch_all_markets().await
    }

    pub async fn refetch_all_markets(&self) -> Result<Vec<MarketView>> {
        let filters = vec![discriminator_filter(Market::DISCRIMINATOR)];
        let markets = self
            .scan(filters, Market::decode)
            .await?
            .into_iter()
            .map(|(address, market)| market.to_view(&address))
            .collect::<Vec<_>>();

        debug!("Fetched {} markets", markets.len());
        self.cache.put(QueryKey::AllMarkets, CachedValue::Markets(markets.clone()));
        Ok(markets)
    }

    /// Every bet placed by `user` (memcmp on `Bet::user`)
    pub async fn user_bets(&self, user: &Pubkey) -> Result<Vec<BetView>> {
        let key = QueryKey::UserBets(*user);
        if let Some(CachedValue::Bets(bets)) = self.cache.get(&key) {
            return Ok(bets);
        }
        self.refetch_bets(key, BET_USER_OFFSET, user).await
    }

    pub async fn refetch_user_bets(&self, user: &Pubkey) -> Result<Vec<BetView>> {
        self.refetch_bets(QueryKey::UserBets(*user), BET_USER_OFFSET, user).await
    }

    /// Bets of the connected wallet; empty when no wallet is connected
    pub async fn my_bets(&self) -> Result<Vec<BetView>> {
        match self.transport.signer() {
            Some(user) => self.user_bets(&user).await,
            None => Ok(Vec::new()),
        }
    }

    /// Every bet on `market` (memcmp on `Bet::market`)
    pub async fn market_bets(&self, market: &Pubkey) -> Result<Vec<BetView>> {
        let key = QueryKey::MarketBets(*market);
        if let Some(CachedValue::Bets(bets)) = self.cache.get(&key) {
            return Ok(bets);
        }
        self.refetch_bets(key, BET_MARKET_OFFSET, market).await
    }

    pub async fn refetch_market_bets(&self, market: &Pubkey) -> Result<Vec<BetView>> {
        self.refetch_bets(QueryKey::MarketBets(*market), BET_MARKET_OFFSET, market).await
    }

    /// The bet `user` placed on `market`, if any
    pub async fn bet(&self, user: &Pubkey, market: &Pubkey) -> Result<Option<BetView>> {
        let key = QueryKey::Bet {
            user: *user,
            market: *market,
        };
        if let Some(CachedValue::Bet(bet)) = self.cache.get(&key) {
            return Ok(bet);
        }

        let (address, _) = bet_address(&self.config.program_id, user, market)?;
        let bet = match self.fetch_account(&address).await? {
            Some(data) => Some(Bet::decode(&data)?.to_view(&address)),
            None => None,
        };
        self.cache.put(key, CachedValue::Bet(bet.clone()));
        Ok(bet)
    }

    /// Drop every cached read
    pub fn invalidate_all(&self) {
        self.cache.clear();
    }

    async fn refetch_bets(&self, key: QueryKey, offset: usize, owner: &Pubkey) -> Result<Vec<BetView>> {
        let filters = vec![
            discriminator_filter(Bet::DISCRIMINATOR),
            AccountFilter::Memcmp {
                offset,
                bytes: owner.to_bytes().to_vec(),
            },
        ];
        let bets = self
            .scan(filters, Bet::decode)
            .await?
            .into_iter()
            .map(|(address, bet)| bet.to_view(&address))
            .collect::<Vec<_>>();

        self.cache.put(key, CachedValue::Bets(bets.clone()));
        Ok(bets)
    }

    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        self.transport
            .get_account_data(address)
            .await
            .map_err(|e| ClientError::Fetch(e.to_string()))
    }

    /// Bulk scan; accounts that fail to decode are skipped
    async fn scan<A>(
        &self,
        filters: Vec<AccountFilter>,
        decode: fn(&[u8]) -> Result<A>,
    ) -> Result<Vec<(Pubkey, A)>> {
        let accounts = self
            .transport
            .get_program_accounts(&self.config.program_id, filters)
            .await
            .map_err(|e| ClientError::Fetch(e.to_string()))?;

        Ok(accounts
            .into_iter()
            .filter_map(|(address, data)| match decode(&data) {
                Ok(account) => Some((address, account)),
                Err(err) => {
                    warn!("Skipping account {}: {}", address, err);
                    None
                }
            })
            .collect())
    }
}

fn discriminator_filter(discriminator: &[u8]) -> AccountFilter {
    AccountFilter::Memcmp {
        offset: 0,
        bytes: discriminator.to_vec(),
    }
}
