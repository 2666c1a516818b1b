use anchor_lang::prelude::*;
use serde::Serialize;

use crate::error::ClientError;
use crate::units::{format_odds, odds_from_base_units, potential_payout, stake_from_base_units};

/// Betting market account owned by the SolScore program
#[account]
#[derive(Debug, PartialEq)]
pub struct Market {
    pub admin: Pubkey,                   // Admin who created the market
    pub league_name: String,             // First seed field
    pub season: String,                  // Second seed field
    pub teams: Vec<String>,              // Team names, parallel to odds
    pub odds: Vec<u64>,                  // Odds in base-100 units (250 = 2.50x)
    pub max_stake_amount: u64,           // Max stake per bet (6 decimals)
    pub allowed_bettors: u64,            // Max number of bettors
    pub vault: Pubkey,                   // Custody token account
    pub mint: Pubkey,                    // Stake token mint
    pub is_resolved: bool,               // Set by resolve_market
    pub winning_team_index: Option<u8>,  // Some(i) once resolved
    pub bump: u8,                        // PDA bump seed
}

impl Market {
    /// Decode raw account data, discriminator included
    pub fn decode(data: &[u8]) -> std::result::Result<Self, ClientError> {
        let mut slice = data;
        Market::try_deserialize(&mut slice).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub fn to_view(&self, address: &Pubkey) -> MarketView {
        MarketView {
            address: address.to_string(),
            admin: self.admin.to_string(),
            league_name: self.league_name.clone(),
            season: self.season.clone(),
            teams: self.teams.clone(),
            odds: self.odds.iter().map(|&o| odds_from_base_units(o)).collect(),
            odds_labels: (0..self.teams.len()).map(|i| format_odds(&self.odds, i)).collect(),
            max_stake: stake_from_base_units(self.max_stake_amount),
            max_stake_amount: self.max_stake_amount,
            allowed_bettors: self.allowed_bettors,
            vault: self.vault.to_string(),
            mint: self.mint.to_string(),
            is_resolved: self.is_resolved,
            winning_team_index: self.winning_team_index,
            odds_base: self.odds.clone(),
        }
    }
}

/// A user's stake on one team of a market
#[account]
#[derive(Debug, PartialEq)]
pub struct Bet {
    pub user: Pubkey,                // Bettor, offset 8
    pub market: Pubkey,              // Market, offset 40
    pub team_index: u8,              // Chosen team
    pub amount: u64,                 // Stake (6 decimals)
    pub payout_amount: Option<u64>,  // Set by the program on payout
    pub timestamp: i64,              // Unix timestamp of placement
    pub bump: u8,                    // PDA bump seed
}

impl Bet {
    pub fn decode(data: &[u8]) -> std::result::Result<Self, ClientError> {
        let mut slice = data;
        Bet::try_deserialize(&mut slice).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub fn to_view(&self, address: &Pubkey) -> BetView {
        BetView {
            address: address.to_string(),
            user: self.user.to_string(),
            market: self.market.to_string(),
            team_index: self.team_index,
            amount: stake_from_base_units(self.amount),
            amount_base: self.amount,
            payout_amount: self.payout_amount.map(stake_from_base_units),
            timestamp: self.timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
}

/// Market with amounts in display units
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketView {
    pub address: String,
    pub admin: String,
    pub league_name: String,
    pub season: String,
    pub teams: Vec<String>,
    pub odds: Vec<f64>,
    pub odds_labels: Vec<String>,
    pub max_stake: f64,
    pub max_stake_amount: u64,
    pub allowed_bettors: u64,
    pub vault: String,
    pub mint: String,
    pub is_resolved: bool,
    pub winning_team_index: Option<u8>,
    #[serde(skip)]
    pub odds_base: Vec<u64>,
}

impl MarketView {
    /// Reject team selections outside the market, as a `u8` index
    pub fn check_team_index(&self, team_index: usize) -> std::result::Result<u8, ClientError> {
        if team_index >= self.teams.len() {
            return Err(ClientError::TeamIndexOutOfRange {
                index: team_index,
                teams: self.teams.len(),
            });
        }
        u8::try_from(team_index)
            .map_err(|_| ClientError::InvalidParameter(format!("team index {} too large", team_index)))
    }

    pub fn check_open(&self) -> std::result::Result<(), ClientError> {
        if self.is_resolved {
            return Err(ClientError::MarketResolved);
        }
        Ok(())
    }

    pub fn winning_team(&self) -> Option<&str> {
        self.winning_team_index
            .and_then(|i| self.teams.get(i as usize))
            .map(String::as_str)
    }

    /// Payout preview for a base-unit stake on `team_index`.
    /// None when the market has no odds for that team.
    pub fn potential_payout(&self, team_index: usize, stake_base: u64) -> Option<f64> {
        self.odds_base
            .get(team_index)
            .filter(|&&o| o > 0)
            .map(|&o| potential_payout(stake_base, o))
    }
}

/// Bet with amounts in display units
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetView {
    pub address: String,
    pub user: String,
    pub market: String,
    pub team_index: u8,
    pub amount: f64,
    #[serde(skip)]
    pub amount_base: u64,
    pub payout_amount: Option<f64>,
    pub timestamp: i64,
}

impl BetView {
    pub fn status(&self, market: &MarketView) -> BetStatus {
        match (market.is_resolved, market.winning_team_index) {
            (true, Some(winner)) if winner == self.team_index => BetStatus::Won,
            (true, Some(_)) => BetStatus::Lost,
            _ => BetStatus::Pending,
        }
    }

    pub fn is_claimable(&self, market: &MarketView) -> bool {
        self.status(market) == BetStatus::Won
    }

    pub fn potential_payout(&self, market: &MarketView) -> Option<f64> {
        market.potential_payout(self.team_index as usize, self.amount_base)
    }
}
