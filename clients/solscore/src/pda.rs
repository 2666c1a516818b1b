use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::pubkey::MAX_SEED_LEN;
use anchor_spl::associated_token::get_associated_token_address;

use crate::constants::{BET_SEED, MARKET_SEED};
use crate::error::ClientError;

/// Market PDA: seeds = [b"market", league_name.as_bytes(), season.as_bytes()]
pub fn market_address(
    program_id: &Pubkey,
    league_name: &str,
    season: &str,
) -> Result<(Pubkey, u8), ClientError> {
    find_address(
        program_id,
        &[MARKET_SEED, league_name.as_bytes(), season.as_bytes()],
    )
}

/// Bet PDA: seeds = [b"bet", user.as_ref(), market.as_ref()]
pub fn bet_address(
    program_id: &Pubkey,
    user: &Pubkey,
    market: &Pubkey,
) -> Result<(Pubkey, u8), ClientError> {
    find_address(program_id, &[BET_SEED, user.as_ref(), market.as_ref()])
}

/// Custody vault: the market PDA's associated token account (off-curve owner)
pub fn vault_address(mint: &Pubkey, market: &Pubkey) -> Pubkey {
    get_associated_token_address(market, mint)
}

/// Associated token account of a wallet for the market mint
pub fn token_account(mint: &Pubkey, owner: &Pubkey) -> Pubkey {
    get_associated_token_address(owner, mint)
}

fn find_address(program_id: &Pubkey, seeds: &[&[u8]]) -> Result<(Pubkey, u8), ClientError> {
    if let Some(seed) = seeds.iter().find(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(ClientError::Derivation(format!(
            "seed of {} bytes exceeds the {} byte limit",
            seed.len(),
            MAX_SEED_LEN
        )));
    }

    Pubkey::try_find_program_address(seeds, program_id)
        .ok_or_else(|| ClientError::Derivation("no viable bump seed".to_string()))
}
