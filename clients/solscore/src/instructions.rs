use anchor_lang::prelude::*;
use solana_sdk::hash::hash;
use anchor_lang::solana_program::instruction::Instruction;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::pda::{token_account, vault_address};

/// Arguments of `initialize_market`, already in base units
#[derive(AnchorSerialize, AnchorDeserialize, Debug, Clone, PartialEq)]
pub struct InitializeMarketArgs {
    pub league_name: String,
    pub season: String,
    pub teams: Vec<String>,
    pub odds: Vec<u64>,
    pub max_stake_amount: u64,
    pub allowed_bettors: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceBetArgs {
    pub team_index: u8,
    pub amount: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveMarketArgs {
    pub winning_team_index: u8,
}

/// Anchor instruction discriminator: sha256("global:<name>")[..8]
pub fn sighash(name: &str) -> [u8; 8] {
    let preimage = format!("global:{}", name);
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash(preimage.as_bytes()).to_bytes()[..8]);
    out
}

fn instruction_data<T: AnchorSerialize>(name: &str, args: &T) -> Result<Vec<u8>> {
    let mut data = sighash(name).to_vec();
    args.serialize(&mut data)
        .map_err(|e| ClientError::Encode(format!("{} arguments: {}", name, e)))?;
    Ok(data)
}

/// initialize_market(league_name, season, teams, odds, max_stake_amount, allowed_bettors)
pub fn initialize_market(
    config: &ClientConfig,
    market: &Pubkey,
    admin: &Pubkey,
    args: &InitializeMarketArgs,
) -> Result<Instruction> {
    let accounts = vec![
        AccountMeta::new(*market, false),
        AccountMeta::new(vault_address(&config.mint, market), false),
        AccountMeta::new_readonly(config.mint, false),
        AccountMeta::new(*admin, true),
        AccountMeta::new(token_account(&config.mint, admin), false),
        AccountMeta::new_readonly(anchor_spl::token::ID, false),
        AccountMeta::new_readonly(anchor_spl::associated_token::ID, false),
        AccountMeta::new_readonly(anchor_lang::system_program::ID, false),
    ];

    Ok(Instruction {
        program_id: config.program_id,
        accounts,
        data: instruction_data("initialize_market", args)?,
    })
}

/// place_bet(team_index, amount)
pub fn place_bet(
    config: &ClientConfig,
    bet: &Pubkey,
    market: &Pubkey,
    user: &Pubkey,
    args: &PlaceBetArgs,
) -> Result<Instruction> {
    let accounts = vec![
        AccountMeta::new(*bet, false),
        AccountMeta::new(*market, false),
        AccountMeta::new(vault_address(&config.mint, market), false),
        AccountMeta::new(token_account(&config.mint, user), false),
        AccountMeta::new(*user, true),
        AccountMeta::new_readonly(config.mint, false),
        AccountMeta::new_readonly(anchor_spl::token::ID, false),
        AccountMeta::new_readonly(anchor_spl::associated_token::ID, false),
        AccountMeta::new_readonly(anchor_lang::system_program::ID, false),
    ];

    Ok(Instruction {
        program_id: config.program_id,
        accounts,
        data: instruction_data("place_bet", args)?,
    })
}

/// resolve_market(winning_team_index)
pub fn resolve_market(
    config: &ClientConfig,
    market: &Pubkey,
    admin: &Pubkey,
    args: &ResolveMarketArgs,
) -> Result<Instruction> {
    let accounts = vec![
        AccountMeta::new(*market, false),
        AccountMeta::new(*admin, true),
        AccountMeta::new_readonly(anchor_lang::system_program::ID, false),
    ];

    Ok(Instruction {
        program_id: config.program_id,
        accounts,
        data: instruction_data("resolve_market", args)?,
    })
}

/// claim_payout()
pub fn claim_payout(config: &ClientConfig, bet: &Pubkey, market: &Pubkey, user: &Pubkey) -> Instruction {
    let accounts = vec![
        AccountMeta::new(*market, false),
        AccountMeta::new(vault_address(&config.mint, market), false),
        AccountMeta::new(*bet, false),
        AccountMeta::new(token_account(&config.mint, user), false),
        AccountMeta::new(*user, true),
        AccountMeta::new_readonly(config.mint, false),
        AccountMeta::new_readonly(anchor_spl::token::ID, false),
        AccountMeta::new_readonly(anchor_spl::associated_token::ID, false),
        AccountMeta::new_readonly(anchor_lang::system_program::ID, false),
    ];

    Instruction {
        program_id: config.program_id,
        accounts,
        data: sighash("claim_payout").to_vec(),
    }
}

/// close_market()
pub fn close_market(config: &ClientConfig, market: &Pubkey, admin: &Pubkey) -> Instruction {
    let accounts = vec![
        AccountMeta::new(*market, false),
        AccountMeta::new_readonly(config.mint, false),
        AccountMeta::new(vault_address(&config.mint, market), false),
        AccountMeta::new(token_account(&config.mint, admin), false),
        AccountMeta::new(*admin, true),
        AccountMeta::new_readonly(anchor_spl::token::ID, false),
        AccountMeta::new_readonly(anchor_spl::associated_token::ID, false),
        AccountMeta::new_readonly(anchor_lang::system_program::ID, false),
    ];

    Instruction {
        program_id: config.program_id,
        accounts,
        data: sighash("close_market").to_vec(),
    }
}
