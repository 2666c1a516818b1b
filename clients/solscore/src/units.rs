//! Fixed-point conversions between what users type and what the program stores.
//!
//! Stakes use 6 decimals (1_000_000 = 1.00 USDC), odds use 2 decimals
//! (250 = 2.50x). Conversions into base units never round a stake up.

use crate::constants::{ODDS_SCALE, ODDS_UNAVAILABLE, STAKE_SCALE};
use crate::error::ClientError;

/// floor(display * 1_000_000)
pub fn stake_to_base_units(display: f64) -> Result<u64, ClientError> {
    if !display.is_finite() || display < 0.0 {
        return Err(ClientError::InvalidParameter(format!(
            "stake must be a non-negative number, got {}",
            display
        )));
    }

    let scaled = (display * STAKE_SCALE as f64).floor();
    if scaled >= u64::MAX as f64 {
        return Err(ClientError::InvalidParameter(format!("stake {} is too large", display)));
    }

    Ok(scaled as u64)
}

pub fn stake_from_base_units(base: u64) -> f64 {
    base as f64 / STAKE_SCALE as f64
}

/// round(odds * 100)
pub fn odds_to_base_units(display: f64) -> Result<u64, ClientError> {
    if !display.is_finite() || display <= 0.0 {
        return Err(ClientError::InvalidParameter(format!(
            "odds must be a positive number, got {}",
            display
        )));
    }

    let scaled = (display * ODDS_SCALE as f64).round();
    if scaled < 1.0 || scaled >= u64::MAX as f64 {
        return Err(ClientError::InvalidParameter(format!("odds {} out of range", display)));
    }

    Ok(scaled as u64)
}

pub fn odds_from_base_units(base: u64) -> f64 {
    base as f64 / ODDS_SCALE as f64
}

/// Display-only payout preview. The program decides what is actually paid.
pub fn potential_payout(stake_base: u64, odds_base: u64) -> f64 {
    stake_from_base_units(stake_base) * odds_from_base_units(odds_base)
}

/// Odds for `index` as "2.50x", or "N/A" when the market has no entry
pub fn format_odds(odds: &[u64], index: usize) -> String {
    match odds.get(index) {
        Some(&base) if base > 0 => format!("{:.2}x", odds_from_base_units(base)),
        _ => ODDS_UNAVAILABLE.to_string(),
    }
}

/// Base-unit stake as "4.00"
pub fn format_stake(base: u64) -> String {
    format!("{:.2}", stake_from_base_units(base))
}

/// Parse an amount typed into a form field
pub fn parse_display_amount(input: &str) -> Result<f64, ClientError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ClientError::MissingParameter("amount"));
    }

    let value = trimmed
        .parse::<f64>()
        .map_err(|_| ClientError::InvalidParameter(format!("not a number: {}", trimmed)))?;

    if !value.is_finite() {
        return Err(ClientError::InvalidParameter(format!("not a finite number: {}", trimmed)));
    }

    Ok(value)
}

/// Funds the admin should keep in custody to cover every bettor winning at
/// the highest odds: max stake × highest odds × allowed bettors
pub fn required_vault_funding(max_stake: f64, odds: &[f64], allowed_bettors: u64) -> f64 {
    if !max_stake.is_finite() || max_stake <= 0.0 || allowed_bettors == 0 {
        return 0.0;
    }

    let highest = odds
        .iter()
        .copied()
        .filter(|o| o.is_finite())
        .fold(0.0_f64, f64::max);

    max_stake * highest * allowed_bettors as f64
}
