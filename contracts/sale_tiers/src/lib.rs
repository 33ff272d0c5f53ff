#![no_std]

//! Bonus tier tables and fixed-point helpers shared by the sale contracts.

use soroban_sdk::{contracttype, Env, Vec, I256};

// Constants
pub const TOKEN_UNIT: i128 = 1_000_000_000_000_000_000; // 18 decimals
pub const MIN_RECORD_AMOUNT: i128 = 100_000; // smallest recordable amount in base units
pub const PERCENT_BASE: i128 = 100;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BonusTier {
    /// Lowest amount (inclusive) that qualifies for this tier
    pub threshold: i128,
    /// Whole-percent bonus granted at this tier
    pub percent: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TierError {
    /// Threshold and percent arrays differ in length
    LengthMismatch,
    /// No tiers given
    Empty,
    /// Threshold below zero
    NegativeThreshold,
    /// Thresholds not strictly ascending
    NotAscending,
}

/// Zip parallel threshold/percent arrays into a validated tier table
///
/// Thresholds must be non-negative and strictly ascending, so lookups can
/// assume a sorted table without re-checking it.
pub fn build_tiers(
    env: &Env,
    thresholds: &Vec<i128>,
    percents: &Vec<u32>,
) -> Result<Vec<BonusTier>, TierError> {
    if thresholds.len() != percents.len() {
        return Err(TierError::LengthMismatch);
    }
    if thresholds.is_empty() {
        return Err(TierError::Empty);
    }

    let mut tiers = Vec::new(env);
    let mut previous: Option<i128> = None;

    for (threshold, percent) in thresholds.iter().zip(percents.iter()) {
        if threshold < 0 {
            return Err(TierError::NegativeThreshold);
        }
        if let Some(prev) = previous {
            if threshold <= prev {
                return Err(TierError::NotAscending);
            }
        }
        previous = Some(threshold);
        tiers.push_back(BonusTier { threshold, percent });
    }

    Ok(tiers)
}

/// Bonus percent for an amount
///
/// Picks the highest tier whose threshold is at or below `amount`.
/// Amounts under the first threshold earn nothing; amounts above the last
/// threshold stay on the last tier.
pub fn bonus_percent(tiers: &Vec<BonusTier>, amount: i128) -> u32 {
    let mut percent = 0;
    for tier in tiers.iter() {
        if tier.threshold > amount {
            break;
        }
        percent = tier.percent;
    }
    percent
}

/// Bonus for an amount
///
/// Formula: bonus = floor(amount × percent / 100)
///
/// Example:
/// - amount: 300 tokens, tier percent: 1
/// - bonus: 3 tokens
pub fn bonus_amount(env: &Env, tiers: &Vec<BonusTier>, amount: i128) -> Option<i128> {
    let percent = bonus_percent(tiers, amount);
    mul_div(env, amount, percent as i128, PERCENT_BASE)
}

/// Highest percent anywhere in the table
pub fn max_percent(tiers: &Vec<BonusTier>) -> u32 {
    tiers.iter().map(|t| t.percent).max().unwrap_or(0)
}

/// floor(a × b / d) with a 256-bit intermediate
///
/// Returns `None` when `d` is zero or the quotient does not fit in i128.
pub fn mul_div(env: &Env, a: i128, b: i128, d: i128) -> Option<i128> {
    if d == 0 {
        return None;
    }
    let product = I256::from_i128(env, a).mul(&I256::from_i128(env, b));
    product.div(&I256::from_i128(env, d)).to_i128()
}

/// ceil(a × b / d) for non-negative operands
pub fn mul_div_ceil(env: &Env, a: i128, b: i128, d: i128) -> Option<i128> {
    if d <= 0 {
        return None;
    }
    let product = I256::from_i128(env, a).mul(&I256::from_i128(env, b));
    let rounded = product.add(&I256::from_i128(env, d - 1));
    rounded.div(&I256::from_i128(env, d)).to_i128()
}
