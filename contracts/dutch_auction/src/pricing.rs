use sale_tiers::{bonus_percent, mul_div, mul_div_ceil, BonusTier, PERCENT_BASE, TOKEN_UNIT};
use soroban_sdk::{Env, Vec};

use crate::storage::PriceCurve;

/// Fixed-point scale of the per-block price decay
pub const PRICE_SCALE: i128 = 1_000_000_000;

/// Convert USD cents into wei at the configured ether price
///
/// Formula: wei = cents × 10^18 / ether_price_cents
///
/// Example:
/// - ether price: $300 (30000¢), ceiling: $4 (400¢)
/// - ceiling_wei: 400 × 10^18 / 30000 = 13_333_333_333_333_333
pub fn cents_to_wei(env: &Env, cents: i128, ether_price_cents: i128) -> Option<i128> {
    mul_div(env, cents, TOKEN_UNIT, ether_price_cents)
}

/// USD cents worth of a wei amount, rounded down
pub fn wei_to_cents(env: &Env, wei: i128, ether_price_cents: i128) -> Option<i128> {
    mul_div(env, wei, ether_price_cents, TOKEN_UNIT)
}

/// Per-block price decay, scaled by PRICE_SCALE and rounded up
///
/// Formula: pc = ceil((ceiling - floor) × PRICE_SCALE / period)
///
/// Rounding up guarantees the curve has reached the floor once the whole
/// period has elapsed.
pub fn calculate_price_constant(
    env: &Env,
    ceiling_wei: i128,
    floor_wei: i128,
    period_blocks: u32,
) -> Option<i128> {
    let spread = ceiling_wei.checked_sub(floor_wei)?;
    mul_div_ceil(env, spread, PRICE_SCALE, period_blocks as i128)
}

impl PriceCurve {
    /// Price per whole token after `elapsed` blocks of bidding
    ///
    /// Formula: price(e) = ceiling - floor(e × pc / PRICE_SCALE), never below floor
    pub fn price_at(&self, env: &Env, elapsed: u32) -> i128 {
        if elapsed >= self.period_blocks {
            return self.floor_wei;
        }
        let decay = mul_div(env, elapsed as i128, self.price_constant, PRICE_SCALE)
            .unwrap_or(i128::MAX);
        self.ceiling_wei.saturating_sub(decay).max(self.floor_wei)
    }
}

/// Token base units bought by `funds` wei at `price` wei per token
///
/// Formula: tokens = funds × 10^18 / price
pub fn calculate_tokens(env: &Env, funds: i128, price: i128) -> Option<i128> {
    mul_div(env, funds, TOKEN_UNIT, price)
}

/// Bonus on auction tokens, tiered by the USD value of the bid
pub fn calculate_bid_bonus(
    env: &Env,
    tiers: &Vec<BonusTier>,
    tokens: i128,
    bid_wei: i128,
    ether_price_cents: i128,
) -> Option<i128> {
    let cents = wei_to_cents(env, bid_wei, ether_price_cents)?;
    let percent = bonus_percent(tiers, cents);
    mul_div(env, tokens, percent as i128, PERCENT_BASE)
}

/// Worst case: the whole hard cap sold at the floor with the top bonus
pub fn max_auction_payout(
    env: &Env,
    hard_cap_wei: i128,
    floor_wei: i128,
    max_percent: u32,
) -> Option<i128> {
    let tokens = calculate_tokens(env, hard_cap_wei, floor_wei)?;
    mul_div(env, tokens, PERCENT_BASE + max_percent as i128, PERCENT_BASE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sale_tiers::build_tiers;
    use soroban_sdk::vec;

    const ETHER_PRICE_CENTS: i128 = 30_000;
    const BIDDING_PERIOD: u32 = 524_160;

    fn curve(env: &Env) -> PriceCurve {
        let ceiling_wei = cents_to_wei(env, 400, ETHER_PRICE_CENTS).unwrap();
        let floor_wei = cents_to_wei(env, 20, ETHER_PRICE_CENTS).unwrap();
        let price_constant =
            calculate_price_constant(env, ceiling_wei, floor_wei, BIDDING_PERIOD).unwrap();
        PriceCurve {
            ceiling_wei,
            floor_wei,
            price_constant,
            period_blocks: BIDDING_PERIOD,
        }
    }

    fn usd_tiers(env: &Env) -> Vec<BonusTier> {
        let thresholds = vec![
            env,
            9_900i128,
            15_000,
            35_000,
            50_000,
            100_000,
            1_000_000,
            2_500_000,
            5_000_000,
            10_000_000,
            25_000_000,
            100_000_000,
        ];
        let percents = vec![env, 1u32, 2, 3, 4, 5, 10, 15, 20, 25, 30, 32];
        build_tiers(env, &thresholds, &percents).unwrap()
    }

    #[test]
    fn test_cents_conversion() {
        let env = Env::default();

        assert_eq!(
            cents_to_wei(&env, 400, ETHER_PRICE_CENTS),
            Some(13_333_333_333_333_333)
        );
        assert_eq!(
            cents_to_wei(&env, 20, ETHER_PRICE_CENTS),
            Some(666_666_666_666_666)
        );
        assert_eq!(wei_to_cents(&env, TOKEN_UNIT, ETHER_PRICE_CENTS), Some(30_000));
        assert_eq!(cents_to_wei(&env, 400, 0), None);
    }

    #[test]
    fn test_price_at_boundaries() {
        let env = Env::default();
        let curve = curve(&env);

        assert_eq!(curve.price_at(&env, 0), curve.ceiling_wei);
        assert_eq!(curve.price_at(&env, BIDDING_PERIOD), curve.floor_wei);
        assert_eq!(curve.price_at(&env, BIDDING_PERIOD * 2), curve.floor_wei);
        assert!(curve.price_at(&env, BIDDING_PERIOD - 1) > curve.floor_wei);
    }

    #[test]
    fn test_price_is_non_increasing() {
        let env = Env::default();
        let curve = curve(&env);

        let mut previous = curve.price_at(&env, 0);
        let mut elapsed = 0;
        while elapsed <= BIDDING_PERIOD {
            let price = curve.price_at(&env, elapsed);
            assert!(price <= previous);
            assert!(price >= curve.floor_wei && price <= curve.ceiling_wei);
            previous = price;
            elapsed += 4_096;
        }
    }

    #[test]
    fn test_price_constant_rounds_up() {
        let env = Env::default();

        // 10 wei over 3 blocks: 3.33.. per block, scaled and rounded up
        assert_eq!(
            calculate_price_constant(&env, 20, 10, 3),
            Some(3_333_333_334)
        );
        assert_eq!(calculate_price_constant(&env, 20, 10, 0), None);
    }

    #[test]
    fn test_calculate_tokens() {
        let env = Env::default();

        // 1 ether at 0.5 ether per token
        assert_eq!(
            calculate_tokens(&env, TOKEN_UNIT, TOKEN_UNIT / 2),
            Some(2 * TOKEN_UNIT)
        );
    }

    #[test]
    fn test_bid_bonus_keyed_on_usd_value() {
        let env = Env::default();
        let tiers = usd_tiers(&env);
        let tokens = 1_000 * TOKEN_UNIT;

        // 1 ether at $300 is 30000¢: second tier, 2%
        let bonus = calculate_bid_bonus(&env, &tiers, tokens, TOKEN_UNIT, ETHER_PRICE_CENTS);
        assert_eq!(bonus, Some(20 * TOKEN_UNIT));

        // Looking up the raw wei amount lands on the top tier instead
        assert_eq!(bonus_percent(&tiers, TOKEN_UNIT), 32);
        assert_ne!(bonus_percent(&tiers, TOKEN_UNIT), 2);
    }

    #[test]
    fn test_bid_bonus_below_first_tier() {
        let env = Env::default();
        let tiers = usd_tiers(&env);

        // $90 worth of ether is under the $99 threshold
        let bid = cents_to_wei(&env, 9_000, ETHER_PRICE_CENTS).unwrap();
        assert_eq!(
            calculate_bid_bonus(&env, &tiers, TOKEN_UNIT, bid, ETHER_PRICE_CENTS),
            Some(0)
        );
    }

    #[test]
    fn test_max_auction_payout() {
        let env = Env::default();

        // 10 ether at 0.5 ether per token with a 32% top tier
        let payout = max_auction_payout(&env, 10 * TOKEN_UNIT, TOKEN_UNIT / 2, 32);
        assert_eq!(payout, Some(2_640 * TOKEN_UNIT / 100));
    }
}
