use sale_tiers::BonusTier;
use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::error::Error;

// TTL (in ledgers, ~5s each)
pub const DAY_IN_LEDGERS: u32 = 17_280;
pub const INSTANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub const PARTICIPANT_BUMP_AMOUNT: u32 = 120 * DAY_IN_LEDGERS;
pub const PARTICIPANT_LIFETIME_THRESHOLD: u32 = PARTICIPANT_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum AuctionStage {
    /// Deployed, no settings yet
    Deployed = 0,
    /// Settings in place, still adjustable
    Setup = 1,
    /// Bidding open
    Started = 2,
    /// Settled, final price fixed
    Ended = 3,
    /// Claims flowing, recovery possible after the audit wait
    ClaimOpen = 4,
}

/// Linear price decay, in wei per whole token
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriceCurve {
    pub ceiling_wei: i128,
    pub floor_wei: i128,
    /// Per-block decay scaled by PRICE_SCALE
    pub price_constant: i128,
    pub period_blocks: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct AuctionConfig {
    /// Tokens reserved for bidders (bonus included)
    pub max_tokens: i128,
    pub ether_price_cents: i128,
    pub hard_cap_cents: i128,
    pub ceiling_cents: i128,
    pub floor_cents: i128,
    pub hard_cap_wei: i128,
    pub curve: PriceCurve,
    /// Thresholds in USD cents of contributed value
    pub tiers: Vec<BonusTier>,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct AuctionState {
    pub stage: AuctionStage,
    pub start_block: u32,
    pub end_block: u32,
    pub total_received: i128,
    pub remaining_cap: i128,
    pub final_price: i128,
    pub funds_claimed: i128,
    /// Sale tokens paid out by claims so far
    pub tokens_distributed: i128,
    /// Contribution total + presale cap + auction pool
    pub max_total_claim: i128,
    pub participants: u32,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Bid {
    pub amount: i128,
    pub claimed: bool,
    pub claimed_funds: i128,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Initialized,
    SaleToken,
    PaymentToken,
    ContributionLedger,
    PresaleLedger,
    BiddingPeriod,
    AuditWait,
    Config,
    State,
    Bid(Address),
    Whitelist(Address),
    Recovered(Address), // token -> total swept
}

/// Proof that pending state has reached storage
///
/// Only this module can build one, and outbound transfers need one, so an
/// entry point cannot pay out before it has written its state.
pub struct Committed(());

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn read_address(env: &Env, key: &DataKey) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(key)
        .ok_or(Error::NotInitialized)
}

pub fn read_period(env: &Env, key: &DataKey) -> u32 {
    env.storage().instance().get(key).unwrap_or(0)
}

pub fn read_config(env: &Env) -> Result<AuctionConfig, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::InvalidStage)
}

pub fn write_config(env: &Env, config: &AuctionConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn read_state(env: &Env) -> AuctionState {
    env.storage()
        .instance()
        .get(&DataKey::State)
        .unwrap_or(AuctionState {
            stage: AuctionStage::Deployed,
            start_block: 0,
            end_block: 0,
            total_received: 0,
            remaining_cap: 0,
            final_price: 0,
            funds_claimed: 0,
            tokens_distributed: 0,
            max_total_claim: 0,
            participants: 0,
        })
}

pub fn write_state(env: &Env, state: &AuctionState) {
    env.storage().instance().set(&DataKey::State, state);
    bump_instance(env);
}

pub fn read_bid(env: &Env, bidder: &Address) -> Bid {
    env.storage()
        .persistent()
        .get(&DataKey::Bid(bidder.clone()))
        .unwrap_or_default()
}

fn write_bid(env: &Env, bidder: &Address, bid: &Bid) {
    let key = DataKey::Bid(bidder.clone());
    env.storage().persistent().set(&key, bid);
    env.storage()
        .persistent()
        .extend_ttl(&key, PARTICIPANT_LIFETIME_THRESHOLD, PARTICIPANT_BUMP_AMOUNT);
}

pub fn is_whitelisted(env: &Env, participant: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Whitelist(participant.clone()))
        .unwrap_or(false)
}

pub fn set_whitelisted(env: &Env, participant: &Address, listed: bool) {
    let key = DataKey::Whitelist(participant.clone());
    if !listed {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, &true);
    env.storage()
        .persistent()
        .extend_ttl(&key, PARTICIPANT_LIFETIME_THRESHOLD, PARTICIPANT_BUMP_AMOUNT);
}

pub fn read_recovered(env: &Env, token: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Recovered(token.clone()))
        .unwrap_or(0)
}

// ============================================
// COMMIT POINTS (precede every outbound transfer)
// ============================================

pub fn commit_bid(env: &Env, bidder: &Address, bid: &Bid, state: &AuctionState) -> Committed {
    write_bid(env, bidder, bid);
    write_state(env, state);
    Committed(())
}

pub fn commit_recovery(env: &Env, token: &Address, recovered: i128) -> Committed {
    env.storage()
        .persistent()
        .set(&DataKey::Recovered(token.clone()), &recovered);
    bump_instance(env);
    Committed(())
}
