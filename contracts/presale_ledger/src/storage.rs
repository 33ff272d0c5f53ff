use sale_tiers::BonusTier;
use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::error::Error;

// TTL (in ledgers, ~5s each)
pub const DAY_IN_LEDGERS: u32 = 17_280;
pub const INSTANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub const RECORD_BUMP_AMOUNT: u32 = 120 * DAY_IN_LEDGERS;
pub const RECORD_LIFETIME_THRESHOLD: u32 = RECORD_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PresaleStage {
    /// Deployed, waiting for the tier table
    Deployed = 0,
    /// Tier table set, records may be written
    Setup = 1,
    /// Records frozen, claims may be valued
    Locked = 2,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PresaleRecord {
    /// Tokens bought in the presale
    pub base: i128,
    /// Bonus earned on the whole base
    pub bonus: i128,
    /// base + bonus
    pub claimable: i128,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Initialized,
    Stage,
    MaxTokens,
    Tiers,
    TotalClaimable,
    Record(Address),
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn read_admin(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

pub fn read_stage(env: &Env) -> PresaleStage {
    env.storage()
        .instance()
        .get(&DataKey::Stage)
        .unwrap_or(PresaleStage::Deployed)
}

pub fn write_stage(env: &Env, stage: PresaleStage) {
    env.storage().instance().set(&DataKey::Stage, &stage);
}

pub fn read_max_tokens(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::MaxTokens)
        .unwrap_or(0)
}

pub fn read_tiers(env: &Env) -> Vec<BonusTier> {
    env.storage()
        .instance()
        .get(&DataKey::Tiers)
        .unwrap_or(Vec::new(env))
}

pub fn read_total(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalClaimable)
        .unwrap_or(0)
}

pub fn write_total(env: &Env, total: i128) {
    env.storage()
        .instance()
        .set(&DataKey::TotalClaimable, &total);
}

pub fn read_record(env: &Env, owner: &Address) -> PresaleRecord {
    env.storage()
        .persistent()
        .get(&DataKey::Record(owner.clone()))
        .unwrap_or_default()
}

/// Empty records are removed rather than stored
pub fn write_record(env: &Env, owner: &Address, record: &PresaleRecord) {
    let key = DataKey::Record(owner.clone());
    if record.claimable == 0 {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, record);
    env.storage()
        .persistent()
        .extend_ttl(&key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
}
