use soroban_sdk::{contracttype, Address, Env};

use crate::error::Error;

// TTL (in ledgers, ~5s each)
pub const DAY_IN_LEDGERS: u32 = 17_280;
pub const INSTANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const INSTANCE_LIFETIME_THRESHOLD: u32 = INSTANCE_BUMP_AMOUNT - DAY_IN_LEDGERS;
pub const RECORD_BUMP_AMOUNT: u32 = 120 * DAY_IN_LEDGERS;
pub const RECORD_LIFETIME_THRESHOLD: u32 = RECORD_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Initialized,
    MaxTokens,      // Upper bound on the running total
    ConversionRate, // Swap rate with 2 decimals (200 = 2.00)
    TotalClaimable, // Running total of all records
    Locked,
    Claimable(Address),
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

pub fn read_max_tokens(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::MaxTokens)
        .unwrap_or(0)
}

pub fn read_rate(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::ConversionRate)
        .unwrap_or(0)
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

pub fn is_locked(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Locked)
        .unwrap_or(false)
}

pub fn read_claimable(env: &Env, owner: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Claimable(owner.clone()))
        .unwrap_or(0)
}

/// Zero balances are removed rather than stored
pub fn write_claimable(env: &Env, owner: &Address, amount: i128) {
    let key = DataKey::Claimable(owner.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, &amount);
    env.storage()
        .persistent()
        .extend_ttl(&key, RECORD_LIFETIME_THRESHOLD, RECORD_BUMP_AMOUNT);
}
