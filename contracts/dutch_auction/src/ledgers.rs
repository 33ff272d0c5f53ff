//! Read-only calls into the contribution and presale ledgers.

use soroban_sdk::{vec, Address, Env, IntoVal, Symbol, Vec};

// Presale ledger stage values
pub const PRESALE_SETUP: u32 = 1;
pub const PRESALE_LOCKED: u32 = 2;

pub fn contribution_total(env: &Env, ledger: &Address) -> i128 {
    env.invoke_contract::<i128>(ledger, &Symbol::new(env, "total_claimable"), Vec::new(env))
}

pub fn contribution_locked(env: &Env, ledger: &Address) -> bool {
    env.invoke_contract::<bool>(ledger, &Symbol::new(env, "is_locked"), Vec::new(env))
}

pub fn contribution_claimable(env: &Env, ledger: &Address, owner: &Address) -> i128 {
    env.invoke_contract::<i128>(
        ledger,
        &Symbol::new(env, "claimable"),
        vec![env, owner.into_val(env)],
    )
}

pub fn presale_stage(env: &Env, ledger: &Address) -> u32 {
    env.invoke_contract::<u32>(ledger, &Symbol::new(env, "get_stage"), Vec::new(env))
}

/// Presale cap, not the amount sold so far
pub fn presale_capacity(env: &Env, ledger: &Address) -> i128 {
    env.invoke_contract::<i128>(
        ledger,
        &Symbol::new(env, "total_presale_tokens"),
        Vec::new(env),
    )
}

pub fn presale_claimable(env: &Env, ledger: &Address, owner: &Address) -> i128 {
    env.invoke_contract::<i128>(
        ledger,
        &Symbol::new(env, "claimable"),
        vec![env, owner.into_val(env)],
    )
}
