#![no_std]

mod error;
mod events;
mod storage;

pub use error::Error;
use events::*;
use storage::DataKey;

use sale_tiers::{mul_div, MIN_RECORD_AMOUNT, PERCENT_BASE};
use soroban_sdk::{contract, contractimpl, Address, Env, Symbol};

#[contract]
pub struct ContributionLedger;

#[contractimpl]
impl ContributionLedger {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the ledger
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `InvalidMaxTokens`: max_tokens must be positive
    pub fn initialize(env: Env, admin: Address, max_tokens: i128) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }
        if max_tokens <= 0 {
            return Err(Error::InvalidMaxTokens);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::MaxTokens, &max_tokens);
        env.storage().instance().set(&DataKey::TotalClaimable, &0i128);
        env.storage().instance().set(&DataKey::Locked, &false);
        storage::bump_instance(&env);

        Ok(())
    }

    /// Set the swap conversion rate (2 decimals, 200 = 2.00)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `RecordsLocked`: Ledger already locked
    /// - `InvalidConversionRate`: rate must be positive
    pub fn set_conversion_rate(env: Env, rate: i128) -> Result<(), Error> {
        let admin = storage::read_admin(&env)?;
        admin.require_auth();

        Self::check_not_locked(&env)?;
        if rate <= 0 {
            return Err(Error::InvalidConversionRate);
        }

        env.storage().instance().set(&DataKey::ConversionRate, &rate);
        storage::bump_instance(&env);

        env.events()
            .publish((Symbol::new(&env, "rate_set"),), RateSetEvent { rate });

        Ok(())
    }

    // ============================================
    // RECORDS
    // ============================================

    /// Add a converted amount to a holder's record
    ///
    /// Repeated calls for the same holder accumulate.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `RecordsLocked`: Ledger already locked
    /// - `InvalidAmount`: amount below the minimum granularity
    /// - `ConversionRateNotSet`: apply_rate without a rate
    /// - `ExceedsMaxTokens`: running total would pass the maximum
    pub fn record_create(
        env: Env,
        record: Address,
        amount: i128,
        apply_rate: bool,
    ) -> Result<(), Error> {
        let admin = storage::read_admin(&env)?;
        admin.require_auth();

        Self::check_not_locked(&env)?;
        let added = Self::convert(&env, amount, apply_rate)?;

        let total = storage::read_total(&env)
            .checked_add(added)
            .ok_or(Error::ArithmeticOverflow)?;
        if total > storage::read_max_tokens(&env) {
            return Err(Error::ExceedsMaxTokens);
        }

        let claimable = storage::read_claimable(&env, &record)
            .checked_add(added)
            .ok_or(Error::ArithmeticOverflow)?;

        storage::write_claimable(&env, &record, claimable);
        storage::write_total(&env, total);
        storage::bump_instance(&env);

        env.events().publish(
            (Symbol::new(&env, "record_create"), record.clone()),
            RecordCreateEvent {
                record,
                added,
                claimable,
            },
        );

        Ok(())
    }

    /// Replace a holder's record with a newly converted amount
    ///
    /// Unlike `record_create`, the previous balance is discarded.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `RecordsLocked`: Ledger already locked
    /// - `InvalidAmount`: amount below the minimum granularity
    /// - `ConversionRateNotSet`: apply_rate without a rate
    /// - `ExceedsMaxTokens`: running total would pass the maximum
    pub fn record_update(
        env: Env,
        record: Address,
        amount: i128,
        apply_rate: bool,
    ) -> Result<(), Error> {
        let admin = storage::read_admin(&env)?;
        admin.require_auth();

        Self::check_not_locked(&env)?;
        let claimable = Self::convert(&env, amount, apply_rate)?;
        let previous = storage::read_claimable(&env, &record);

        let total = storage::read_total(&env)
            .checked_sub(previous)
            .and_then(|t| t.checked_add(claimable))
            .ok_or(Error::ArithmeticOverflow)?;
        if total > storage::read_max_tokens(&env) {
            return Err(Error::ExceedsMaxTokens);
        }

        storage::write_claimable(&env, &record, claimable);
        storage::write_total(&env, total);
        storage::bump_instance(&env);

        env.events().publish(
            (Symbol::new(&env, "record_update"), record.clone()),
            RecordUpdateEvent {
                record,
                previous,
                claimable,
            },
        );

        Ok(())
    }

    /// Move a whole record to an address that holds nothing
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `RecordsLocked`: Ledger already locked
    /// - `EmptyRecord`: `from` has no balance
    /// - `RecordExists`: `to` already has a balance
    pub fn record_move(env: Env, from: Address, to: Address) -> Result<(), Error> {
        let admin = storage::read_admin(&env)?;
        admin.require_auth();

        Self::check_not_locked(&env)?;

        let amount = storage::read_claimable(&env, &from);
        if amount == 0 {
            return Err(Error::EmptyRecord);
        }
        if storage::read_claimable(&env, &to) != 0 {
            return Err(Error::RecordExists);
        }

        storage::write_claimable(&env, &from, 0);
        storage::write_claimable(&env, &to, amount);
        storage::bump_instance(&env);

        env.events().publish(
            (Symbol::new(&env, "record_move"), from.clone(), to.clone()),
            RecordMoveEvent { from, to, amount },
        );

        Ok(())
    }

    /// Freeze the ledger permanently
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `RecordsLocked`: Ledger already locked
    pub fn lock(env: Env) -> Result<(), Error> {
        let admin = storage::read_admin(&env)?;
        admin.require_auth();

        Self::check_not_locked(&env)?;

        env.storage().instance().set(&DataKey::Locked, &true);
        storage::bump_instance(&env);

        env.events().publish(
            (Symbol::new(&env, "lock"),),
            LockEvent {
                total_claimable: storage::read_total(&env),
            },
        );

        Ok(())
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn claimable(env: Env, record: Address) -> i128 {
        storage::read_claimable(&env, &record)
    }

    pub fn total_claimable(env: Env) -> i128 {
        storage::read_total(&env)
    }

    pub fn conversion_rate(env: Env) -> i128 {
        storage::read_rate(&env)
    }

    pub fn max_tokens(env: Env) -> i128 {
        storage::read_max_tokens(&env)
    }

    pub fn is_locked(env: Env) -> bool {
        storage::is_locked(&env)
    }

    pub fn admin(env: Env) -> Result<Address, Error> {
        storage::read_admin(&env)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn check_not_locked(env: &Env) -> Result<(), Error> {
        if storage::is_locked(env) {
            return Err(Error::RecordsLocked);
        }
        Ok(())
    }

    /// Validate a raw amount and apply the swap rate if requested
    fn convert(env: &Env, amount: i128, apply_rate: bool) -> Result<i128, Error> {
        if amount < MIN_RECORD_AMOUNT {
            return Err(Error::InvalidAmount);
        }
        if !apply_rate {
            return Ok(amount);
        }

        let rate = storage::read_rate(env);
        if rate == 0 {
            return Err(Error::ConversionRateNotSet);
        }
        mul_div(env, amount, rate, PERCENT_BASE).ok_or(Error::ArithmeticOverflow)
    }
}
