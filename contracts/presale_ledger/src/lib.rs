#![no_std]

mod error;
mod events;
mod storage;

pub use error::Error;
use events::*;
pub use storage::{PresaleRecord, PresaleStage};
use storage::DataKey;

use sale_tiers::{bonus_amount, build_tiers, BonusTier, MIN_RECORD_AMOUNT};
use soroban_sdk::{contract, contractimpl, Address, Env, Symbol, Vec};

#[contract]
pub struct PresaleLedger;

#[contractimpl]
impl PresaleLedger {
    // ============================================
    // INITIALIZATION & SETUP
    // ============================================

    /// Initialize the ledger in the Deployed stage
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(env: Env, admin: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        storage::write_stage(&env, PresaleStage::Deployed);
        storage::write_total(&env, 0);
        storage::bump_instance(&env);

        Ok(())
    }

    /// Configure the presale cap and bonus schedule, Deployed -> Setup
    ///
    /// `thresholds` are token amounts, `percents` the bonus granted from
    /// each threshold upwards.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidStage`: Setup already done
    /// - `InvalidMaxTokens`: max_tokens must be positive
    /// - `TierLengthMismatch` / `EmptyTierTable` / `InvalidTierThreshold` /
    ///   `TiersNotAscending`: malformed tier arrays
    pub fn setup(
        env: Env,
        max_tokens: i128,
        thresholds: Vec<i128>,
        percents: Vec<u32>,
    ) -> Result<(), Error> {
        let admin = storage::read_admin(&env)?;
        admin.require_auth();

        Self::check_stage(&env, PresaleStage::Deployed)?;
        if max_tokens <= 0 {
            return Err(Error::InvalidMaxTokens);
        }
        let tiers = build_tiers(&env, &thresholds, &percents)?;

        env.storage().instance().set(&DataKey::MaxTokens, &max_tokens);
        env.storage().instance().set(&DataKey::Tiers, &tiers);
        storage::write_stage(&env, PresaleStage::Setup);
        storage::bump_instance(&env);

        env.events().publish(
            (Symbol::new(&env, "presale_setup"),),
            PresaleSetupEvent { max_tokens, tiers },
        );

        Ok(())
    }

    // ============================================
    // RECORDS
    // ============================================

    /// Add presale tokens to a buyer's record
    ///
    /// The bonus is recomputed from the buyer's new total base, so crossing
    /// a threshold re-prices everything bought so far.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidStage`: Not in Setup
    /// - `InvalidAmount`: amount below the minimum granularity
    /// - `ExceedsMaxTokens`: claimable total would pass the presale cap
    pub fn record_create(env: Env, record: Address, amount: i128) -> Result<(), Error> {
        let admin = storage::read_admin(&env)?;
        admin.require_auth();

        Self::check_stage(&env, PresaleStage::Setup)?;
        if amount < MIN_RECORD_AMOUNT {
            return Err(Error::InvalidAmount);
        }

        let previous = storage::read_record(&env, &record);
        let base = previous
            .base
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        let updated = Self::write_base(&env, &record, &previous, base)?;

        env.events().publish(
            (Symbol::new(&env, "record_create"), record.clone()),
            RecordCreateEvent {
                record,
                added: amount,
                base: updated.base,
                bonus: updated.bonus,
            },
        );

        Ok(())
    }

    /// Replace a buyer's base amount and re-derive the bonus
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidStage`: Not in Setup
    /// - `InvalidAmount`: amount below the minimum granularity
    /// - `ExceedsMaxTokens`: claimable total would pass the presale cap
    pub fn record_update(env: Env, record: Address, base: i128) -> Result<(), Error> {
        let admin = storage::read_admin(&env)?;
        admin.require_auth();

        Self::check_stage(&env, PresaleStage::Setup)?;
        if base < MIN_RECORD_AMOUNT {
            return Err(Error::InvalidAmount);
        }

        let previous = storage::read_record(&env, &record);
        let updated = Self::write_base(&env, &record, &previous, base)?;

        env.events().publish(
            (Symbol::new(&env, "record_update"), record.clone()),
            RecordUpdateEvent {
                record,
                base: updated.base,
                bonus: updated.bonus,
            },
        );

        Ok(())
    }

    /// Move a whole record to an address that holds nothing
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidStage`: Not in Setup
    /// - `EmptyRecord`: `from` has no balance
    /// - `RecordExists`: `to` already has a balance
    pub fn record_move(env: Env, from: Address, to: Address) -> Result<(), Error> {
        let admin = storage::read_admin(&env)?;
        admin.require_auth();

        Self::check_stage(&env, PresaleStage::Setup)?;

        let moved = storage::read_record(&env, &from);
        if moved.claimable == 0 {
            return Err(Error::EmptyRecord);
        }
        if storage::read_record(&env, &to).claimable != 0 {
            return Err(Error::RecordExists);
        }

        storage::write_record(&env, &from, &PresaleRecord::default());
        storage::write_record(&env, &to, &moved);
        storage::bump_instance(&env);

        env.events().publish(
            (Symbol::new(&env, "record_move"), from.clone(), to.clone()),
            RecordMoveEvent {
                from,
                to,
                claimable: moved.claimable,
            },
        );

        Ok(())
    }

    /// Freeze all records, Setup -> Locked
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidStage`: Not in Setup (including a second lock)
    pub fn lock(env: Env) -> Result<(), Error> {
        let admin = storage::read_admin(&env)?;
        admin.require_auth();

        Self::check_stage(&env, PresaleStage::Setup)?;

        storage::write_stage(&env, PresaleStage::Locked);
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

    pub fn get_stage(env: Env) -> PresaleStage {
        storage::read_stage(&env)
    }

    pub fn is_locked(env: Env) -> bool {
        storage::read_stage(&env) == PresaleStage::Locked
    }

    pub fn get_record(env: Env, record: Address) -> PresaleRecord {
        storage::read_record(&env, &record)
    }

    pub fn presale_tokens(env: Env, record: Address) -> i128 {
        storage::read_record(&env, &record).base
    }

    pub fn bonus_tokens(env: Env, record: Address) -> i128 {
        storage::read_record(&env, &record).bonus
    }

    pub fn claimable(env: Env, record: Address) -> i128 {
        storage::read_record(&env, &record).claimable
    }

    pub fn total_claimable(env: Env) -> i128 {
        storage::read_total(&env)
    }

    /// Configured presale cap; the allocation reserved for this ledger
    pub fn total_presale_tokens(env: Env) -> i128 {
        storage::read_max_tokens(&env)
    }

    pub fn get_tiers(env: Env) -> Vec<BonusTier> {
        storage::read_tiers(&env)
    }

    /// Bonus the current schedule grants on a total base of `amount`
    pub fn calculate_bonus(env: Env, amount: i128) -> Result<i128, Error> {
        bonus_amount(&env, &storage::read_tiers(&env), amount).ok_or(Error::ArithmeticOverflow)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn check_stage(env: &Env, expected: PresaleStage) -> Result<(), Error> {
        if storage::read_stage(env) != expected {
            return Err(Error::InvalidStage);
        }
        Ok(())
    }

    /// Re-derive bonus and claimable from `base`, enforce the cap and persist
    fn write_base(
        env: &Env,
        owner: &Address,
        previous: &PresaleRecord,
        base: i128,
    ) -> Result<PresaleRecord, Error> {
        let tiers = storage::read_tiers(env);
        let bonus = bonus_amount(env, &tiers, base).ok_or(Error::ArithmeticOverflow)?;
        let claimable = base.checked_add(bonus).ok_or(Error::ArithmeticOverflow)?;

        let total = storage::read_total(env)
            .checked_sub(previous.claimable)
            .and_then(|t| t.checked_add(claimable))
            .ok_or(Error::ArithmeticOverflow)?;
        if total > storage::read_max_tokens(env) {
            return Err(Error::ExceedsMaxTokens);
        }

        let record = PresaleRecord {
            base,
            bonus,
            claimable,
        };
        storage::write_record(env, owner, &record);
        storage::write_total(env, total);
        storage::bump_instance(env);

        Ok(record)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sale_tiers::TOKEN_UNIT;
    use soroban_sdk::{testutils::Address as _, vec, Address, Env};

    const MAX_PRESALE_TOKENS: i128 = 200_000_000 * TOKEN_UNIT;

    // Token thresholds for $99 .. $1M at 0.33 USD per token
    fn thresholds(env: &Env) -> Vec<i128> {
        vec![
            env,
            300_000_000_000_000_000_000,
            454_545_454_545_454_560_000,
            1_060_606_060_606_060_500_000,
            1_515_151_515_151_515_200_000,
            3_030_303_030_303_030_500_000,
            30_303_030_303_030_304_000_000,
            75_757_575_757_575_760_000_000,
            151_515_151_515_151_520_000_000,
            303_030_303_030_303_040_000_000,
            757_575_757_575_757_600_000_000,
            3_030_303_030_303_030_300_000_000,
        ]
    }

    fn percents(env: &Env) -> Vec<u32> {
        vec![env, 1u32, 2, 3, 4, 5, 10, 15, 20, 25, 30, 32]
    }

    fn deploy() -> (Env, PresaleLedgerClient<'static>) {
        let env = Env::default();
        env.mock_all_auths();

        let contract_id = env.register_contract(None, PresaleLedger);
        let client = PresaleLedgerClient::new(&env, &contract_id);

        let admin = Address::generate(&env);
        client.initialize(&admin);

        (env, client)
    }

    fn deploy_with_setup() -> (Env, PresaleLedgerClient<'static>) {
        let (env, client) = deploy();
        client.setup(&MAX_PRESALE_TOKENS, &thresholds(&env), &percents(&env));
        (env, client)
    }

    #[test]
    fn test_rejects_records_before_setup() {
        let (env, client) = deploy();
        let buyer = Address::generate(&env);

        assert_eq!(client.get_stage(), PresaleStage::Deployed);
        let result = client.try_record_create(&buyer, &(300 * TOKEN_UNIT));
        assert_eq!(result, Err(Ok(Error::InvalidStage)));
    }

    #[test]
    fn test_setup() {
        let (env, client) = deploy_with_setup();

        assert_eq!(client.get_stage(), PresaleStage::Setup);
        assert_eq!(client.total_presale_tokens(), MAX_PRESALE_TOKENS);
        assert_eq!(client.get_tiers().len(), 11);

        let again = client.try_setup(&MAX_PRESALE_TOKENS, &thresholds(&env), &percents(&env));
        assert_eq!(again, Err(Ok(Error::InvalidStage)));
    }

    #[test]
    fn test_setup_rejects_malformed_tiers() {
        let (env, client) = deploy();

        let short = vec![&env, 1u32, 2];
        assert_eq!(
            client.try_setup(&MAX_PRESALE_TOKENS, &thresholds(&env), &short),
            Err(Ok(Error::TierLengthMismatch))
        );

        let unsorted = vec![&env, 10i128, 10];
        assert_eq!(
            client.try_setup(&MAX_PRESALE_TOKENS, &unsorted, &short),
            Err(Ok(Error::TiersNotAscending))
        );

        assert_eq!(
            client.try_setup(&0, &thresholds(&env), &percents(&env)),
            Err(Ok(Error::InvalidMaxTokens))
        );

        assert_eq!(client.get_stage(), PresaleStage::Deployed);
    }

    #[test]
    fn test_create_first_tier_bonus() {
        let (env, client) = deploy_with_setup();
        let buyer = Address::generate(&env);
        let t0 = thresholds(&env).get(0).unwrap();

        client.record_create(&buyer, &t0);

        let bonus = t0 / 100;
        assert_eq!(client.presale_tokens(&buyer), t0);
        assert_eq!(client.bonus_tokens(&buyer), bonus);
        assert_eq!(client.claimable(&buyer), t0 + bonus);
        assert_eq!(client.claimable(&buyer), t0 * 101 / 100);
        assert_eq!(client.total_claimable(), t0 + bonus);
    }

    #[test]
    fn test_create_recomputes_bonus_on_total() {
        let (env, client) = deploy_with_setup();
        let buyer = Address::generate(&env);
        let t0 = thresholds(&env).get(0).unwrap();

        client.record_create(&buyer, &t0);
        client.record_create(&buyer, &t0);

        // 2 × T0 crosses T1, so the whole base earns 2% rather than 1% + 1%
        let bonus = 2 * t0 * 2 / 100;
        assert_eq!(client.presale_tokens(&buyer), 2 * t0);
        assert_eq!(client.bonus_tokens(&buyer), bonus);
        assert_eq!(client.claimable(&buyer), 2 * t0 + bonus);
        assert_eq!(client.total_claimable(), 2 * t0 + bonus);
    }

    #[test]
    fn test_create_rejects_dust_and_over_cap() {
        let (env, client) = deploy_with_setup();
        let buyer = Address::generate(&env);

        assert_eq!(
            client.try_record_create(&buyer, &100),
            Err(Ok(Error::InvalidAmount))
        );

        // The cap applies to base + bonus
        assert_eq!(
            client.try_record_create(&buyer, &MAX_PRESALE_TOKENS),
            Err(Ok(Error::ExceedsMaxTokens))
        );
        assert_eq!(client.total_claimable(), 0);
    }

    #[test]
    fn test_update_replaces_base() {
        let (env, client) = deploy_with_setup();
        let buyer = Address::generate(&env);
        let t0 = thresholds(&env).get(0).unwrap();
        let t1 = thresholds(&env).get(1).unwrap();

        client.record_create(&buyer, &t0);
        client.record_create(&buyer, &t0);
        client.record_update(&buyer, &t1);

        let bonus = t1 * 2 / 100;
        assert_eq!(client.presale_tokens(&buyer), t1);
        assert_eq!(client.bonus_tokens(&buyer), bonus);
        assert_eq!(client.claimable(&buyer), t1 + bonus);
        assert_eq!(client.total_claimable(), t1 + bonus);

        // Dropping below T0 removes the bonus entirely
        client.record_update(&buyer, &(200 * TOKEN_UNIT));
        assert_eq!(client.bonus_tokens(&buyer), 0);
        assert_eq!(client.total_claimable(), 200 * TOKEN_UNIT);
    }

    #[test]
    fn test_move() {
        let (env, client) = deploy_with_setup();
        let buyer1 = Address::generate(&env);
        let buyer2 = Address::generate(&env);
        let buyer3 = Address::generate(&env);
        let t0 = thresholds(&env).get(0).unwrap();
        let t5 = thresholds(&env).get(5).unwrap();

        client.record_create(&buyer1, &t0);
        client.record_create(&buyer2, &t5);
        let moved = client.get_record(&buyer2);
        let total = client.total_claimable();

        assert_eq!(moved.bonus, t5 * 10 / 100);

        client.record_move(&buyer2, &buyer3);
        assert_eq!(client.get_record(&buyer3), moved);
        assert_eq!(client.get_record(&buyer2), PresaleRecord::default());
        assert_eq!(client.total_claimable(), total);

        assert_eq!(
            client.try_record_move(&buyer2, &buyer3),
            Err(Ok(Error::EmptyRecord))
        );
        assert_eq!(
            client.try_record_move(&buyer1, &buyer3),
            Err(Ok(Error::RecordExists))
        );
    }

    #[test]
    fn test_below_first_threshold_has_no_bonus() {
        let (env, client) = deploy_with_setup();
        let buyer = Address::generate(&env);

        client.record_create(&buyer, &(200 * TOKEN_UNIT));
        assert_eq!(client.bonus_tokens(&buyer), 0);
        assert_eq!(client.claimable(&buyer), 200 * TOKEN_UNIT);
        assert_eq!(client.calculate_bonus(&(200 * TOKEN_UNIT)), 0);
    }

    #[test]
    fn test_lock_blocks_mutation() {
        let (env, client) = deploy_with_setup();
        let buyer1 = Address::generate(&env);
        let buyer2 = Address::generate(&env);
        let t0 = thresholds(&env).get(0).unwrap();

        client.record_create(&buyer1, &t0);
        client.lock();
        assert_eq!(client.get_stage(), PresaleStage::Locked);
        assert!(client.is_locked());

        assert_eq!(
            client.try_record_create(&buyer2, &t0),
            Err(Ok(Error::InvalidStage))
        );
        assert_eq!(
            client.try_record_update(&buyer1, &t0),
            Err(Ok(Error::InvalidStage))
        );
        assert_eq!(
            client.try_record_move(&buyer1, &buyer2),
            Err(Ok(Error::InvalidStage))
        );
        assert_eq!(client.try_lock(), Err(Ok(Error::InvalidStage)));

        assert_eq!(client.get_stage(), PresaleStage::Locked);
        assert_eq!(client.claimable(&buyer1), t0 + t0 / 100);
    }

    #[test]
    #[should_panic]
    fn test_records_require_admin() {
        let (env, client) = deploy_with_setup();
        let buyer = Address::generate(&env);
        env.set_auths(&[]);

        client.record_create(&buyer, &(300 * TOKEN_UNIT));
    }
}
