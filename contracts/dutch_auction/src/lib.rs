#![no_std]

mod error;
mod events;
mod ledgers;
mod payout;
mod pricing;
mod storage;

pub use error::Error;
use events::*;
use payout::Payout;
use pricing::{
    calculate_bid_bonus, calculate_price_constant, calculate_tokens, cents_to_wei,
    max_auction_payout,
};
pub use storage::{AuctionConfig, AuctionStage, AuctionState, Bid, PriceCurve};
use storage::DataKey;

use sale_tiers::{build_tiers, max_percent};
use soroban_sdk::{contract, contractimpl, log, token, Address, Env, Symbol, Vec};

#[contract]
pub struct DutchAuction;

#[contractimpl]
impl DutchAuction {
    // ============================================
    // INITIALIZATION & SETTINGS
    // ============================================

    /// Initialize the auction in the Deployed stage
    ///
    /// `token` is the sale token paid out on claims, `payment_token` the
    /// token bids are paid in. Block counts are ledger sequence numbers.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `InvalidPeriod`: bidding period and audit wait must be positive
    pub fn initialize(
        env: Env,
        admin: Address,
        token: Address,
        payment_token: Address,
        contribution_ledger: Address,
        presale_ledger: Address,
        bidding_period_blocks: u32,
        audit_wait_blocks: u32,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        if bidding_period_blocks == 0 || audit_wait_blocks == 0 {
            return Err(Error::InvalidPeriod);
        }

        let instance = env.storage().instance();
        instance.set(&DataKey::Initialized, &true);
        instance.set(&DataKey::Admin, &admin);
        instance.set(&DataKey::SaleToken, &token);
        instance.set(&DataKey::PaymentToken, &payment_token);
        instance.set(&DataKey::ContributionLedger, &contribution_ledger);
        instance.set(&DataKey::PresaleLedger, &presale_ledger);
        instance.set(&DataKey::BiddingPeriod, &bidding_period_blocks);
        instance.set(&DataKey::AuditWait, &audit_wait_blocks);
        storage::bump_instance(&env);

        Ok(())
    }

    /// Configure the sale, Deployed/Setup -> Setup
    ///
    /// Prices and the hard cap are given in USD cents and stored in wei at
    /// `ether_price_cents`. Tier thresholds are USD cents of a single bid.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidStage`: Auction already started
    /// - `InvalidMaxTokens`: max_tokens must be positive
    /// - `InvalidEtherPrice` / `InvalidHardCap` / `InvalidPriceRange`: bad settings
    /// - `TierLengthMismatch` / `EmptyTierTable` / `InvalidTierThreshold` /
    ///   `TiersNotAscending`: malformed tier arrays
    /// - `ExceedsTokenAllocation`: worst-case payout is more than max_tokens
    pub fn setup(
        env: Env,
        max_tokens: i128,
        ether_price_cents: i128,
        hard_cap_cents: i128,
        ceiling_cents: i128,
        floor_cents: i128,
        tier_thresholds: Vec<i128>,
        tier_percents: Vec<u32>,
    ) -> Result<(), Error> {
        Self::read_admin(&env)?.require_auth();

        let state = storage::read_state(&env);
        if state.stage > AuctionStage::Setup {
            return Err(Error::InvalidStage);
        }
        if max_tokens <= 0 {
            return Err(Error::InvalidMaxTokens);
        }

        let config = Self::build_config(
            &env,
            max_tokens,
            ether_price_cents,
            hard_cap_cents,
            ceiling_cents,
            floor_cents,
            &tier_thresholds,
            &tier_percents,
        )?;
        Self::apply_config(&env, state, config)
    }

    /// Retune prices, cap and tiers before the start; max_tokens is kept
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidStage`: Not in Setup
    /// - Same validation errors as `setup`
    pub fn change_settings(
        env: Env,
        ether_price_cents: i128,
        hard_cap_cents: i128,
        ceiling_cents: i128,
        floor_cents: i128,
        tier_thresholds: Vec<i128>,
        tier_percents: Vec<u32>,
    ) -> Result<(), Error> {
        Self::read_admin(&env)?.require_auth();

        let state = storage::read_state(&env);
        if state.stage != AuctionStage::Setup {
            return Err(Error::InvalidStage);
        }
        let current = storage::read_config(&env)?;

        let config = Self::build_config(
            &env,
            current.max_tokens,
            ether_price_cents,
            hard_cap_cents,
            ceiling_cents,
            floor_cents,
            &tier_thresholds,
            &tier_percents,
        )?;
        Self::apply_config(&env, state, config)
    }

    // ============================================
    // WHITELIST
    // ============================================

    /// Whitelist participants; already listed addresses are skipped
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidStage`: Claims already open
    pub fn add_to_whitelist(env: Env, participants: Vec<Address>) -> Result<(), Error> {
        Self::read_admin(&env)?.require_auth();

        let mut state = storage::read_state(&env);
        if state.stage >= AuctionStage::ClaimOpen {
            return Err(Error::InvalidStage);
        }

        for participant in participants.iter() {
            if storage::is_whitelisted(&env, &participant) {
                continue;
            }
            storage::set_whitelisted(&env, &participant, true);
            state.participants = state
                .participants
                .checked_add(1)
                .ok_or(Error::ArithmeticOverflow)?;

            env.events().publish(
                (Symbol::new(&env, "whitelist_add"), participant.clone()),
                WhitelistEvent {
                    participant,
                    participants: state.participants,
                },
            );
        }

        storage::write_state(&env, &state);
        Ok(())
    }

    /// Remove participants; unknown addresses are skipped
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidStage`: Claims already open
    pub fn remove_from_whitelist(env: Env, participants: Vec<Address>) -> Result<(), Error> {
        Self::read_admin(&env)?.require_auth();

        let mut state = storage::read_state(&env);
        if state.stage >= AuctionStage::ClaimOpen {
            return Err(Error::InvalidStage);
        }

        for participant in participants.iter() {
            if !storage::is_whitelisted(&env, &participant) {
                continue;
            }
            storage::set_whitelisted(&env, &participant, false);
            state.participants = state.participants.saturating_sub(1);

            env.events().publish(
                (Symbol::new(&env, "whitelist_remove"), participant.clone()),
                WhitelistEvent {
                    participant,
                    participants: state.participants,
                },
            );
        }

        storage::write_state(&env, &state);
        Ok(())
    }

    // ============================================
    // BIDDING
    // ============================================

    /// Open bidding, Setup -> Started
    ///
    /// Both ledgers must be frozen (presale at least set up) and this
    /// contract must already hold enough sale tokens for every claim.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidStage`: Not in Setup
    /// - `PresaleNotReady`: Presale ledger still in Deployed
    /// - `ContributionLedgerNotLocked`: Contribution records still mutable
    /// - `AllocationShortfall`: Sale token balance below max_total_claim
    pub fn start_auction(env: Env) -> Result<(), Error> {
        Self::read_admin(&env)?.require_auth();

        let mut state = storage::read_state(&env);
        if state.stage != AuctionStage::Setup {
            return Err(Error::InvalidStage);
        }

        let presale = storage::read_address(&env, &DataKey::PresaleLedger)?;
        if ledgers::presale_stage(&env, &presale) < ledgers::PRESALE_SETUP {
            return Err(Error::PresaleNotReady);
        }
        let contribution = storage::read_address(&env, &DataKey::ContributionLedger)?;
        if !ledgers::contribution_locked(&env, &contribution) {
            return Err(Error::ContributionLedgerNotLocked);
        }

        let config = storage::read_config(&env)?;
        let max_total_claim = Self::claim_capacity(&env, config.max_tokens)?;
        let sale_token = storage::read_address(&env, &DataKey::SaleToken)?;
        let balance = token::Client::new(&env, &sale_token).balance(&env.current_contract_address());
        if balance < max_total_claim {
            return Err(Error::AllocationShortfall);
        }

        let period = storage::read_period(&env, &DataKey::BiddingPeriod);
        state.start_block = env.ledger().sequence();
        state.end_block = state
            .start_block
            .checked_add(period)
            .ok_or(Error::ArithmeticOverflow)?;
        state.max_total_claim = max_total_claim;
        state.stage = AuctionStage::Started;
        storage::write_state(&env, &state);

        env.events().publish(
            (Symbol::new(&env, "auction_started"),),
            AuctionStartedEvent {
                start_block: state.start_block,
                end_block: state.end_block,
                max_total_claim,
            },
        );

        Ok(())
    }

    /// Bid `amount` of the payment token for `beneficiary`
    ///
    /// The full amount is pulled from `bidder`. Whatever exceeds the
    /// remaining cap is refunded in the same call. Filling the cap, or
    /// bidding in the last block, ends the auction.
    ///
    /// Returns the accepted amount.
    ///
    /// # Errors
    /// - `InvalidAmount`: amount must be positive
    /// - `InvalidStage`: Bidding not open
    /// - `BiddingClosed`: Deadline has passed
    /// - `NotWhitelisted`: Beneficiary not whitelisted
    pub fn bid(
        env: Env,
        bidder: Address,
        beneficiary: Address,
        amount: i128,
    ) -> Result<i128, Error> {
        bidder.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        let mut state = storage::read_state(&env);
        if state.stage != AuctionStage::Started {
            return Err(Error::InvalidStage);
        }
        let now = env.ledger().sequence();
        if now > state.end_block {
            return Err(Error::BiddingClosed);
        }
        if !storage::is_whitelisted(&env, &beneficiary) {
            return Err(Error::NotWhitelisted);
        }
        let config = storage::read_config(&env)?;

        let payment_token = storage::read_address(&env, &DataKey::PaymentToken)?;
        token::Client::new(&env, &payment_token).transfer(
            &bidder,
            &env.current_contract_address(),
            &amount,
        );

        let accepted = amount.min(state.remaining_cap);
        let refunded = amount - accepted;

        let mut bid = storage::read_bid(&env, &beneficiary);
        bid.amount = bid
            .amount
            .checked_add(accepted)
            .ok_or(Error::ArithmeticOverflow)?;
        state.total_received = state
            .total_received
            .checked_add(accepted)
            .ok_or(Error::ArithmeticOverflow)?;
        state.remaining_cap -= accepted;

        if state.remaining_cap == 0 || now >= state.end_block {
            Self::finalize(&env, &config, &mut state, now);
        }

        let committed = storage::commit_bid(&env, &beneficiary, &bid, &state);

        env.events().publish(
            (Symbol::new(&env, "bid"), beneficiary.clone()),
            BidEvent {
                bidder: bidder.clone(),
                beneficiary,
                accepted,
                refunded,
                remaining_cap: state.remaining_cap,
            },
        );

        Payout::new(payment_token, bidder, refunded).send(&env, committed);

        Ok(accepted)
    }

    /// Settle at the floor price once the deadline has passed, Started -> Ended
    ///
    /// Anyone may call this. Returns the final price.
    ///
    /// # Errors
    /// - `InvalidStage`: Bidding not open
    /// - `AuctionStillRunning`: Deadline not reached
    pub fn end_auction(env: Env) -> Result<i128, Error> {
        let mut state = storage::read_state(&env);
        if state.stage != AuctionStage::Started {
            return Err(Error::InvalidStage);
        }
        let now = env.ledger().sequence();
        if now <= state.end_block {
            return Err(Error::AuctionStillRunning);
        }

        let config = storage::read_config(&env)?;
        Self::finalize(&env, &config, &mut state, now);
        storage::write_state(&env, &state);

        Ok(state.final_price)
    }

    // ============================================
    // CLAIMS & RECOVERY
    // ============================================

    /// Open the claim window, Ended -> ClaimOpen
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `AuctionNotEnded`: Auction not settled
    /// - `InvalidStage`: Claims already open
    /// - `PresaleNotLocked`: Presale records still mutable
    pub fn open_claims(env: Env) -> Result<(), Error> {
        Self::read_admin(&env)?.require_auth();

        let mut state = storage::read_state(&env);
        if state.stage < AuctionStage::Ended {
            return Err(Error::AuctionNotEnded);
        }
        if state.stage == AuctionStage::ClaimOpen {
            return Err(Error::InvalidStage);
        }
        Self::check_presale_locked(&env)?;

        Self::open_claim_window(&env, &mut state);
        storage::write_state(&env, &state);

        Ok(())
    }

    /// Claim auction tokens, bid bonus and frozen ledger balances in one go
    ///
    /// Returns the number of sale token base units sent.
    ///
    /// # Errors
    /// - `AuctionNotEnded`: Auction not settled
    /// - `PresaleNotLocked`: Presale records still mutable
    /// - `AlreadyClaimed`: Claimant already claimed
    /// - `NothingToClaim`: No bid and no ledger balance
    /// - `ExceedsTokenAllocation`: Payout would pass max_total_claim
    pub fn claim_tokens(env: Env, claimant: Address) -> Result<i128, Error> {
        claimant.require_auth();

        let mut state = storage::read_state(&env);
        if state.stage < AuctionStage::Ended {
            return Err(Error::AuctionNotEnded);
        }
        Self::check_presale_locked(&env)?;

        let mut bid = storage::read_bid(&env, &claimant);
        if bid.claimed {
            return Err(Error::AlreadyClaimed);
        }

        let config = storage::read_config(&env)?;
        let (auction_tokens, bonus_tokens) = Self::auction_share(&env, &config, &state, bid.amount)?;
        let ledger_tokens = Self::ledger_balance(&env, &claimant)?;

        let payout = auction_tokens
            .checked_add(bonus_tokens)
            .and_then(|v| v.checked_add(ledger_tokens))
            .ok_or(Error::ArithmeticOverflow)?;
        if payout == 0 {
            return Err(Error::NothingToClaim);
        }

        let distributed = state
            .tokens_distributed
            .checked_add(payout)
            .ok_or(Error::ArithmeticOverflow)?;
        if distributed > state.max_total_claim {
            return Err(Error::ExceedsTokenAllocation);
        }

        bid.claimed = true;
        bid.claimed_funds = bid.amount;
        state.funds_claimed = state
            .funds_claimed
            .checked_add(bid.amount)
            .ok_or(Error::ArithmeticOverflow)?;
        state.tokens_distributed = distributed;
        if state.stage == AuctionStage::Ended {
            Self::open_claim_window(&env, &mut state);
        }

        let committed = storage::commit_bid(&env, &claimant, &bid, &state);

        log!(&env, "claim", auction_tokens, bonus_tokens, ledger_tokens);
        env.events().publish(
            (Symbol::new(&env, "tokens_claimed"), claimant.clone()),
            TokensClaimedEvent {
                claimant: claimant.clone(),
                funds: bid.amount,
                auction_tokens,
                bonus_tokens,
                ledger_tokens,
            },
        );

        let sale_token = storage::read_address(&env, &DataKey::SaleToken)?;
        Payout::new(sale_token, claimant, payout).send(&env, committed);

        Ok(payout)
    }

    /// Sweep this contract's whole balance of `token` to the admin
    ///
    /// Only once claims are open and the audit wait after the end block
    /// has elapsed. Returns the amount swept.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `ClaimsNotOpen`: Claim window not open
    /// - `AuditWindowActive`: Audit wait not over
    pub fn recover_tokens(env: Env, token: Address) -> Result<i128, Error> {
        let admin = Self::read_admin(&env)?;
        admin.require_auth();

        let state = storage::read_state(&env);
        if state.stage != AuctionStage::ClaimOpen {
            return Err(Error::ClaimsNotOpen);
        }
        let audit_wait = storage::read_period(&env, &DataKey::AuditWait);
        let unlock_block = state
            .end_block
            .checked_add(audit_wait)
            .ok_or(Error::ArithmeticOverflow)?;
        if env.ledger().sequence() < unlock_block {
            return Err(Error::AuditWindowActive);
        }

        let amount = token::Client::new(&env, &token).balance(&env.current_contract_address());
        let recovered = storage::read_recovered(&env, &token)
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        let committed = storage::commit_recovery(&env, &token, recovered);

        log!(&env, "recover", amount);
        env.events().publish(
            (Symbol::new(&env, "tokens_recovered"), token.clone()),
            TokensRecoveredEvent {
                token: token.clone(),
                to: admin.clone(),
                amount,
            },
        );

        Payout::new(token, admin, amount).send(&env, committed);

        Ok(amount)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    /// Price per whole token after `elapsed_blocks` of bidding
    pub fn calc_token_price(env: Env, elapsed_blocks: u32) -> Result<i128, Error> {
        let config = storage::read_config(&env)?;
        Ok(config.curve.price_at(&env, elapsed_blocks))
    }

    /// Ceiling before the start, the live curve while bidding, then the final price
    pub fn current_price(env: Env) -> Result<i128, Error> {
        let config = storage::read_config(&env)?;
        let state = storage::read_state(&env);
        let price = match state.stage {
            AuctionStage::Deployed | AuctionStage::Setup => config.curve.ceiling_wei,
            AuctionStage::Started => {
                let elapsed = env.ledger().sequence().saturating_sub(state.start_block);
                config.curve.price_at(&env, elapsed)
            }
            AuctionStage::Ended | AuctionStage::ClaimOpen => state.final_price,
        };
        Ok(price)
    }

    /// Tokens `claimant` would receive from `claim_tokens` right now
    pub fn claimable_tokens(env: Env, claimant: Address) -> Result<i128, Error> {
        let bid = storage::read_bid(&env, &claimant);
        if bid.claimed {
            return Ok(0);
        }
        let config = storage::read_config(&env)?;
        let state = storage::read_state(&env);
        let (auction_tokens, bonus_tokens) = Self::auction_share(&env, &config, &state, bid.amount)?;
        let ledger_tokens = Self::ledger_balance(&env, &claimant)?;

        auction_tokens
            .checked_add(bonus_tokens)
            .and_then(|v| v.checked_add(ledger_tokens))
            .ok_or(Error::ArithmeticOverflow)
    }

    pub fn get_stage(env: Env) -> AuctionStage {
        storage::read_state(&env).stage
    }

    pub fn get_config(env: Env) -> Result<AuctionConfig, Error> {
        storage::read_config(&env)
    }

    pub fn get_state(env: Env) -> AuctionState {
        storage::read_state(&env)
    }

    pub fn ether_price(env: Env) -> Result<i128, Error> {
        Ok(storage::read_config(&env)?.ether_price_cents)
    }

    /// Hard cap in wei
    pub fn hard_cap(env: Env) -> Result<i128, Error> {
        Ok(storage::read_config(&env)?.hard_cap_wei)
    }

    pub fn ceiling(env: Env) -> Result<i128, Error> {
        Ok(storage::read_config(&env)?.curve.ceiling_wei)
    }

    pub fn floor(env: Env) -> Result<i128, Error> {
        Ok(storage::read_config(&env)?.curve.floor_wei)
    }

    pub fn price_constant(env: Env) -> Result<i128, Error> {
        Ok(storage::read_config(&env)?.curve.price_constant)
    }

    pub fn start_block(env: Env) -> u32 {
        storage::read_state(&env).start_block
    }

    pub fn end_block(env: Env) -> u32 {
        storage::read_state(&env).end_block
    }

    pub fn total_received(env: Env) -> i128 {
        storage::read_state(&env).total_received
    }

    pub fn remaining_cap(env: Env) -> i128 {
        storage::read_state(&env).remaining_cap
    }

    pub fn final_price(env: Env) -> i128 {
        storage::read_state(&env).final_price
    }

    pub fn bid_of(env: Env, bidder: Address) -> Bid {
        storage::read_bid(&env, &bidder)
    }

    pub fn is_whitelisted(env: Env, participant: Address) -> bool {
        storage::is_whitelisted(&env, &participant)
    }

    pub fn participants(env: Env) -> u32 {
        storage::read_state(&env).participants
    }

    pub fn claimed_status(env: Env, claimant: Address) -> bool {
        storage::read_bid(&env, &claimant).claimed
    }

    pub fn funds_claimed(env: Env) -> i128 {
        storage::read_state(&env).funds_claimed
    }

    pub fn max_total_claim(env: Env) -> i128 {
        storage::read_state(&env).max_total_claim
    }

    pub fn tokens_distributed(env: Env) -> i128 {
        storage::read_state(&env).tokens_distributed
    }

    /// Total of `token` swept to the admin so far
    pub fn recovered(env: Env, token: Address) -> i128 {
        storage::read_recovered(&env, &token)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn read_admin(env: &Env) -> Result<Address, Error> {
        storage::read_address(env, &DataKey::Admin)
    }

    fn build_config(
        env: &Env,
        max_tokens: i128,
        ether_price_cents: i128,
        hard_cap_cents: i128,
        ceiling_cents: i128,
        floor_cents: i128,
        tier_thresholds: &Vec<i128>,
        tier_percents: &Vec<u32>,
    ) -> Result<AuctionConfig, Error> {
        if ether_price_cents <= 0 {
            return Err(Error::InvalidEtherPrice);
        }
        if hard_cap_cents <= 0 {
            return Err(Error::InvalidHardCap);
        }
        if floor_cents <= 0 || ceiling_cents <= floor_cents {
            return Err(Error::InvalidPriceRange);
        }
        let tiers = build_tiers(env, tier_thresholds, tier_percents)?;

        let hard_cap_wei =
            cents_to_wei(env, hard_cap_cents, ether_price_cents).ok_or(Error::ArithmeticOverflow)?;
        if hard_cap_wei <= 0 {
            return Err(Error::InvalidHardCap);
        }
        let ceiling_wei =
            cents_to_wei(env, ceiling_cents, ether_price_cents).ok_or(Error::ArithmeticOverflow)?;
        let floor_wei =
            cents_to_wei(env, floor_cents, ether_price_cents).ok_or(Error::ArithmeticOverflow)?;
        if floor_wei <= 0 || ceiling_wei <= floor_wei {
            return Err(Error::InvalidPriceRange);
        }

        let period_blocks = storage::read_period(env, &DataKey::BiddingPeriod);
        let price_constant = calculate_price_constant(env, ceiling_wei, floor_wei, period_blocks)
            .ok_or(Error::NotInitialized)?;

        // Whole cap sold at the floor with the top bonus must fit the pool
        let worst_case = max_auction_payout(env, hard_cap_wei, floor_wei, max_percent(&tiers))
            .ok_or(Error::ArithmeticOverflow)?;
        if worst_case > max_tokens {
            return Err(Error::ExceedsTokenAllocation);
        }

        Ok(AuctionConfig {
            max_tokens,
            ether_price_cents,
            hard_cap_cents,
            ceiling_cents,
            floor_cents,
            hard_cap_wei,
            curve: PriceCurve {
                ceiling_wei,
                floor_wei,
                price_constant,
                period_blocks,
            },
            tiers,
        })
    }

    fn apply_config(env: &Env, mut state: AuctionState, config: AuctionConfig) -> Result<(), Error> {
        state.max_total_claim = Self::claim_capacity(env, config.max_tokens)?;
        state.remaining_cap = config.hard_cap_wei;
        state.stage = AuctionStage::Setup;

        storage::write_config(env, &config);
        storage::write_state(env, &state);

        env.events().publish(
            (Symbol::new(env, "setup"),),
            SetupEvent {
                max_tokens: config.max_tokens,
                ether_price_cents: config.ether_price_cents,
                hard_cap_wei: config.hard_cap_wei,
                ceiling_wei: config.curve.ceiling_wei,
                floor_wei: config.curve.floor_wei,
                price_constant: config.curve.price_constant,
                max_total_claim: state.max_total_claim,
            },
        );

        Ok(())
    }

    /// Contribution total + presale cap + auction pool
    fn claim_capacity(env: &Env, max_tokens: i128) -> Result<i128, Error> {
        let contribution = storage::read_address(env, &DataKey::ContributionLedger)?;
        let presale = storage::read_address(env, &DataKey::PresaleLedger)?;

        ledgers::contribution_total(env, &contribution)
            .checked_add(ledgers::presale_capacity(env, &presale))
            .and_then(|v| v.checked_add(max_tokens))
            .ok_or(Error::ArithmeticOverflow)
    }

    fn check_presale_locked(env: &Env) -> Result<(), Error> {
        let presale = storage::read_address(env, &DataKey::PresaleLedger)?;
        if ledgers::presale_stage(env, &presale) != ledgers::PRESALE_LOCKED {
            return Err(Error::PresaleNotLocked);
        }
        Ok(())
    }

    /// Frozen contribution and presale balances of `owner`
    fn ledger_balance(env: &Env, owner: &Address) -> Result<i128, Error> {
        let contribution = storage::read_address(env, &DataKey::ContributionLedger)?;
        let presale = storage::read_address(env, &DataKey::PresaleLedger)?;

        ledgers::contribution_claimable(env, &contribution, owner)
            .checked_add(ledgers::presale_claimable(env, &presale, owner))
            .ok_or(Error::ArithmeticOverflow)
    }

    /// Tokens and bid bonus bought by `funds` at the final price
    fn auction_share(
        env: &Env,
        config: &AuctionConfig,
        state: &AuctionState,
        funds: i128,
    ) -> Result<(i128, i128), Error> {
        if funds == 0 || state.final_price == 0 {
            return Ok((0, 0));
        }
        let tokens =
            calculate_tokens(env, funds, state.final_price).ok_or(Error::ArithmeticOverflow)?;
        let bonus = calculate_bid_bonus(env, &config.tiers, tokens, funds, config.ether_price_cents)
            .ok_or(Error::ArithmeticOverflow)?;
        Ok((tokens, bonus))
    }

    /// Fix the final price, Started -> Ended
    ///
    /// At or past the deadline the price is the floor. A cap-hit end moves
    /// the end block up to `now`.
    fn finalize(env: &Env, config: &AuctionConfig, state: &mut AuctionState, now: u32) {
        if now >= state.end_block {
            state.final_price = config.curve.floor_wei;
        } else {
            state.final_price = config.curve.price_at(env, now - state.start_block);
            state.end_block = now;
        }
        state.stage = AuctionStage::Ended;

        log!(env, "auction ended", state.final_price, state.total_received);
        env.events().publish(
            (Symbol::new(env, "auction_ended"),),
            AuctionEndedEvent {
                end_block: state.end_block,
                final_price: state.final_price,
                total_received: state.total_received,
            },
        );
    }

    fn open_claim_window(env: &Env, state: &mut AuctionState) {
        state.stage = AuctionStage::ClaimOpen;
        env.events().publish(
            (Symbol::new(env, "claims_opened"),),
            ClaimsOpenedEvent {
                block: env.ledger().sequence(),
            },
        );
    }
}
