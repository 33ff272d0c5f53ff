use sale_tiers::TierError;
use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ============================================
    // INITIALIZATION ERRORS (1-9)
    // ============================================
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,

    // ============================================
    // AUTHORIZATION ERRORS (10-19)
    // ============================================
    /// Beneficiary is not on the whitelist
    NotWhitelisted = 10,
    /// Address already claimed its tokens
    AlreadyClaimed = 11,

    // ============================================
    // STAGE ERRORS (20-29)
    // ============================================
    /// Operation not allowed in the current auction stage
    InvalidStage = 20,
    /// Presale ledger has not finished its setup
    PresaleNotReady = 21,
    /// Presale ledger records are not frozen yet
    PresaleNotLocked = 22,
    /// Contribution ledger records are not frozen yet
    ContributionLedgerNotLocked = 23,
    /// Claims need a settled auction
    AuctionNotEnded = 24,
    /// Recovery needs the claim window to be open
    ClaimsNotOpen = 25,

    // ============================================
    // VALIDATION ERRORS (30-49)
    // ============================================
    /// Amount must be positive
    InvalidAmount = 30,
    /// Bidding period and audit wait must be positive
    InvalidPeriod = 31,
    /// Auction token pool must be positive
    InvalidMaxTokens = 32,
    /// Ether price must be positive
    InvalidEtherPrice = 33,
    /// Hard cap must be positive (also after conversion to wei)
    InvalidHardCap = 34,
    /// Need ceiling > floor > 0 (also after conversion to wei)
    InvalidPriceRange = 35,
    /// Threshold and percent arrays differ in length
    TierLengthMismatch = 36,
    /// Tier table has no entries
    EmptyTierTable = 37,
    /// Tier threshold below zero
    InvalidTierThreshold = 38,
    /// Tier thresholds not strictly ascending
    TiersNotAscending = 39,
    /// Claimant has neither a bid nor a ledger balance
    NothingToClaim = 40,

    // ============================================
    // CAPACITY ERRORS (50-59)
    // ============================================
    /// Worst-case payout exceeds the tokens reserved for the sale
    ExceedsTokenAllocation = 50,
    /// Sale token balance is below the total claimable capacity
    AllocationShortfall = 51,

    // ============================================
    // TIMING ERRORS (60-69)
    // ============================================
    /// Bidding period is over
    BiddingClosed = 60,
    /// Bidding period is still running
    AuctionStillRunning = 61,
    /// Audit wait after the auction end has not elapsed
    AuditWindowActive = 62,

    // ============================================
    // ARITHMETIC ERRORS (70-79)
    // ============================================
    ArithmeticOverflow = 70,
}

impl From<TierError> for Error {
    fn from(err: TierError) -> Self {
        match err {
            TierError::LengthMismatch => Error::TierLengthMismatch,
            TierError::Empty => Error::EmptyTierTable,
            TierError::NegativeThreshold => Error::InvalidTierThreshold,
            TierError::NotAscending => Error::TiersNotAscending,
        }
    }
}
