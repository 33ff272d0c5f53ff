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
    // STAGE ERRORS (20-29)
    // ============================================
    /// Operation not allowed in the current stage
    InvalidStage = 20,

    // ============================================
    // VALIDATION ERRORS (30-49)
    // ============================================
    /// Amount below the minimum recordable granularity
    InvalidAmount = 30,
    /// Maximum presale tokens must be positive
    InvalidMaxTokens = 31,
    /// Threshold and percent arrays differ in length
    TierLengthMismatch = 32,
    /// Tier table has no entries
    EmptyTierTable = 33,
    /// Tier threshold below zero
    InvalidTierThreshold = 34,
    /// Tier thresholds not strictly ascending
    TiersNotAscending = 35,
    /// Source record of a move is empty
    EmptyRecord = 36,
    /// Destination record of a move already holds a balance
    RecordExists = 37,

    // ============================================
    // CAPACITY ERRORS (50-59)
    // ============================================
    /// Claimable total would exceed the presale maximum
    ExceedsMaxTokens = 50,

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
