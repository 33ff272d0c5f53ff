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
    /// Records are locked, no further mutation allowed
    RecordsLocked = 20,

    // ============================================
    // VALIDATION ERRORS (30-49)
    // ============================================
    /// Amount below the minimum recordable granularity
    InvalidAmount = 30,
    /// Conversion rate must be positive
    InvalidConversionRate = 31,
    /// Record asked for conversion before a rate was set
    ConversionRateNotSet = 32,
    /// Maximum record total must be positive
    InvalidMaxTokens = 33,
    /// Source record of a move is empty
    EmptyRecord = 34,
    /// Destination record of a move already holds a balance
    RecordExists = 35,

    // ============================================
    // CAPACITY ERRORS (50-59)
    // ============================================
    /// Running total would exceed the configured maximum
    ExceedsMaxTokens = 50,

    // ============================================
    // ARITHMETIC ERRORS (70-79)
    // ============================================
    ArithmeticOverflow = 70,
}

