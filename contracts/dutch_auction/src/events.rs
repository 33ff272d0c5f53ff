use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug)]
pub struct SetupEvent {
    pub max_tokens: i128,
    pub ether_price_cents: i128,
    pub hard_cap_wei: i128,
    pub ceiling_wei: i128,
    pub floor_wei: i128,
    pub price_constant: i128,
    pub max_total_claim: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct WhitelistEvent {
    pub participant: Address,
    pub participants: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct AuctionStartedEvent {
    pub start_block: u32,
    pub end_block: u32,
    pub max_total_claim: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct BidEvent {
    pub bidder: Address,
    pub beneficiary: Address,
    pub accepted: i128,
    pub refunded: i128,
    pub remaining_cap: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct AuctionEndedEvent {
    pub end_block: u32,
    pub final_price: i128,
    pub total_received: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ClaimsOpenedEvent {
    pub block: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct TokensClaimedEvent {
    pub claimant: Address,
    pub funds: i128,
    pub auction_tokens: i128,
    pub bonus_tokens: i128,
    pub ledger_tokens: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct TokensRecoveredEvent {
    pub token: Address,
    pub to: Address,
    pub amount: i128,
}
