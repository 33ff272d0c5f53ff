use sale_tiers::BonusTier;
use soroban_sdk::{contracttype, Address, Vec};

#[contracttype]
#[derive(Clone, Debug)]
pub struct PresaleSetupEvent {
    pub max_tokens: i128,
    pub tiers: Vec<BonusTier>,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RecordCreateEvent {
    pub record: Address,
    pub added: i128,
    pub base: i128,
    pub bonus: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RecordUpdateEvent {
    pub record: Address,
    pub base: i128,
    pub bonus: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RecordMoveEvent {
    pub from: Address,
    pub to: Address,
    pub claimable: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct LockEvent {
    pub total_claimable: i128,
}
