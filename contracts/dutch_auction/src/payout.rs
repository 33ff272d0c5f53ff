use soroban_sdk::{token, Address, Env};

use crate::storage::Committed;

/// Outbound transfer held back until state is committed
#[must_use]
pub struct Payout {
    token: Address,
    to: Address,
    amount: i128,
}

impl Payout {
    pub fn new(token: Address, to: Address, amount: i128) -> Self {
        Payout { token, to, amount }
    }

    /// Transfer from this contract; a zero payout is a no-op
    pub fn send(self, env: &Env, _committed: Committed) {
        if self.amount <= 0 {
            return;
        }
        let client = token::Client::new(env, &self.token);
        client.transfer(&env.current_contract_address(), &self.to, &self.amount);
    }
}
