use alloy::primitives::{Address, U256};

/// Holdings of the two pool tokens for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub subject: Address,
    pub token0_balance: U256,
    pub token1_balance: U256,
}

impl BalanceSnapshot {
    pub fn new(subject: Address, token0_balance: U256, token1_balance: U256) -> Self {
        Self {
            subject,
            token0_balance,
            token1_balance,
        }
    }
}
