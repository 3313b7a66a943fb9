use alloy::primitives::B256;
use alloy::rpc::types::Log;

use crate::abi::hook::ISwapHook;
pub use crate::abi::hook::ISwapHook::SwapIntent;

/// A `SwapIntent` event together with where it was observed on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedIntent {
    pub intent: SwapIntent,
    pub block_number: Option<u64>,
    pub log_index: Option<u64>,
    pub transaction_hash: Option<B256>,
    /// set when the log was dropped by a reorg
    pub removed: bool,
}

impl ObservedIntent {
    /// Intent without chain position, e.g. a pending log.
    pub fn new(intent: SwapIntent) -> Self {
        Self {
            intent,
            block_number: None,
            log_index: None,
            transaction_hash: None,
            removed: false,
        }
    }

    pub fn from_log(intent: SwapIntent, log: &Log) -> Self {
        Self {
            intent,
            block_number: log.block_number,
            log_index: log.log_index,
            transaction_hash: log.transaction_hash,
            removed: log.removed,
        }
    }

    /// Same intent observed at `block_number`.
    pub fn at_block(mut self, block_number: u64) -> Self {
        self.block_number = Some(block_number);
        self
    }

    pub fn swap_id(&self) -> B256 {
        self.intent.swapId
    }
}

/// The agent's verdict on a swap intent, submitted through `completeSwap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionDecision {
    pub swap_id: B256,
    pub better_price_found: bool,
}

impl CompletionDecision {
    pub fn no_better_price(swap_id: B256) -> Self {
        Self {
            swap_id,
            better_price_found: false,
        }
    }

    /// Typed call data for `completeSwap(bytes32,bool)`
    pub fn to_call(&self) -> ISwapHook::completeSwapCall {
        ISwapHook::completeSwapCall {
            swapId: self.swap_id,
            betterPriceFound: self.better_price_found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256, keccak256, U256};
    use alloy::sol_types::{SolCall, SolEvent};

    fn intent() -> SwapIntent {
        SwapIntent {
            swapId: b256!("00000000000000000000000000000000000000000000000000000000000000aa"),
            owner: address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            tokenIn: address!("Cf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9"),
            tokenOut: address!("Dc64a140Aa3E981100a9becA4E685f962f0cF6C9"),
            amountIn: U256::from(2_500_000_000_000_000_000u128),
        }
    }

    #[test]
    fn complete_swap_uses_two_argument_selector() {
        let call = CompletionDecision::no_better_price(intent().swapId).to_call();
        let encoded = call.abi_encode();

        let selector = &keccak256("completeSwap(bytes32,bool)")[..4];
        assert_eq!(&encoded[..4], selector);
        // selector + two static words
        assert_eq!(encoded.len(), 4 + 64);
        assert_eq!(&encoded[4..36], intent().swapId.as_slice());
        assert!(encoded[36..].iter().all(|b| *b == 0));
    }

    #[test]
    fn swap_intent_indexes_id_owner_and_token_in() {
        assert_eq!(
            SwapIntent::SIGNATURE,
            "SwapIntent(bytes32,address,address,address,uint256)"
        );

        let log_data = intent().encode_log_data();
        // topic0 is the event signature hash, followed by the three indexed fields
        assert_eq!(log_data.topics().len(), 4);
        assert_eq!(log_data.topics()[0], SwapIntent::SIGNATURE_HASH);
        assert_eq!(log_data.topics()[1], intent().swapId);
        // tokenOut and amountIn live in the data section
        assert_eq!(log_data.data.len(), 64);
    }

    #[test]
    fn observed_intent_without_log_has_no_position() {
        let observed = ObservedIntent::new(intent());
        assert_eq!(observed.swap_id(), intent().swapId);
        assert_eq!(observed.block_number, None);
        assert_eq!(observed.log_index, None);
    }
}
