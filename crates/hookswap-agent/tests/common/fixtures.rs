use std::sync::Arc;

use hookswap_agent::config::{AgentConfig, ListenerConfig, SigningKey};
use hookswap_agent::reporter::BalanceReporter;
use hookswap_agent::utils::mock_chain::MockChain;
use hookswap_primitives::alloy::primitives::{address, Address, B256, U256};
use hookswap_primitives::deployments::{
    LOCAL_HOOK_ADDRESS, LOCAL_RPC_URL, LOCAL_TOKEN0_ADDRESS, LOCAL_TOKEN1_ADDRESS,
};
use hookswap_primitives::{ObservedIntent, SwapIntent};
use url::Url;

/// anvil account #0
pub const WALLET: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const OWNER: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

pub const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

pub fn swap_id(n: u8) -> B256 {
    B256::with_last_byte(n)
}

pub fn intent(n: u8, amount_in: U256) -> SwapIntent {
    SwapIntent {
        swapId: swap_id(n),
        owner: OWNER,
        tokenIn: LOCAL_TOKEN0_ADDRESS,
        tokenOut: LOCAL_TOKEN1_ADDRESS,
        amountIn: amount_in,
    }
}

pub fn observed(n: u8, block_number: u64) -> ObservedIntent {
    ObservedIntent::new(intent(n, U256::from(ONE_ETHER))).at_block(block_number)
}

/// Mock chain with both parties holding some of each token.
pub fn funded_chain() -> Arc<MockChain> {
    let chain = MockChain::new(WALLET, LOCAL_HOOK_ADDRESS);
    chain.set_balance(LOCAL_TOKEN0_ADDRESS, WALLET, U256::from(100 * ONE_ETHER));
    chain.set_balance(LOCAL_TOKEN1_ADDRESS, WALLET, U256::from(50 * ONE_ETHER));
    chain.set_balance(LOCAL_TOKEN0_ADDRESS, LOCAL_HOOK_ADDRESS, U256::from(ONE_ETHER));
    chain.set_balance(LOCAL_TOKEN1_ADDRESS, LOCAL_HOOK_ADDRESS, U256::ZERO);
    Arc::new(chain)
}

pub fn reporter() -> BalanceReporter {
    BalanceReporter::new(
        WALLET,
        LOCAL_HOOK_ADDRESS,
        Some(LOCAL_TOKEN0_ADDRESS),
        Some(LOCAL_TOKEN1_ADDRESS),
    )
}

pub fn listener_config() -> ListenerConfig {
    ListenerConfig {
        max_concurrent_intents: 4,
        attempt_ttl_secs: 3600,
        backoff_initial_ms: 100,
        backoff_max_ms: 1_000,
        start_block: None,
        replay_window_blocks: 2_000,
        cursor_refresh_secs: 60,
    }
}

pub fn agent_config() -> AgentConfig {
    AgentConfig {
        rpc_url: Url::parse(LOCAL_RPC_URL).unwrap(),
        signing_key: SigningKey::new(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        ),
        hook_address: LOCAL_HOOK_ADDRESS,
        token0_address: Some(LOCAL_TOKEN0_ADDRESS),
        token1_address: Some(LOCAL_TOKEN1_ADDRESS),
        log_level: "info".to_string(),
        listener: listener_config(),
    }
}
