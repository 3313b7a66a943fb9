use alloy::primitives::{address, Address};

pub const LOCAL_RPC_URL: &str = "http://127.0.0.1:8545";

/// Local anvil devnet addresses, deterministic for the default deployer
pub const LOCAL_TOKEN0_ADDRESS: Address = address!("Cf7Ed3AccA5a467e9e704C703E8D87F634fB0Fc9");
pub const LOCAL_TOKEN1_ADDRESS: Address = address!("Dc64a140Aa3E981100a9becA4E685f962f0cF6C9");
pub const LOCAL_HOOK_ADDRESS: Address = address!("59C872E468d49c0B17FE626D8eDA62338d5BC088");
