//! Core types for the hookswap agent
//!
//! This module re-exports the alloy types the agent needs so that every crate in
//! the workspace resolves them through a single version.

pub mod alloy {
    pub mod primitives {
        pub use alloy::primitives::{
            address, b256, fixed_bytes, keccak256, Address, FixedBytes, B256, U256,
        };
    }

    pub mod network {
        pub use alloy::network::{Ethereum, EthereumWallet, Network, ReceiptResponse};
    }

    pub mod providers {
        pub use alloy::providers::{Provider, ProviderBuilder};
    }

    pub mod transports {
        pub use alloy::transports::Transport;
    }

    pub mod rpc {
        pub use alloy::rpc::types::Log;
    }

    pub mod signers {
        pub use alloy::signers::local::PrivateKeySigner;
    }
}

pub mod abi;
pub mod balance;
pub mod deployments;
pub mod error;
pub mod intent;
pub mod units;

pub use error::{PrimitivesError, Result};
pub use intent::*;
