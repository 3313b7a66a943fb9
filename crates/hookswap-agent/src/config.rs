//! Agent configuration
//!
//! Required values come from the environment (a `.env` file is loaded by the
//! binary). Listener tuning can optionally be read from a JSON file named by
//! `AGENT_CONFIG`.

use std::{fmt, fs, str::FromStr, time::Duration};

use hookswap_primitives::alloy::primitives::Address;
use serde::Deserialize;
use tracing::Level;
use url::Url;

use crate::backoff::BackoffConfig;
use crate::error::{AgentError, Result};

pub const RPC_URL_VAR: &str = "RPC_URL";
pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";
pub const HOOK_ADDRESS_VAR: &str = "HOOK_ADDRESS";
pub const TOKEN0_ADDRESS_VAR: &str = "TOKEN0_ADDRESS";
pub const TOKEN1_ADDRESS_VAR: &str = "TOKEN1_ADDRESS";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
pub const LISTENER_CONFIG_VAR: &str = "AGENT_CONFIG";

/// Tuning of the intent listener, loadable from JSON. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// upper bound on fulfillment handlers running at once
    pub max_concurrent_intents: usize,
    /// how long an attempted swap id is remembered for deduplication
    pub attempt_ttl_secs: u64,
    pub backoff_initial_ms: u64,
    pub backoff_max_ms: u64,
    /// replay intents from this block on the first subscription
    pub start_block: Option<u64>,
    /// widest block range asked for in one historical log query
    pub replay_window_blocks: u64,
    /// how often the head is sampled to move the replay cursor while no
    /// intents arrive
    pub cursor_refresh_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_intents: 16,
            attempt_ttl_secs: 3600,
            backoff_initial_ms: 500,
            backoff_max_ms: 30_000,
            start_block: None,
            replay_window_blocks: 2_000,
            cursor_refresh_secs: 30,
        }
    }
}

impl ListenerConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| AgentError::ConfigError(format!("failed to read {path}: {e}")))?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let config: ListenerConfig = serde_json::from_str(data)
            .map_err(|e| AgentError::ConfigError(format!("failed to parse listener config: {e}")))?;
        if config.max_concurrent_intents == 0 {
            return Err(AgentError::ConfigError(
                "max_concurrent_intents must be at least 1".to_string(),
            ));
        }
        if config.replay_window_blocks == 0 || config.cursor_refresh_secs == 0 {
            return Err(AgentError::ConfigError(
                "replay_window_blocks and cursor_refresh_secs must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn attempt_ttl(&self) -> Duration {
        Duration::from_secs(self.attempt_ttl_secs)
    }

    pub fn cursor_refresh(&self) -> Duration {
        Duration::from_secs(self.cursor_refresh_secs)
    }

    pub fn backoff(&self) -> BackoffConfig {
        BackoffConfig::new(
            Duration::from_millis(self.backoff_initial_ms),
            Duration::from_millis(self.backoff_max_ms),
        )
    }
}

/// Hex encoded secp256k1 key of the operating wallet. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(String);

impl SigningKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub rpc_url: Url,
    pub signing_key: SigningKey,
    pub hook_address: Address,
    pub token0_address: Option<Address>,
    pub token1_address: Option<Address>,
    pub log_level: String,
    pub listener: ListenerConfig,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let rpc_url = read(RPC_URL_VAR);
        let signing_key = read(PRIVATE_KEY_VAR);
        let hook_address = read(HOOK_ADDRESS_VAR);

        let (Some(rpc_url), Some(signing_key), Some(hook_address)) =
            (rpc_url.as_ref(), signing_key.as_ref(), hook_address.as_ref())
        else {
            let missing: Vec<&str> = [
                (RPC_URL_VAR, rpc_url.is_none()),
                (PRIVATE_KEY_VAR, signing_key.is_none()),
                (HOOK_ADDRESS_VAR, hook_address.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, missing)| missing.then_some(name))
            .collect();
            return Err(AgentError::ConfigError(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        };

        let rpc_url = Url::parse(rpc_url)
            .map_err(|e| AgentError::ConfigError(format!("invalid {RPC_URL_VAR}: {e}")))?;
        let hook_address = parse_address(HOOK_ADDRESS_VAR, hook_address)?;
        let token0_address = read(TOKEN0_ADDRESS_VAR)
            .map(|value| parse_address(TOKEN0_ADDRESS_VAR, &value))
            .transpose()?;
        let token1_address = read(TOKEN1_ADDRESS_VAR)
            .map(|value| parse_address(TOKEN1_ADDRESS_VAR, &value))
            .transpose()?;

        let log_level = read(LOG_LEVEL_VAR).unwrap_or_else(|| "info".to_string());
        let listener = match read(LISTENER_CONFIG_VAR) {
            Some(path) => ListenerConfig::from_file(&path)?,
            None => ListenerConfig::default(),
        };

        let config = Self {
            rpc_url,
            signing_key: SigningKey::new(signing_key.as_str()),
            hook_address,
            token0_address,
            token1_address,
            log_level,
            listener,
        };
        config.log_level()?;
        Ok(config)
    }

    pub fn log_level(&self) -> Result<Level> {
        Level::from_str(&self.log_level)
            .map_err(|_| AgentError::ConfigError(format!("invalid log level: {}", self.log_level)))
    }
}

fn parse_address(name: &str, value: &str) -> Result<Address> {
    Address::from_str(value).map_err(|e| AgentError::ConfigError(format!("invalid {name}: {e}")))
}
