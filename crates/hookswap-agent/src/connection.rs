use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use alloy::transports::http::{Client, Http};
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures_util::{FutureExt, StreamExt};
use hookswap_primitives::abi::erc20::IERC20::IERC20Instance;
use hookswap_primitives::abi::hook::ISwapHook::ISwapHookInstance;
use hookswap_primitives::alloy::{
    network::{Ethereum, EthereumWallet, Network, ReceiptResponse},
    primitives::{Address, B256, U256},
    providers::{Provider, ProviderBuilder},
    signers::PrivateKeySigner,
    transports::Transport,
};
use hookswap_primitives::{CompletionDecision, ObservedIntent};

use crate::config::AgentConfig;
use crate::error::{AgentError, Result};

/// Stream of decoded `SwapIntent` events. An `Err` item is a connection fault
/// on an otherwise live subscription.
pub type IntentStream = BoxStream<'static, Result<ObservedIntent>>;

/// A sent completion transaction. Resolves to its hash once a successful
/// receipt is in.
pub type PendingCompletion = BoxFuture<'static, Result<B256>>;

/// Everything the agent needs from the chain: reads, the intent subscription
/// and the completion submission.
#[async_trait]
pub trait HookChain: Send + Sync {
    /// Address of the operating wallet that signs completions
    fn wallet_address(&self) -> Address;

    fn hook_address(&self) -> Address;

    async fn latest_block(&self) -> Result<u64>;

    /// Subscribe to new `SwapIntent` events emitted by the hook.
    async fn watch_intents(&self) -> Result<IntentStream>;

    /// Historical `SwapIntent` events in `[from_block, to_block]`.
    async fn intents_between(&self, from_block: u64, to_block: u64)
        -> Result<Vec<ObservedIntent>>;

    /// `balanceOf(account)` on an ERC-20 token
    async fn balance_of(&self, token: Address, account: Address) -> Result<U256>;

    /// Send `completeSwap`. Resolves once the node accepted the transaction;
    /// the receipt is awaited through the returned `PendingCompletion`.
    async fn send_completion(&self, decision: CompletionDecision) -> Result<PendingCompletion>;
}

/// Connection to the node the hook is deployed on, with the operating wallet
/// attached to the provider for signing.
#[derive(Clone)]
pub struct HookConnection<T, P, N> {
    rpc_provider: P,
    wallet_address: Address,
    hook_address: Address,
    phantom_data: PhantomData<(T, N)>,
}

impl<T, P, N> HookConnection<T, P, N>
where
    T: Transport + Clone,
    P: Provider<T, N> + Clone,
    N: Network + Clone,
{
    pub fn new(rpc_provider: P, wallet_address: Address, hook_address: Address) -> Self {
        Self {
            rpc_provider,
            wallet_address,
            hook_address,
            phantom_data: PhantomData,
        }
    }
}

impl<T, P, N> fmt::Debug for HookConnection<T, P, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookConnection")
            .field("wallet_address", &self.wallet_address)
            .field("hook_address", &self.hook_address)
            .field("rpc_provider", &"<Provider>")
            .finish()
    }
}

/// Build the http provider with the signing wallet derived from the configured
/// private key.
pub fn connect(
    config: &AgentConfig,
) -> Result<HookConnection<Http<Client>, impl Provider<Http<Client>, Ethereum> + Clone, Ethereum>>
{
    let signer = PrivateKeySigner::from_str(config.signing_key.expose())
        .map_err(|e| AgentError::ConfigError(format!("invalid PRIVATE_KEY: {e}")))?;
    let wallet_address = signer.address();
    let wallet = EthereumWallet::new(signer);

    let rpc_provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(wallet)
        .on_http(config.rpc_url.clone());

    Ok(HookConnection::new(
        rpc_provider,
        wallet_address,
        config.hook_address,
    ))
}

#[async_trait]
impl<T, P, N> HookChain for HookConnection<T, P, N>
where
    T: Transport + Clone,
    P: Provider<T, N> + Clone + 'static,
    N: Network + Clone,
{
    fn wallet_address(&self) -> Address {
        self.wallet_address
    }

    fn hook_address(&self) -> Address {
        self.hook_address
    }

    async fn latest_block(&self) -> Result<u64> {
        self.rpc_provider
            .get_block_number()
            .await
            .map_err(|e| AgentError::RpcRequestError(e.to_string()))
    }

    async fn watch_intents(&self) -> Result<IntentStream> {
        let hook = ISwapHookInstance::new(self.hook_address, self.rpc_provider.clone());

        // installs an eth_newFilter on the node and polls it
        let event_poller = hook
            .SwapIntent_filter()
            .watch()
            .await
            .map_err(|e| AgentError::SubscriptionError(e.to_string()))?;

        let stream = event_poller.into_stream().map(|log_result| {
            log_result
                .map(|(intent, log)| ObservedIntent::from_log(intent, &log))
                .map_err(|e| {
                    AgentError::ConnectionFault(format!("undecodable SwapIntent log: {e}"))
                })
        });

        Ok(stream.boxed())
    }

    async fn intents_between(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ObservedIntent>> {
        let hook = ISwapHookInstance::new(self.hook_address, self.rpc_provider.clone());

        let logs = hook
            .SwapIntent_filter()
            .from_block(from_block)
            .to_block(to_block)
            .query()
            .await
            .map_err(|e| AgentError::RpcRequestError(e.to_string()))?;

        Ok(logs
            .into_iter()
            .map(|(intent, log)| ObservedIntent::from_log(intent, &log))
            .collect())
    }

    async fn balance_of(&self, token: Address, account: Address) -> Result<U256> {
        let token_contract = IERC20Instance::new(token, self.rpc_provider.clone());

        let balance = token_contract
            .balanceOf(account)
            .call()
            .await
            .map_err(|e| AgentError::BalanceQueryError(format!("{token} for {account}: {e}")))?
            ._0;

        Ok(balance)
    }

    async fn send_completion(&self, decision: CompletionDecision) -> Result<PendingCompletion> {
        let hook = ISwapHookInstance::new(self.hook_address, self.rpc_provider.clone());

        let pending = hook
            .completeSwap(decision.swap_id, decision.better_price_found)
            .send()
            .await
            .map_err(|e| AgentError::CompletionSubmitError(e.to_string()))?;

        tracing::debug!(
            swap_id = %decision.swap_id,
            tx_hash = %pending.tx_hash(),
            "completeSwap sent"
        );

        Ok(async move {
            let receipt = pending
                .get_receipt()
                .await
                .map_err(|e| AgentError::CompletionSubmitError(e.to_string()))?;

            tracing::debug!("completeSwap receipt: {:?}", receipt);

            if !receipt.status() {
                return Err(AgentError::CompletionReverted(format!(
                    "transaction {} reverted",
                    receipt.transaction_hash()
                )));
            }

            Ok(receipt.transaction_hash())
        }
        .boxed())
    }
}

#[cfg(test)]
mod tests {
    use hookswap_primitives::alloy::primitives::address;
    use hookswap_primitives::deployments::LOCAL_HOOK_ADDRESS;
    use url::Url;

    use super::*;
    use crate::config::{ListenerConfig, SigningKey};

    fn config(key: &str) -> AgentConfig {
        AgentConfig {
            rpc_url: Url::parse("http://127.0.0.1:8545").unwrap(),
            signing_key: SigningKey::new(key),
            hook_address: LOCAL_HOOK_ADDRESS,
            token0_address: None,
            token1_address: None,
            log_level: "info".to_string(),
            listener: ListenerConfig::default(),
        }
    }

    #[tokio::test]
    async fn derives_wallet_from_private_key() {
        // anvil account #0
        let connection = connect(&config(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        ))
        .unwrap();

        assert_eq!(
            connection.wallet_address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert_eq!(connection.hook_address(), LOCAL_HOOK_ADDRESS);
    }

    #[tokio::test]
    async fn malformed_private_key_is_a_config_error() {
        let err = connect(&config("not-a-key")).unwrap_err();
        assert!(matches!(err, AgentError::ConfigError(_)));
    }

    #[tokio::test]
    async fn debug_output_hides_provider() {
        let connection = connect(&config(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        ))
        .unwrap();
        let printed = format!("{connection:?}");
        assert!(printed.contains("HookConnection"));
        assert!(printed.contains("<Provider>"));
    }
}
