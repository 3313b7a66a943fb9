use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::AgentConfig;
use crate::connection::HookChain;
use crate::error::{AgentError, Result};
use crate::handler::FulfillmentHandler;
use crate::listener::IntentListener;
use crate::policy::DecisionPolicy;
use crate::reporter::{BalanceReporter, ReportStage};

/// The fulfillment agent: one listener on the hook plus a balance report at
/// startup.
pub struct SwapAgent<C: ?Sized, D> {
    endpoint: Url,
    chain: Arc<C>,
    reporter: BalanceReporter,
    listener: IntentListener<C, D>,
}

impl<C, D> SwapAgent<C, D>
where
    C: HookChain + ?Sized + 'static,
    D: DecisionPolicy + 'static,
{
    pub fn new(config: &AgentConfig, chain: Arc<C>, policy: D) -> Self {
        let reporter = BalanceReporter::from_config(config, chain.wallet_address());
        let handler = FulfillmentHandler::new(chain.clone(), policy, reporter);
        let listener = IntentListener::new(chain.clone(), handler, &config.listener);

        Self {
            endpoint: config.rpc_url.clone(),
            chain,
            reporter,
            listener,
        }
    }

    /// Run until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        tracing::info!(
            wallet = %self.chain.wallet_address(),
            hook = %self.chain.hook_address(),
            "Bot listening on {}...",
            self.endpoint
        );

        let listener = tokio::spawn(self.listener.run(shutdown));
        self.reporter
            .report(&*self.chain, ReportStage::Startup)
            .await;

        listener
            .await
            .map_err(|e| AgentError::ListenerTaskError(e.to_string()))
    }
}
