use std::sync::Arc;

use hookswap_primitives::alloy::primitives::B256;
use hookswap_primitives::units::format_ether;
use hookswap_primitives::{CompletionDecision, ObservedIntent};
use tokio::sync::Mutex;

use crate::connection::HookChain;
use crate::error::{AgentError, Result};
use crate::policy::DecisionPolicy;
use crate::reporter::{BalanceReporter, ReportOutcome, ReportStage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// `completeSwap` was included and succeeded
    Completed(B256),
    /// the hook had already completed this swap
    AlreadyCompleted,
    Failed(String),
}

/// What happened while fulfilling one intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfillmentReport {
    pub swap_id: B256,
    pub before: ReportOutcome,
    pub outcome: CompletionOutcome,
    /// not taken when the completion failed
    pub after: Option<ReportOutcome>,
}

impl FulfillmentReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, CompletionOutcome::Failed(_))
    }
}

/// Turns one `SwapIntent` into one `completeSwap` call, with balance reports
/// before and after.
///
/// Handlers for different intents may run concurrently. Sends go through a
/// single lane so the wallet never has two completions racing for a nonce.
/// Balance reads and receipt waits stay parallel, so a stuck transaction only
/// stalls its own intent.
pub struct FulfillmentHandler<C: ?Sized, D> {
    chain: Arc<C>,
    policy: D,
    reporter: BalanceReporter,
    submission_lane: Mutex<()>,
}

impl<C, D> FulfillmentHandler<C, D>
where
    C: HookChain + ?Sized,
    D: DecisionPolicy,
{
    pub fn new(chain: Arc<C>, policy: D, reporter: BalanceReporter) -> Self {
        Self {
            chain,
            policy,
            reporter,
            submission_lane: Mutex::new(()),
        }
    }

    /// Fulfill one intent. Errors are logged and folded into the report, never
    /// returned.
    pub async fn fulfill(&self, observed: &ObservedIntent) -> FulfillmentReport {
        let intent = &observed.intent;
        let swap_id = intent.swapId;

        tracing::info!(
            swap_id = %swap_id,
            block = ?observed.block_number,
            "SwapIntent detected: swapId={}, owner={}, tokenIn={}, tokenOut={}, amountIn={} ether",
            swap_id,
            intent.owner,
            intent.tokenIn,
            intent.tokenOut,
            format_ether(intent.amountIn),
        );

        let before = self.reporter.report(&*self.chain, ReportStage::Before).await;

        let decision = self.policy.evaluate(intent).await;
        let outcome = match self.submit(swap_id, decision).await {
            Ok(tx_hash) => {
                tracing::info!(swap_id = %swap_id, %tx_hash, "swap completed");
                CompletionOutcome::Completed(tx_hash)
            }
            Err(e) if e.is_already_completed() => {
                tracing::info!(swap_id = %swap_id, "swap already completed on chain, skipping");
                CompletionOutcome::AlreadyCompleted
            }
            Err(e) => {
                tracing::error!(swap_id = %swap_id, "Error completing swap: {}", e);
                return FulfillmentReport {
                    swap_id,
                    before,
                    outcome: CompletionOutcome::Failed(e.to_string()),
                    after: None,
                };
            }
        };

        let after = self.reporter.report(&*self.chain, ReportStage::After).await;

        FulfillmentReport {
            swap_id,
            before,
            outcome,
            after: Some(after),
        }
    }

    async fn submit(&self, swap_id: B256, decision: CompletionDecision) -> Result<B256> {
        if decision.swap_id != swap_id {
            return Err(AgentError::CompletionSubmitError(format!(
                "decision is for swap {} instead of {}",
                decision.swap_id, swap_id
            )));
        }

        // only the send is serialized, receipts are awaited outside the lane
        let pending = {
            let _lane = self.submission_lane.lock().await;
            tracing::info!(
                swap_id = %swap_id,
                better_price_found = decision.better_price_found,
                "submitting completeSwap"
            );
            self.chain.send_completion(decision).await?
        };

        pending.await
    }
}
