use async_trait::async_trait;
use hookswap_primitives::{CompletionDecision, SwapIntent};

/// Decides how a swap intent is completed. Implementations may consult other
/// venues for a better price before answering.
#[async_trait]
pub trait DecisionPolicy: Send + Sync {
    async fn evaluate(&self, intent: &SwapIntent) -> CompletionDecision;
}

/// Completes every intent on the hook's own pool price.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBetterPrice;

#[async_trait]
impl DecisionPolicy for NoBetterPrice {
    async fn evaluate(&self, intent: &SwapIntent) -> CompletionDecision {
        CompletionDecision::no_better_price(intent.swapId)
    }
}
