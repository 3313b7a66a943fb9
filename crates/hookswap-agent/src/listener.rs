use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use hookswap_primitives::ObservedIntent;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::attempts::AttemptRegistry;
use crate::backoff::{Backoff, BackoffConfig};
use crate::config::ListenerConfig;
use crate::connection::HookChain;
use crate::error::{AgentError, Result};
use crate::handler::FulfillmentHandler;
use crate::policy::DecisionPolicy;

/// Listens for `SwapIntent` events on the hook and hands every new intent to
/// the fulfillment handler on its own task.
///
/// The subscription is supervised: when it fails or ends the listener waits
/// with exponential backoff, subscribes again and replays the blocks it may
/// have missed. Intents are deduplicated by swap id, so replays and reorg
/// redeliveries do not trigger a second completion.
pub struct IntentListener<C: ?Sized, D> {
    chain: Arc<C>,
    handler: Arc<FulfillmentHandler<C, D>>,
    attempts: AttemptRegistry,
    limiter: Arc<Semaphore>,
    tracker: TaskTracker,
    backoff: BackoffConfig,
    start_block: Option<u64>,
    replay_window: u64,
    cursor_refresh: Duration,
    /// last block an intent was seen in, or the head at the last replay
    cursor: Option<u64>,
}

impl<C, D> IntentListener<C, D>
where
    C: HookChain + ?Sized + 'static,
    D: DecisionPolicy + 'static,
{
    pub fn new(chain: Arc<C>, handler: FulfillmentHandler<C, D>, config: &ListenerConfig) -> Self {
        Self {
            chain,
            handler: Arc::new(handler),
            attempts: AttemptRegistry::new(config.attempt_ttl()),
            limiter: Arc::new(Semaphore::new(config.max_concurrent_intents.max(1))),
            tracker: TaskTracker::new(),
            backoff: config.backoff(),
            start_block: config.start_block,
            replay_window: config.replay_window_blocks.max(1),
            cursor_refresh: config.cursor_refresh(),
            cursor: None,
        }
    }

    /// Swap ids attempted recently
    pub fn attempts(&self) -> &AttemptRegistry {
        &self.attempts
    }

    /// Block the next replay starts from
    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// Listen until `shutdown` is cancelled, then wait for in-flight intents.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let mut backoff = Backoff::new(self.backoff);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                result = self.listen_once(&mut backoff) => {
                    if let Err(e) = result {
                        tracing::warn!("Provider error: {}", e);
                    }
                }
            }

            let delay = backoff.next_delay();
            tracing::info!(
                attempt = backoff.attempts(),
                "resubscribing to SwapIntent in {:?}",
                delay
            );
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        tracing::info!(
            in_flight = self.tracker.len(),
            "listener stopped, waiting for in-flight intents"
        );
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// Read one subscription until it fails. Never returns `Ok`.
    async fn listen_once(&mut self, backoff: &mut Backoff) -> Result<()> {
        // subscribe before replaying so nothing falls between the two
        let mut stream = self.chain.watch_intents().await?;
        self.replay_missed().await?;
        backoff.reset();

        let start = tokio::time::Instant::now() + self.cursor_refresh;
        let mut refresh = tokio::time::interval_at(start, self.cursor_refresh);
        let mut sampled_head = None;

        loop {
            tokio::select! {
                item = stream.next() => match item {
                    Some(Ok(observed)) => {
                        self.dispatch(observed).await;
                    }
                    Some(Err(e)) => tracing::warn!("Provider error: {}", e),
                    None => {
                        return Err(AgentError::ConnectionFault(
                            "SwapIntent subscription ended".to_string(),
                        ));
                    }
                },
                _ = refresh.tick() => {
                    // the previous sample has had a full period to be delivered
                    if let Some(head) = sampled_head {
                        self.advance_cursor(head);
                    }
                    match self.chain.latest_block().await {
                        Ok(head) => sampled_head = Some(head),
                        Err(e) => tracing::warn!("Provider error: {}", e),
                    }
                }
            }
        }
    }

    /// Fetch intents from the cursor (inclusive, a block may have been cut
    /// short) up to the head, at most `replay_window` blocks per query. The
    /// first subscription starts at the configured start block, or at the head
    /// if there is none.
    async fn replay_missed(&mut self) -> Result<()> {
        let head = self.chain.latest_block().await?;

        let Some(mut from_block) = self.cursor.or(self.start_block) else {
            self.cursor = Some(head);
            return Ok(());
        };

        while from_block <= head {
            let to_block = from_block
                .saturating_add(self.replay_window - 1)
                .min(head);
            let missed = self.chain.intents_between(from_block, to_block).await?;
            tracing::info!(
                from_block,
                to_block,
                count = missed.len(),
                "replayed SwapIntent range"
            );
            for observed in missed {
                self.dispatch(observed).await;
            }
            // a failed window resumes here on the next subscription
            self.advance_cursor(to_block);
            from_block = to_block + 1;
        }

        Ok(())
    }

    /// Spawn the handler for one delivered intent. Returns false when the
    /// intent was skipped (removed log or already attempted).
    pub async fn dispatch(&mut self, observed: ObservedIntent) -> bool {
        let swap_id = observed.swap_id();

        if observed.removed {
            tracing::warn!(swap_id = %swap_id, "ignoring SwapIntent log removed by reorg");
            return false;
        }
        if let Some(block_number) = observed.block_number {
            self.advance_cursor(block_number);
        }
        if !self.attempts.try_claim(swap_id).await {
            tracing::info!(swap_id = %swap_id, "SwapIntent already attempted, skipping");
            return false;
        }

        let handler = self.handler.clone();
        let limiter = self.limiter.clone();
        let attempts = self.attempts.clone();
        self.tracker.spawn(async move {
            let Ok(_permit) = limiter.acquire_owned().await else {
                return;
            };
            let report = handler.fulfill(&observed).await;
            if report.is_failed() {
                // leave it to a redelivery
                attempts.release(swap_id).await;
            }
        });

        true
    }

    fn advance_cursor(&mut self, block_number: u64) {
        self.cursor = Some(self.cursor.map_or(block_number, |c| c.max(block_number)));
    }
}
