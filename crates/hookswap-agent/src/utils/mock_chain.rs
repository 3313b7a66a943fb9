//! In-memory `HookChain` for exercising the listener and handler without a node.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::channel::mpsc;
use futures_util::{FutureExt, StreamExt};
use hookswap_primitives::alloy::primitives::{keccak256, Address, B256, U256};
use hookswap_primitives::{CompletionDecision, ObservedIntent};
use tokio::sync::Semaphore;

use crate::connection::{HookChain, IntentStream, PendingCompletion};
use crate::error::{AgentError, Result};

/// Sending half of one mocked subscription. Dropping it ends the stream.
pub type IntentSender = mpsc::UnboundedSender<Result<ObservedIntent>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainCall {
    LatestBlock,
    WatchIntents,
    IntentsBetween(u64, u64),
    BalanceOf { token: Address, account: Address },
    CompleteSwap(CompletionDecision),
}

#[derive(Debug)]
pub struct MockChain {
    wallet: Address,
    hook: Address,
    head: AtomicU64,
    /// widest range `intents_between` accepts, 0 for no limit
    log_range_limit: AtomicU64,
    fail_balances: AtomicBool,
    balances: Mutex<HashMap<(Address, Address), U256>>,
    calls: Mutex<Vec<ChainCall>>,
    sessions: Mutex<VecDeque<mpsc::UnboundedReceiver<Result<ObservedIntent>>>>,
    history: Mutex<Vec<ObservedIntent>>,
    completion_failures: Mutex<HashMap<B256, String>>,
    completion_gate: Mutex<Option<Arc<Semaphore>>>,
    stalled_receipts: Mutex<HashSet<B256>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockChain {
    pub fn new(wallet: Address, hook: Address) -> Self {
        Self {
            wallet,
            hook,
            head: AtomicU64::new(0),
            log_range_limit: AtomicU64::new(0),
            fail_balances: AtomicBool::new(false),
            balances: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            sessions: Mutex::new(VecDeque::new()),
            history: Mutex::new(Vec::new()),
            completion_failures: Mutex::new(HashMap::new()),
            completion_gate: Mutex::new(None),
            stalled_receipts: Mutex::new(HashSet::new()),
        }
    }

    pub fn set_balance(&self, token: Address, account: Address, amount: U256) {
        lock(&self.balances).insert((token, account), amount);
    }

    pub fn set_head(&self, block_number: u64) {
        self.head.store(block_number, Ordering::SeqCst);
    }

    /// Reject historical queries spanning more than `blocks` blocks, like
    /// hosted nodes do.
    pub fn limit_log_range(&self, blocks: u64) {
        self.log_range_limit.store(blocks, Ordering::SeqCst);
    }

    /// Queue a subscription for the next `watch_intents` call. Without a queued
    /// session `watch_intents` fails.
    pub fn open_session(&self) -> IntentSender {
        let (sender, receiver) = mpsc::unbounded();
        lock(&self.sessions).push_back(receiver);
        sender
    }

    /// Make an intent visible to historical range queries.
    pub fn record_history(&self, observed: ObservedIntent) {
        lock(&self.history).push(observed);
    }

    pub fn fail_balance_queries(&self, fail: bool) {
        self.fail_balances.store(fail, Ordering::SeqCst);
    }

    /// Every completion of `swap_id` is rejected with `reason`.
    pub fn fail_completion(&self, swap_id: B256, reason: &str) {
        lock(&self.completion_failures).insert(swap_id, reason.to_string());
    }

    pub fn clear_completion_failure(&self, swap_id: B256) {
        lock(&self.completion_failures).remove(&swap_id);
    }

    /// The completion of `swap_id` is sent but its receipt never arrives.
    pub fn stall_receipt(&self, swap_id: B256) {
        lock(&self.stalled_receipts).insert(swap_id);
    }

    /// Hold receipts until permits are added to the returned semaphore,
    /// one permit per completion.
    pub fn hold_completions(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *lock(&self.completion_gate) = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<ChainCall> {
        lock(&self.calls).clone()
    }

    pub fn completions(&self) -> Vec<CompletionDecision> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                ChainCall::CompleteSwap(decision) => Some(*decision),
                _ => None,
            })
            .collect()
    }

    pub fn balance_queries(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| matches!(call, ChainCall::BalanceOf { .. }))
            .count()
    }

    pub fn subscriptions(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| matches!(call, ChainCall::WatchIntents))
            .count()
    }

    pub fn intent_queries(&self) -> Vec<(u64, u64)> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                ChainCall::IntentsBetween(from, to) => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    /// Transaction hash the mock reports for a completed swap
    pub fn completion_tx_hash(swap_id: B256) -> B256 {
        keccak256(swap_id)
    }

    fn record(&self, call: ChainCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl HookChain for MockChain {
    fn wallet_address(&self) -> Address {
        self.wallet
    }

    fn hook_address(&self) -> Address {
        self.hook
    }

    async fn latest_block(&self) -> Result<u64> {
        self.record(ChainCall::LatestBlock);
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn watch_intents(&self) -> Result<IntentStream> {
        self.record(ChainCall::WatchIntents);
        let receiver = lock(&self.sessions).pop_front().ok_or_else(|| {
            AgentError::SubscriptionError("filter could not be installed".to_string())
        })?;
        Ok(receiver.boxed())
    }

    async fn intents_between(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ObservedIntent>> {
        self.record(ChainCall::IntentsBetween(from_block, to_block));
        let limit = self.log_range_limit.load(Ordering::SeqCst);
        if limit > 0 && to_block.saturating_sub(from_block) + 1 > limit {
            return Err(AgentError::RpcRequestError(format!(
                "query exceeds max block range {limit}"
            )));
        }
        Ok(lock(&self.history)
            .iter()
            .filter(|observed| {
                observed
                    .block_number
                    .is_some_and(|block| block >= from_block && block <= to_block)
            })
            .cloned()
            .collect())
    }

    async fn balance_of(&self, token: Address, account: Address) -> Result<U256> {
        self.record(ChainCall::BalanceOf { token, account });
        if self.fail_balances.load(Ordering::SeqCst) {
            return Err(AgentError::BalanceQueryError(
                "connection refused".to_string(),
            ));
        }
        Ok(lock(&self.balances)
            .get(&(token, account))
            .copied()
            .unwrap_or_default())
    }

    async fn send_completion(&self, decision: CompletionDecision) -> Result<PendingCompletion> {
        self.record(ChainCall::CompleteSwap(decision));

        let stalled = lock(&self.stalled_receipts).contains(&decision.swap_id);
        let gate = lock(&self.completion_gate).clone();
        let failure = lock(&self.completion_failures)
            .get(&decision.swap_id)
            .cloned();

        Ok(async move {
            if stalled {
                futures::future::pending::<()>().await;
            }
            if let Some(gate) = gate {
                gate.acquire()
                    .await
                    .map_err(|e| AgentError::CompletionSubmitError(e.to_string()))?
                    .forget();
            }
            if let Some(reason) = failure {
                return Err(AgentError::CompletionSubmitError(reason));
            }
            Ok(Self::completion_tx_hash(decision.swap_id))
        }
        .boxed())
    }
}
