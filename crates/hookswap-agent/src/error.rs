use hookswap_primitives::PrimitivesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("Connection fault: {0}")]
    ConnectionFault(String),
    #[error("Failed to subscribe to intent events: {0}")]
    SubscriptionError(String),
    #[error("Failed rpc request: {0}")]
    RpcRequestError(String),
    #[error("Failed balance query: {0}")]
    BalanceQueryError(String),
    #[error("Failed to submit completion: {0}")]
    CompletionSubmitError(String),
    #[error("Completion transaction reverted: {0}")]
    CompletionReverted(String),
    #[error("Listener task failed: {0}")]
    ListenerTaskError(String),
    #[error("Primitives error: {0}")]
    PrimitivesError(#[from] PrimitivesError),
}

impl AgentError {
    /// Whether the hook rejected the completion because the intent was already
    /// completed, which happens on redelivered events.
    pub fn is_already_completed(&self) -> bool {
        match self {
            AgentError::CompletionSubmitError(msg) | AgentError::CompletionReverted(msg) => {
                let msg = msg.to_ascii_lowercase();
                msg.contains("already completed") || msg.contains("alreadycompleted")
            }
            _ => false,
        }
    }
}

pub type Result<T> = core::result::Result<T, AgentError>;
