pub mod agent;
pub mod attempts;
pub mod backoff;
pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod listener;
pub mod policy;
pub mod reporter;
pub mod utils;

pub use error::{AgentError, Result};
