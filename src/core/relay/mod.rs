//! Trigger / poll / extract pipeline against the upstream agent service.

mod extract;
mod poll;
mod submit;
mod transport;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use extract::extract;
pub use poll::{PollState, can_transition, poll};
pub use submit::submit;
pub use transport::{HttpTransport, JobTransport, TriggerRequest};
pub use types::{
    Agent, Conversation, ConversationTurn, FALLBACK_REPLY, Job, JobStatus, Reply, Role,
    StatusKind, StatusUpdate,
};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("error triggering agent: {0}")]
    Submit(String),
    #[error("invalid job information: {0}")]
    InvalidJob(String),
    #[error("error polling job: {0}")]
    Poll(String),
    #[error("max retries reached after {attempts} attempts, the agent may still be processing")]
    Timeout { attempts: u32 },
}

impl RelayError {
    /// Timeouts are a warning, not a hard failure.
    pub fn is_soft(&self) -> bool {
        matches!(self, RelayError::Timeout { .. })
    }
}

/// Retry budget for the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(3),
        }
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
