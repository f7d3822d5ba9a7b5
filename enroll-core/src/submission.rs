//! Final submission boundary.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::EnrollmentAnswer;

/// Default artificial latency of [`SimulatedSubmitter`].
pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("submission rejected: {0}")]
    Rejected(String),

    #[error("submission failed: {0}")]
    Transport(String),
}

/// Acknowledgement of an accepted enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub email: String,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionReceipt {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            submitted_at: Utc::now(),
        }
    }

    /// Confirmation line shown to the user.
    pub fn confirmation(&self) -> String {
        format!("We have sent a confirmation email to {}", self.email)
    }
}

/// Accepts a completed enrollment record.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(
        &self,
        answer: &EnrollmentAnswer,
    ) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Stand-in for a real backend: waits a fixed delay, logs the payload and
/// always accepts.
#[derive(Debug, Clone)]
pub struct SimulatedSubmitter {
    delay: Duration,
}

impl SimulatedSubmitter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedSubmitter {
    fn default() -> Self {
        Self::new(DEFAULT_SUBMIT_DELAY)
    }
}

#[async_trait]
impl Submitter for SimulatedSubmitter {
    async fn submit(
        &self,
        answer: &EnrollmentAnswer,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        tokio::time::sleep(self.delay).await;

        let payload = serde_json::to_string_pretty(answer)
            .map_err(|e| SubmissionError::Rejected(format!("payload not serializable: {e}")))?;
        info!("final payload:\n{payload}");

        Ok(SubmissionReceipt::new(
            answer.email.clone().unwrap_or_default(),
        ))
    }
}
