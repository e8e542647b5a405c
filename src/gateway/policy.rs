//! Timeout and retry policy for gateway calls

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::models::{EvaluationRequest, EvaluationResult};
use crate::config::GatewayConfig;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Evaluation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Evaluation service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid evaluation response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Timeout(_) | GatewayError::Unavailable(_))
    }
}

/// Remote natural-language evaluation service
#[async_trait]
pub trait EvaluationGateway: Send + Sync {
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationResult, GatewayError>;
}

/// Bounds every call with a timeout and retries transient failures
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for GatewayPolicy {
    fn default() -> Self {
        Self::from(&GatewayConfig::default())
    }
}

impl From<&GatewayConfig> for GatewayPolicy {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

impl GatewayPolicy {
    pub async fn evaluate(
        &self,
        gateway: &dyn EvaluationGateway,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, GatewayError> {
        let mut attempt = 0;
        loop {
            let outcome = match tokio::time::timeout(self.timeout, gateway.evaluate(request)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(GatewayError::Timeout(self.timeout)),
            };

            match outcome {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "Evaluation failed ({}), retrying {}/{}",
                        e,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    log::warn!("Evaluation failed: {}", e);
                    return Err(e);
                }
            }
        }
    }
}
