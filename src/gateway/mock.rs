//! Scripted gateway for tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::models::{EvaluationRequest, EvaluationResult};
use super::policy::{EvaluationGateway, GatewayError};

/// Replays a fixed list of responses and records every request
pub struct ScriptedGateway {
    responses: Mutex<VecDeque<Result<EvaluationResult, GatewayError>>>,
    requests: Mutex<Vec<EvaluationRequest>>,
}

impl ScriptedGateway {
    pub fn new(responses: Vec<Result<EvaluationResult, GatewayError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<EvaluationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EvaluationGateway for ScriptedGateway {
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationResult, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Unavailable("no scripted response".to_string())))
    }
}
