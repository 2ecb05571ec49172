//! Mock provider for tests and offline runs.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use aceprep_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage};

use crate::error::ProviderError;

#[derive(Debug, Clone)]
enum Behaviour {
    /// First route whose key occurs in the prompt wins, else the default.
    Respond {
        routes: Vec<(String, String)>,
        default_response: String,
    },
    /// Every call fails with a network error carrying this message.
    Fail(String),
}

/// A scripted [`LlmProvider`] that never touches the network.
///
/// Records the number of calls and the last request received.
pub struct MockProvider {
    behaviour: Behaviour,
    call_count: AtomicU32,
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Route by prompt substring. Routes are tried in order.
    pub fn new(routes: Vec<(String, String)>, default_response: &str) -> Self {
        Self::with_behaviour(Behaviour::Respond {
            routes,
            default_response: default_response.to_string(),
        })
    }

    /// Always return the same body.
    pub fn with_fixed_response(response: &str) -> Self {
        Self::new(Vec::new(), response)
    }

    /// Fail every call.
    pub fn failing(message: &str) -> Self {
        Self::with_behaviour(Behaviour::Fail(message.to_string()))
    }

    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        let content = match &self.behaviour {
            Behaviour::Fail(message) => {
                return Err(ProviderError::NetworkError(message.clone()).into());
            }
            Behaviour::Respond {
                routes,
                default_response,
            } => routes
                .iter()
                .find(|(key, _)| request.prompt.contains(key.as_str()))
                .map(|(_, body)| body.clone())
                .unwrap_or_else(|| default_response.clone()),
        };

        // Rough estimate: four characters per token.
        let prompt_tokens = (request.prompt.len() / 4) as u32;
        let completion_tokens = (content.len() / 4) as u32;

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
                estimated_cost_usd: 0.0,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
            cost_per_1k_input: 0.0,
            cost_per_1k_output: 0.0,
        }]
    }
}
