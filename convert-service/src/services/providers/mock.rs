//! Mock provider implementation for testing.

use super::{
    FinishReason, GenerationParams, ImagePayload, ProviderError, ProviderResponse, VisionProvider,
};
use async_trait::async_trait;
use std::sync::Mutex;

enum Behavior {
    Respond(String),
    Fail(ProviderError),
}

/// A call captured by [`MockVisionProvider`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub image: ImagePayload,
    pub params: GenerationParams,
}

/// Scripted provider: always answers with the same text or the same error.
pub struct MockVisionProvider {
    behavior: Behavior,
    healthy: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockVisionProvider {
    pub fn responding(text: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Respond(text.into()),
            healthy: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            behavior: Behavior::Fail(error),
            healthy: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make `health_check` report the provider as not configured.
    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn extract(
        &self,
        prompt: &str,
        image: &ImagePayload,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedCall {
                prompt: prompt.to_string(),
                image: image.clone(),
                params: params.clone(),
            });

        match &self.behavior {
            Behavior::Respond(text) => Ok(ProviderResponse {
                text: text.clone(),
                input_tokens: prompt.len() as u32 / 4,
                output_tokens: text.len() as u32 / 4,
                finish_reason: FinishReason::Complete,
            }),
            Behavior::Fail(error) => Err(error.clone()),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.healthy {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock vision provider not enabled".to_string(),
            ))
        }
    }
}
