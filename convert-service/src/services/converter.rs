//! Image-to-CSV conversion: encode, prompt, call the model, clean up.

use crate::error::ConvertError;
use crate::models::{ImageUpload, OutputFormat};
use crate::services::cleanup::clean_model_output;
use crate::services::metrics;
use crate::services::prompts::prompt_for;
use crate::services::providers::{GenerationParams, ImagePayload, ProviderError, VisionProvider};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct ImageConverter {
    provider: Arc<dyn VisionProvider>,
    params: GenerationParams,
}

impl ImageConverter {
    pub fn new(provider: Arc<dyn VisionProvider>, params: GenerationParams) -> Self {
        Self { provider, params }
    }

    pub fn provider(&self) -> &Arc<dyn VisionProvider> {
        &self.provider
    }

    /// Convert a validated image into cleaned CSV text.
    pub async fn convert(
        &self,
        image: &ImageUpload,
        format: OutputFormat,
    ) -> Result<String, ConvertError> {
        let result = self.run(image, format).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.outcome(),
        };
        metrics::record_conversion(format.as_str(), outcome);

        result
    }

    async fn run(&self, image: &ImageUpload, format: OutputFormat) -> Result<String, ConvertError> {
        let payload = ImagePayload {
            mime_type: image.mime_type.clone(),
            data_base64: STANDARD.encode(&image.bytes),
        };
        let prompt = prompt_for(format);

        let started = Instant::now();
        let response = self.provider.extract(prompt, &payload, &self.params).await;
        let elapsed = started.elapsed();
        metrics::record_upstream_latency(self.provider.name(), elapsed.as_secs_f64());

        let response = response.map_err(|e| {
            tracing::error!(
                provider = self.provider.name(),
                error_kind = e.kind(),
                error = %e,
                elapsed_ms = elapsed.as_millis() as u64,
                "Vision provider call failed"
            );
            ConvertError::from(e)
        })?;

        metrics::record_tokens(
            self.provider.name(),
            response.input_tokens,
            response.output_tokens,
        );

        if response.text.is_empty() {
            tracing::warn!(
                provider = self.provider.name(),
                finish_reason = ?response.finish_reason,
                "Empty response from vision provider"
            );
            return Err(ConvertError::NoDataExtracted);
        }

        let cleaned = clean_model_output(&response.text);
        if cleaned.is_empty() {
            tracing::warn!(
                raw_len = response.text.len(),
                "Model output was empty after cleanup"
            );
            return Err(ConvertError::NoReadableData);
        }

        tracing::info!(
            format = %format,
            image_bytes = image.size(),
            output_bytes = cleaned.len(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            elapsed_ms = elapsed.as_millis() as u64,
            "Image converted"
        );

        Ok(cleaned)
    }
}

impl From<ProviderError> for ConvertError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(_) => ConvertError::NotConfigured,
            ProviderError::RateLimited => ConvertError::UpstreamBusy,
            ProviderError::ApiError { status, .. } => ConvertError::UpstreamFailed { status },
            ProviderError::Timeout(_) => ConvertError::Timeout,
            ProviderError::ContentFiltered => ConvertError::NoDataExtracted,
            ProviderError::NetworkError(msg) | ProviderError::InvalidResponse(msg) => {
                ConvertError::Unexpected(msg)
            }
        }
    }
}
