//! Google Provider Implementation (API Key-based)
//!
//! Talks to Google's Generative Language API (`generateContent`) and
//! implements every generation service the wizard needs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::GeminiConfig;
use crate::core::generation::prompts::{
    self, CRITIQUE_EMPTY_FALLBACK, CRITIQUE_INSTRUCTIONS, TRY_ON_INSTRUCTIONS,
};
use crate::core::generation::{
    CritiqueService, GarmentGenerator, GenerationError, PromptEnhancer, Result, TryOnGenerator,
};
use crate::core::llm::types::{GenerateContentRequest, GenerateContentResponse, ImageConfig, Part};
use crate::core::media::InlineImage;

/// Google provider (API key-based)
pub struct GoogleProvider {
    api_key: String,
    config: GeminiConfig,
    client: Client,
}

impl GoogleProvider {
    pub fn new(api_key: impl Into<String>, config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        // Trim the API key at construction to ensure consistency with validation
        Ok(Self {
            api_key: api_key.into().trim().to_string(),
            config: config.clone(),
            client,
        })
    }

    /// Point the provider at another endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Check if an API key has valid Google API key format.
    ///
    /// Google API keys typically start with "AIza". This is a pure format check
    /// and does not verify the key is actually valid with Google's API.
    ///
    /// # Examples
    ///
    /// ```
    /// use wearai::core::llm::GoogleProvider;
    ///
    /// assert!(GoogleProvider::is_valid_api_key_format("AIzaSyD12345abcdef"));
    /// assert!(!GoogleProvider::is_valid_api_key_format("invalid-key"));
    /// assert!(!GoogleProvider::is_valid_api_key_format(""));
    /// ```
    pub fn is_valid_api_key_format(key: &str) -> bool {
        let trimmed = key.trim();
        !trimmed.is_empty() && trimmed.starts_with("AIza")
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        if self.api_key.is_empty() {
            return Err(GenerationError::MissingCredential);
        }

        let start = std::time::Instant::now();
        let resp = self
            .client
            .post(self.endpoint(model))
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(model, status = status.as_u16(), latency_ms, "generateContent returned");

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GenerationError::api(status.as_u16(), text));
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn generate_image(&self, model: &str, request: &GenerateContentRequest) -> Result<InlineImage> {
        let response = self.generate(model, request).await?;
        match response.first_image() {
            Some(image) => Ok(image.clone()),
            None => {
                warn!(model, finish_reason = ?response.finish_reason(), "response carried no image");
                Err(GenerationError::NoImage)
            }
        }
    }
}

#[async_trait]
impl PromptEnhancer for GoogleProvider {
    async fn enhance(&self, text: &str) -> Result<String> {
        let request = GenerateContentRequest::new(vec![Part::text(prompts::enhance_prompt(text))]);
        let response = self.generate(&self.config.text_model, &request).await?;
        Ok(response
            .text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| text.to_string()))
    }
}

#[async_trait]
impl GarmentGenerator for GoogleProvider {
    async fn generate_garment(&self, prompt: &str) -> Result<InlineImage> {
        let request = GenerateContentRequest::new(vec![Part::text(prompts::garment_prompt(prompt))])
            .with_image_config(ImageConfig {
                aspect_ratio: self.config.garment_aspect_ratio.clone(),
                image_size: None,
            });
        self.generate_image(&self.config.garment_model, &request).await
    }
}

#[async_trait]
impl TryOnGenerator for GoogleProvider {
    async fn generate_try_on(&self, person: &InlineImage, clothing: &InlineImage) -> Result<InlineImage> {
        let request = GenerateContentRequest::new(vec![
            Part::image(person),
            Part::image(clothing),
            Part::text(TRY_ON_INSTRUCTIONS),
        ])
        .with_image_config(ImageConfig {
            aspect_ratio: self.config.try_on_aspect_ratio.clone(),
            image_size: Some(self.config.try_on_image_size.clone()),
        });
        self.generate_image(&self.config.try_on_model, &request).await
    }
}

#[async_trait]
impl CritiqueService for GoogleProvider {
    async fn critique(&self, person: &InlineImage, clothing: &InlineImage) -> Result<String> {
        let request = GenerateContentRequest::new(vec![
            Part::image(person),
            Part::image(clothing),
            Part::text(CRITIQUE_INSTRUCTIONS),
        ]);
        let response = self.generate(&self.config.text_model, &request).await?;
        Ok(response
            .text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| CRITIQUE_EMPTY_FALLBACK.to_string()))
    }
}
