//! Capability contracts for the external generation services.
//!
//! The orchestrator only talks to these traits. [`GoogleProvider`] implements
//! all four against the Gemini API; tests substitute mocks.
//!
//! [`GoogleProvider`]: crate::core::llm::GoogleProvider

use async_trait::async_trait;

use super::error::Result;
use crate::core::media::InlineImage;

/// Rewrites a short garment idea into a detailed image prompt. Best effort.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PromptEnhancer: Send + Sync {
    async fn enhance(&self, text: &str) -> Result<String>;
}

/// Produces a garment image from a text prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GarmentGenerator: Send + Sync {
    async fn generate_garment(&self, prompt: &str) -> Result<InlineImage>;
}

/// Composites a person wearing a garment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TryOnGenerator: Send + Sync {
    async fn generate_try_on(&self, person: &InlineImage, clothing: &InlineImage) -> Result<InlineImage>;
}

/// Writes a short fashion critique of a person/garment pairing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CritiqueService: Send + Sync {
    async fn critique(&self, person: &InlineImage, clothing: &InlineImage) -> Result<String>;
}
