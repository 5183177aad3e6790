//! Generation Orchestrator
//!
//! Sequences the external services for garment and try-on generation and
//! turns every outcome into a [`Completion`]. Nothing escapes as an error:
//! failures are logged, classified and carried inside the completion.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::error::{GenerationError, GenerationFailure, Result};
use super::jobs::{Completion, GarmentJob, TryOnJob, TryOnOutput};
use super::prompts::{CRITIQUE_EMPTY_FALLBACK, CRITIQUE_ERROR_FALLBACK};
use super::services::{CritiqueService, GarmentGenerator, PromptEnhancer, TryOnGenerator};
use crate::core::catalog::ImageAsset;
use crate::core::media::{ImageEncoder, InlineImage};
use crate::core::wizard::Session;

pub struct Orchestrator {
    enhancer: Arc<dyn PromptEnhancer>,
    garments: Arc<dyn GarmentGenerator>,
    try_on: Arc<dyn TryOnGenerator>,
    critic: Arc<dyn CritiqueService>,
    encoder: Arc<dyn ImageEncoder>,
}

impl Orchestrator {
    pub fn new(
        enhancer: Arc<dyn PromptEnhancer>,
        garments: Arc<dyn GarmentGenerator>,
        try_on: Arc<dyn TryOnGenerator>,
        critic: Arc<dyn CritiqueService>,
        encoder: Arc<dyn ImageEncoder>,
    ) -> Self {
        Self {
            enhancer,
            garments,
            try_on,
            critic,
            encoder,
        }
    }

    /// Use one provider for every generation service.
    pub fn with_provider<P>(provider: Arc<P>, encoder: Arc<dyn ImageEncoder>) -> Self
    where
        P: PromptEnhancer + GarmentGenerator + TryOnGenerator + CritiqueService + 'static,
    {
        Self::new(
            provider.clone(),
            provider.clone(),
            provider.clone(),
            provider,
            encoder,
        )
    }

    // ========================================================================
    // Session-driving operations
    // ========================================================================

    /// Generate a garment from `prompt` and select it.
    ///
    /// Returns `false` without calling any service when the session refuses
    /// to begin (blank prompt, wrong step, or an operation already pending).
    pub async fn generate_garment_from_prompt(&self, session: &mut Session, prompt: &str) -> bool {
        let Some(job) = session.begin_garment(prompt) else {
            return false;
        };
        self.run_garment(job, |completion| session.apply(completion)).await;
        true
    }

    /// Run the try-on for the session's current selections.
    ///
    /// Returns `false` when the session refuses to begin.
    pub async fn generate_try_on(&self, session: &mut Session) -> bool {
        let Some(job) = session.request_try_on() else {
            return false;
        };
        let completion = self.run_try_on(job).await;
        session.apply(completion);
        true
    }

    // ========================================================================
    // Job runners (no session access)
    // ========================================================================

    /// Enhance, then generate. Emits `PromptEnhanced` followed by `Garment`.
    #[tracing::instrument(skip_all, fields(ticket = job.ticket.value()))]
    pub async fn run_garment<F>(&self, job: GarmentJob, mut emit: F)
    where
        F: FnMut(Completion) + Send,
    {
        let enhanced = self.enhance_prompt(&job.prompt).await;
        emit(Completion::PromptEnhanced {
            ticket: job.ticket,
            enhanced_prompt: enhanced.clone(),
        });

        let outcome = match self.garments.generate_garment(&enhanced).await {
            Ok(image) => {
                info!(mime = %image.mime_type, "garment generated");
                Ok(image)
            }
            Err(e) => Err(classify("garment", e)),
        };

        emit(Completion::Garment {
            ticket: job.ticket,
            prompt: job.prompt,
            outcome,
        });
    }

    #[tracing::instrument(skip_all, fields(ticket = job.ticket.value(), person = %job.person.id, clothing = %job.clothing.id))]
    pub async fn run_try_on(&self, job: TryOnJob) -> Completion {
        let outcome = match self.compose(&job.person, &job.clothing).await {
            Ok(output) => {
                info!(mime = %output.image.mime_type, "try-on generated");
                Ok(output)
            }
            Err(e) => Err(classify("try-on", e)),
        };

        Completion::TryOn {
            ticket: job.ticket,
            person: job.person,
            clothing: job.clothing,
            outcome,
        }
    }

    /// Best-effort enhancement; any failure falls back to the original text.
    pub async fn enhance_prompt(&self, prompt: &str) -> String {
        match self.enhancer.enhance(prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!(enhanced = %text.trim(), "prompt enhanced");
                text.trim().to_string()
            }
            Ok(_) => prompt.to_string(),
            Err(e) => {
                warn!(error = %e, "prompt enhancement failed, using original prompt");
                prompt.to_string()
            }
        }
    }

    async fn compose(&self, person: &ImageAsset, clothing: &ImageAsset) -> Result<TryOnOutput> {
        let person_image = person.image.to_inline(self.encoder.as_ref()).await?;
        let clothing_image = clothing.image.to_inline(self.encoder.as_ref()).await?;

        // Both calls only need the encoded inputs; a critique failure never
        // fails the join.
        let image = self.try_on.generate_try_on(&person_image, &clothing_image);
        let critique = self.critique_or_fallback(&person_image, &clothing_image);

        let (image, critique) = futures::future::try_join(image, critique).await?;
        Ok(TryOnOutput { image, critique })
    }

    async fn critique_or_fallback(&self, person: &InlineImage, clothing: &InlineImage) -> Result<String> {
        let text = match self.critic.critique(person, clothing).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => CRITIQUE_EMPTY_FALLBACK.to_string(),
            Err(e) => {
                warn!(error = %e, "critique failed, using fallback");
                CRITIQUE_ERROR_FALLBACK.to_string()
            }
        };
        Ok(text)
    }
}

fn classify(operation: &'static str, err: GenerationError) -> GenerationFailure {
    let failure = GenerationFailure::from(&err);
    if failure.is_entitlement() {
        error!(operation, error = %err, "credentials rejected by generation service");
    } else {
        error!(operation, error = %err, "generation failed");
    }
    failure
}
