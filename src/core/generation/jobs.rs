//! Hand-off types between the wizard session and the orchestrator.
//!
//! A [`Session`](crate::core::wizard::Session) begins an operation and hands
//! out a job; the orchestrator runs it without touching the session and
//! resolves it into [`Completion`]s, which the session then applies.

use std::fmt;
use std::sync::Arc;

use super::error::GenerationFailure;
use crate::core::catalog::ImageAsset;
use crate::core::media::InlineImage;

/// Identifies one begun operation. Completions carrying a ticket that is no
/// longer active are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationTicket(u64);

impl OperationTicket {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OperationTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A try-on to run for a fixed person/garment pair.
#[derive(Debug, Clone)]
pub struct TryOnJob {
    pub ticket: OperationTicket,
    pub person: Arc<ImageAsset>,
    pub clothing: Arc<ImageAsset>,
}

/// A garment to generate from the user's prompt.
#[derive(Debug, Clone)]
pub struct GarmentJob {
    pub ticket: OperationTicket,
    /// The prompt exactly as the user typed it.
    pub prompt: String,
}

/// Successful try-on: the composite plus its critique.
#[derive(Debug, Clone, PartialEq)]
pub struct TryOnOutput {
    pub image: InlineImage,
    pub critique: String,
}

/// Result of (part of) an operation, applied to the session in one step.
#[derive(Debug, Clone)]
pub enum Completion {
    /// Prompt enhancement finished; the garment image is being generated next.
    PromptEnhanced {
        ticket: OperationTicket,
        enhanced_prompt: String,
    },
    Garment {
        ticket: OperationTicket,
        prompt: String,
        outcome: Result<InlineImage, GenerationFailure>,
    },
    TryOn {
        ticket: OperationTicket,
        person: Arc<ImageAsset>,
        clothing: Arc<ImageAsset>,
        outcome: Result<TryOnOutput, GenerationFailure>,
    },
}

impl Completion {
    pub fn ticket(&self) -> OperationTicket {
        match self {
            Completion::PromptEnhanced { ticket, .. }
            | Completion::Garment { ticket, .. }
            | Completion::TryOn { ticket, .. } => *ticket,
        }
    }
}
