//! Generation Orchestrator
//!
//! Calls the external prompt-enhancement, garment, try-on and critique
//! services on behalf of the wizard.
//!
//! # Module Structure
//!
//! - `services`: capability traits for the external services
//! - `jobs`: jobs handed out by the session and completions handed back
//! - `orchestrator`: sequencing, concurrency and failure classification
//! - `error`: `GenerationError` and its user-facing classification
//! - `prompts`: prompt templates and critique fallbacks

pub mod error;
pub mod jobs;
pub mod orchestrator;
pub mod prompts;
pub mod services;

pub use error::{
    FailureKind, GenerationError, GenerationFailure, Result, ENTITLEMENT_MESSAGE,
    GARMENT_FAILED_MESSAGE, TRY_ON_FAILED_MESSAGE,
};
pub use jobs::{Completion, GarmentJob, OperationTicket, TryOnJob, TryOnOutput};
pub use orchestrator::Orchestrator;
pub use services::{CritiqueService, GarmentGenerator, PromptEnhancer, TryOnGenerator};

#[cfg(test)]
pub use services::{MockCritiqueService, MockGarmentGenerator, MockPromptEnhancer, MockTryOnGenerator};
