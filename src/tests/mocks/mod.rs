//! Mock implementations for testing
//!
//! Builds an [`Orchestrator`] from the mockall-generated service mocks so
//! tests can script each external call.

#![allow(dead_code)]

use std::sync::Arc;

use super::common::png;
use crate::core::generation::{
    MockCritiqueService, MockGarmentGenerator, MockPromptEnhancer, MockTryOnGenerator,
    Orchestrator,
};
use crate::core::media::MockImageEncoder;

// ============================================================================
// Mock Backend
// ============================================================================

/// One mock per external service. Any call without an expectation panics,
/// which is how tests assert that a service was never reached.
pub struct MockBackend {
    pub enhancer: MockPromptEnhancer,
    pub garments: MockGarmentGenerator,
    pub try_on: MockTryOnGenerator,
    pub critic: MockCritiqueService,
    pub encoder: MockImageEncoder,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            enhancer: MockPromptEnhancer::new(),
            garments: MockGarmentGenerator::new(),
            try_on: MockTryOnGenerator::new(),
            critic: MockCritiqueService::new(),
            encoder: MockImageEncoder::new(),
        }
    }

    /// Every remote URL encodes to the test PNG.
    pub fn with_inline_encoder(mut self) -> Self {
        self.encoder.expect_to_inline().returning(|_| Ok(png()));
        self
    }

    pub fn build(self) -> Orchestrator {
        Orchestrator::new(
            Arc::new(self.enhancer),
            Arc::new(self.garments),
            Arc::new(self.try_on),
            Arc::new(self.critic),
            Arc::new(self.encoder),
        )
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}
