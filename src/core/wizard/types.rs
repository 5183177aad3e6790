//! Wizard Domain Types
//!
//! - [`WizardStep`]: the three screens of the try-on flow
//! - [`PendingOperation`]: the in-flight sub-state
//! - [`WizardState`]: the session's current position
//! - [`WizardConfig`]: behaviour knobs loaded from the `[wizard]` config section

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::catalog::ImageAsset;
use crate::core::media::InlineImage;

// ============================================================================
// Steps
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    SelectPerson,
    SelectClothing,
    Result,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [
        WizardStep::SelectPerson,
        WizardStep::SelectClothing,
        WizardStep::Result,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::SelectPerson => "select_person",
            WizardStep::SelectClothing => "select_clothing",
            WizardStep::Result => "result",
        }
    }

    /// One-based position shown on the step cards.
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::SelectPerson => 1,
            WizardStep::SelectClothing => 2,
            WizardStep::Result => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::SelectPerson => "Choose a model",
            WizardStep::SelectClothing => "Choose a garment",
            WizardStep::Result => "Try-on result",
        }
    }

    /// Get the previous step in the wizard flow (None if at the beginning)
    pub fn previous(&self) -> Option<Self> {
        match self {
            WizardStep::SelectPerson => None,
            WizardStep::SelectClothing => Some(WizardStep::SelectPerson),
            WizardStep::Result => Some(WizardStep::SelectClothing),
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for WizardStep {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "select_person" => Ok(WizardStep::SelectPerson),
            "select_clothing" => Ok(WizardStep::SelectClothing),
            "result" => Ok(WizardStep::Result),
            _ => Err(format!("Unknown wizard step: {}", s)),
        }
    }
}

// ============================================================================
// Pending Operation
// ============================================================================

/// At most one generation is in flight per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingOperation {
    #[default]
    None,
    EnhancingPrompt,
    GeneratingGarment,
    GeneratingTryOn,
}

impl PendingOperation {
    pub fn is_pending(&self) -> bool {
        !matches!(self, PendingOperation::None)
    }

    /// Loading line shown while the operation runs.
    pub fn status_text(&self) -> Option<&'static str> {
        match self {
            PendingOperation::None => None,
            PendingOperation::EnhancingPrompt => Some("Refining your design idea..."),
            PendingOperation::GeneratingGarment => Some("Tailoring your garment..."),
            PendingOperation::GeneratingTryOn => Some("Dressing the model..."),
        }
    }
}

// ============================================================================
// Wizard State
// ============================================================================

/// Read-only view of the session's position. Only
/// [`Session`](super::Session) mutates it.
#[derive(Debug, Clone, Default)]
pub struct WizardState {
    pub step: WizardStep,
    pub selected_person: Option<Arc<ImageAsset>>,
    pub selected_clothing: Option<Arc<ImageAsset>>,
    pub result_image: Option<InlineImage>,
    pub critique: Option<String>,
    pub pending: PendingOperation,
    pub error_message: Option<String>,
    /// Most recent enhanced garment prompt.
    pub enhanced_prompt: Option<String>,
    /// History entry the shown result came from.
    pub result_history_id: Option<String>,
}

impl WizardState {
    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn selected_person_id(&self) -> Option<&str> {
        self.selected_person.as_deref().map(|a| a.id.as_str())
    }

    pub fn selected_clothing_id(&self) -> Option<&str> {
        self.selected_clothing.as_deref().map(|a| a.id.as_str())
    }

    /// Whether a try-on could be requested right now.
    pub fn can_try_on(&self) -> bool {
        !self.is_pending() && self.selected_person.is_some() && self.selected_clothing.is_some()
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Drop the garment selection when navigating back to the model step.
    pub clear_clothing_on_back: bool,
}
