//! Error types for the generation services and their classification.

use thiserror::Error;

use crate::core::media::MediaError;

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, GenerationError>;

/// API message fragments that indicate the key lacks access to a model.
const ENTITLEMENT_MARKERS: &[&str] = &["Requested entity was not found", "PERMISSION_DENIED"];

/// Shown when a garment could not be generated.
pub const GARMENT_FAILED_MESSAGE: &str = "Garment generation failed, please try again.";
/// Shown when a try-on could not be generated.
pub const TRY_ON_FAILED_MESSAGE: &str = "Try-on generation failed, please try again later.";
/// Shown when the API key is not entitled to the requested model.
pub const ENTITLEMENT_MESSAGE: &str =
    "API key permission error: please select a key from a paid project.";

#[derive(Error, Debug)]
pub enum GenerationError {
    /// Non-success response from the generation API.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The model answered but produced no image part.
    #[error("No image generated")]
    NoImage,

    #[error("Image error: {0}")]
    Media(#[from] MediaError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No API key configured")]
    MissingCredential,
}

impl GenerationError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        GenerationError::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether this failure means the credentials are not entitled to the model.
    ///
    /// Any HTTP 403 counts, whatever its message; other statuses are matched
    /// on the error text.
    pub fn is_entitlement(&self) -> bool {
        match self {
            GenerationError::Api { status, message } => {
                *status == 403 || ENTITLEMENT_MARKERS.iter().any(|m| message.contains(m))
            }
            GenerationError::MissingCredential => true,
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GenerationError::Api { status, .. } => Some(*status),
            GenerationError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Coarse failure category driving how the wizard reacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credentials are missing or not entitled; the key must be re-selected.
    Entitlement,
    /// Anything else.
    Generic,
}

/// Cloneable, classified form of a [`GenerationError`] carried in completions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl GenerationFailure {
    pub fn generic(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Generic,
            detail: detail.into(),
        }
    }

    pub fn is_entitlement(&self) -> bool {
        self.kind == FailureKind::Entitlement
    }

    /// User-facing message, given the generic message for the operation.
    pub fn user_message(&self, generic: &str) -> String {
        match self.kind {
            FailureKind::Entitlement => ENTITLEMENT_MESSAGE.to_string(),
            FailureKind::Generic => generic.to_string(),
        }
    }
}

impl From<&GenerationError> for GenerationFailure {
    fn from(err: &GenerationError) -> Self {
        let kind = if err.is_entitlement() {
            FailureKind::Entitlement
        } else {
            FailureKind::Generic
        };
        Self {
            kind,
            detail: err.to_string(),
        }
    }
}

impl From<GenerationError> for GenerationFailure {
    fn from(err: GenerationError) -> Self {
        Self::from(&err)
    }
}
