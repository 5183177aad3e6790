//! Secure Credential Storage
//!
//! Uses the system keychain (Keyring) for the Gemini API key, with an
//! environment variable taking precedence.

use async_trait::async_trait;
use keyring::Entry;
use thiserror::Error;

const SERVICE_NAME: &str = "wearai";
const GEMINI_KEY_ENTRY: &str = "gemini_api_key";

/// Environment variable that overrides the stored key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Keyring error: {0}")]
    KeyringError(#[from] keyring::Error),

    #[error("Credential not found: {0}")]
    NotFound(String),

    #[error("Invalid credential format")]
    InvalidFormat,
}

pub type Result<T> = std::result::Result<T, CredentialError>;

// ============================================================================
// Credential Manager
// ============================================================================

pub struct CredentialManager {
    service: String,
}

impl Default for CredentialManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialManager {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Store a raw string secret
    pub fn store_secret(&self, key: &str, value: &str) -> Result<()> {
        let entry = Entry::new(&self.service, key)?;
        entry.set_password(value)?;
        log::info!("Stored secret for key: {}", key);
        Ok(())
    }

    /// Retrieve a raw string secret
    pub fn get_secret(&self, key: &str) -> Result<String> {
        let entry = Entry::new(&self.service, key)?;
        match entry.get_password() {
            Ok(value) => Ok(value),
            Err(keyring::Error::NoEntry) => Err(CredentialError::NotFound(key.to_string())),
            Err(e) => Err(CredentialError::KeyringError(e)),
        }
    }

    /// Delete a secret
    pub fn delete_secret(&self, key: &str) -> Result<()> {
        let entry = Entry::new(&self.service, key)?;
        match entry.delete_password() {
            Ok(()) => {
                log::info!("Deleted secret for key: {}", key);
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted
            Err(e) => Err(CredentialError::KeyringError(e)),
        }
    }
}

// ============================================================================
// Credential Provider
// ============================================================================

/// Gates the wizard: without a usable key only the key-setup screen is shown.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    fn has_valid_credential(&self) -> bool;

    /// Resolve the key to use for generation calls.
    async fn request_credential(&self) -> Result<String>;
}

/// Environment override first, then the system keychain.
pub struct KeyringCredentialProvider {
    manager: CredentialManager,
    env_key: Option<String>,
}

impl KeyringCredentialProvider {
    /// Reads `GEMINI_API_KEY` once, at construction.
    pub fn from_env(manager: CredentialManager) -> Self {
        Self::with_override(manager, std::env::var(API_KEY_ENV).ok())
    }

    pub fn with_override(manager: CredentialManager, env_key: Option<String>) -> Self {
        let env_key = env_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self { manager, env_key }
    }

    /// Validate and persist a key entered by the user.
    pub fn store_credential(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if !validate_api_key(key) {
            return Err(CredentialError::InvalidFormat);
        }
        self.manager.store_secret(GEMINI_KEY_ENTRY, key)
    }

    pub fn forget_credential(&self) -> Result<()> {
        self.manager.delete_secret(GEMINI_KEY_ENTRY)
    }

    fn resolve(&self) -> Result<String> {
        if let Some(key) = &self.env_key {
            if validate_api_key(key) {
                return Ok(key.clone());
            }
            log::warn!("{} is set but is not a Gemini key, ignoring it", API_KEY_ENV);
        }
        let key = self.manager.get_secret(GEMINI_KEY_ENTRY)?;
        if validate_api_key(&key) {
            Ok(key)
        } else {
            Err(CredentialError::InvalidFormat)
        }
    }
}

#[async_trait]
impl CredentialProvider for KeyringCredentialProvider {
    fn has_valid_credential(&self) -> bool {
        self.resolve().is_ok()
    }

    async fn request_credential(&self) -> Result<String> {
        self.resolve()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Mask an API key for display (show first 4 and last 4 chars)
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Validate a Gemini API key format
pub fn validate_api_key(key: &str) -> bool {
    key.trim().starts_with("AIza")
}
