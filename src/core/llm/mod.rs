//! Gemini client
//!
//! [`GoogleProvider`] implements the generation service traits against the
//! Generative Language API; `types` holds its wire format.

pub mod providers;
pub mod types;

pub use providers::GoogleProvider;
