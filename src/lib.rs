/// WearAI - AI-powered virtual try-on (TUI Edition)
///
/// Core library: preset and uploaded assets, the try-on wizard state
/// machine, Gemini-backed garment and try-on generation, and the session
/// history of results.

pub mod config;
pub mod core;
pub mod tui;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
