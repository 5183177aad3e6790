pub mod assets;
pub mod catalog;
pub mod credentials;
pub mod generation;
pub mod history;
pub mod llm;
pub mod logging;
pub mod media;
pub mod wizard;
