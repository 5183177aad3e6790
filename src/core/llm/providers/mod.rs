//! Generation providers.

mod google;

pub use google::GoogleProvider;
