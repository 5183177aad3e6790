pub mod key_setup;
pub mod wizard;
