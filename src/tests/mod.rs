//! In-crate test suite: shared fixtures, mock backends, unit scenarios and
//! property tests.

mod common;
mod mocks;
mod unit;
