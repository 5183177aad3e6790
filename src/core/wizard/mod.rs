//! Wizard State Machine for virtual try-on
//!
//! # Overview
//!
//! The wizard guides the user through three steps:
//! 1. SelectPerson - pick or upload a model
//! 2. SelectClothing - pick, upload or generate a garment
//! 3. Result - the try-on composite and its critique
//!
//! `reset()` returns to the first step from anywhere, keeping the model.
//!
//! Asynchronous work never borrows the [`Session`]. An operation is begun on
//! the session (which hands out a job), run by the
//! [`Orchestrator`](crate::core::generation::Orchestrator), and its
//! completion is applied back to the session in one step.

mod session;
mod types;

pub use session::*;
pub use types::*;
