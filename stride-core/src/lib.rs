#![warn(missing_docs)]
//! Core abstractions for normalized vectorized environments.
//!
//! This crate defines the contracts that the rest of the workspace builds on:
//!
//! * [`Env`] - a single environment instance, built from a configuration and
//!   a random seed.
//! * [`Step`] - the observation/reward/done tuple emitted at every
//!   interaction step.
//! * [`Space`] - observation and action space descriptors.
//! * [`record::Record`] - a container for diagnostics emitted along the
//!   step/reset path.
//!
//! Vectorized execution and normalization live in `stride-vec-env`, which
//! implements these contracts over batches of environment slots.
pub mod error;
pub mod record;

mod base;
pub use base::{Env, Info, Step};

mod spaces;
pub use spaces::Space;
