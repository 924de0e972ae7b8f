//! Types for recording diagnostics along the step/reset path.
//!
//! A [`Record`] is a string-keyed container of heterogeneous values. Every
//! environment step returns one next to the step data, and normalization
//! filters merge their own diagnostics into it, so a training loop can log
//! whatever the stack produced without each layer knowing about the sink.
mod base;

pub use base::{Record, RecordValue};
