//! Vectorized environments.
mod base;
mod config;
mod serial;

pub use base::{VecEnv, VecStep};
pub use config::SerialVecEnvConfig;
pub use serial::SerialVecEnv;
