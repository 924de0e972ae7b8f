#![warn(missing_docs)]
//! Normalized vectorized environments.
//!
//! This crate composes three pieces around the contracts of `stride-core`:
//!
//! * [`SerialVecEnv`] executes N [`Env`](stride_core::Env) slots behind the
//!   batched [`VecEnv`] interface, seeding slot `i` with `seed + i`,
//!   restarting finished episodes and truncating at a configurable maximum
//!   episode length.
//! * [`MovingAvgNormalizer`] and [`IdentityNormalizer`] implement the
//!   [`Normalizer`] filter role: maintain running mean/variance estimates of
//!   a (optionally discounted) sample stream and transform batches toward
//!   zero mean and unit variance, with optional clipping.
//! * [`NormalizedVecEnv`] wires an observation normalizer and a reward
//!   normalizer around any [`VecEnv`] implementer and exposes the
//!   training-side `reset`/`step` and the evaluation-side
//!   `reset_test`/`step_test`/`render_test` surface.
//!
//! ## Observation and reward flow
//!
//! On every training step, raw observations and rewards coming back from the
//! vectorized backend are pushed through their filters (updating the running
//! statistics as a side effect), and finished slots have their transient
//! accumulators restarted. The shared statistics persist across episode
//! boundaries, so normalization improves monotonically over a run.
//! Evaluation steps transform observations with frozen statistics and return
//! rewards untouched, so test-time data never leaks into training-time
//! state.
//!
//! ```ignore
//! let env_config = SerialVecEnvConfig::<CartPoleEnv>::new(CartPoleConfig::default())
//!     .n_envs(8)
//!     .max_episode_length(Some(500));
//! let config = NormalizedVecEnvConfig::<SerialVecEnv<CartPoleEnv>>::new(env_config)
//!     .gamma(0.99)
//!     .clip_rewards(Some(10.0));
//! let mut env = NormalizedVecEnv::build(&config, 42)?;
//!
//! let obs = env.reset()?;
//! let (step, record) = env.step(&actions)?;
//! ```
mod base;
mod config;
pub mod env;
mod norm;
mod vec;

pub use base::NormalizedVecEnv;
pub use config::NormalizedVecEnvConfig;
pub use norm::{
    IdentityNormalizer, MovingAvgNormalizer, Normalizer, NormalizerConfig, RunningMoments,
};
pub use vec::{SerialVecEnv, SerialVecEnvConfig, VecEnv, VecStep};
