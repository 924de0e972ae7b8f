//! Environment.
use super::{Info, Step};
use crate::record::Record;
use crate::Space;
use anyhow::Result;

/// Represents a single environment instance, typically an MDP.
///
/// Implementations are built from a configuration and a random seed, so a
/// vectorized backend can construct one instance per slot with
/// `seed + rank` seeding.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs;

    /// Action of the environment.
    type Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns an initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performes an environment step.
    fn step(&mut self, act: &Self::Act) -> (Step<Self>, Record)
    where
        Self: Sized;

    /// Renders the current state.
    ///
    /// The default implementation does nothing. `mode` is interpreted by the
    /// implementation (e.g. `"human"`).
    fn render(&mut self, _mode: &str) {}

    /// Releases resources held by the environment.
    ///
    /// The default implementation does nothing.
    fn close(&mut self) {}

    /// Returns the observation space descriptor.
    fn observation_space(&self) -> Space;

    /// Returns the action space descriptor.
    fn action_space(&self) -> Space;
}
