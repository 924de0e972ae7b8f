//! Contract of a set of environment slots behind a batched interface.
use anyhow::Result;
use ndarray::Array2;
use stride_core::{record::Record, Info, Space};

/// A batch of step results over all slots of a vectorized environment.
#[derive(Debug)]
pub struct VecStep<I: Info> {
    /// Stacked observations, one row per slot.
    pub obs: Array2<f32>,

    /// Reward of each slot.
    pub reward: Vec<f32>,

    /// Flag denoting if the episode of each slot ended at this step.
    pub is_done: Vec<i8>,

    /// Information defined by user, one entry per slot.
    pub infos: Vec<I>,
}

impl<I: Info> VecStep<I> {
    /// Constructs a [`VecStep`] object.
    pub fn new(obs: Array2<f32>, reward: Vec<f32>, is_done: Vec<i8>, infos: Vec<I>) -> Self {
        VecStep {
            obs,
            reward,
            is_done,
            infos,
        }
    }

    /// Number of slots in the batch.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Returns true if the batch holds no slots.
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }
}

/// A set of environment slots behind a batched step/reset interface.
///
/// Implementations decide how the slots execute; this layer only assumes
/// blocking, batch-return calls from a single caller thread with no
/// overlapping in-flight calls. A hang in a slot propagates as a hang here.
pub trait VecEnv {
    /// Configurations.
    type Config: Clone;

    /// Information attached to each slot's step.
    type Info: Info;

    /// Builds the environment set with a given base random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Number of slots.
    fn n_envs(&self) -> usize;

    /// Resets slots and returns the stacked initial observations.
    ///
    /// If `is_done` is `None`, all slots are reset. Otherwise only slots
    /// with `is_done[i] == 1` are reset; rows of slots that were not reset
    /// are zero-filled and will not be used by callers.
    fn reset(&mut self, is_done: Option<&Vec<i8>>) -> Result<Array2<f32>>;

    /// Steps all slots, one action row per slot.
    fn step(&mut self, acts: &Array2<f32>) -> Result<(VecStep<Self::Info>, Record)>;

    /// Renders the slots.
    ///
    /// The default implementation does nothing.
    fn render(&mut self, _mode: &str) {}

    /// Releases resources held by the slots.
    ///
    /// The default implementation does nothing.
    fn close(&mut self) {}

    /// Returns the observation space of a single slot.
    fn observation_space(&self) -> Space;

    /// Returns the action space of a single slot.
    fn action_space(&self) -> Space;
}
