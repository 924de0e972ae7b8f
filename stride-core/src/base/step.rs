//! Environment step.
use super::Env;

/// Additional information to `Obs` and `Act`.
pub trait Info {}

impl Info for () {}

/// Represents an observation and reward tuple `(o_t+1, r_t)` with some
/// additional information.
///
/// An environment emits a [`Step`] object at every interaction step.
pub struct Step<E: Env> {
    /// Observation.
    pub obs: E::Obs,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if the episode ended at this step.
    pub is_done: i8,

    /// Information defined by user.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(obs: E::Obs, reward: f32, is_done: i8, info: E::Info) -> Self {
        Step {
            obs,
            reward,
            is_done,
            info,
        }
    }

    #[inline]
    /// Episode ended at this step.
    pub fn is_done(&self) -> bool {
        self.is_done == 1
    }
}
