//! Configuration of the normalized vectorized environment.
use crate::VecEnv;
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Constructs [`NormalizedVecEnv`](crate::NormalizedVecEnv).
///
/// The normalization flags are resolved once at build time into the filter
/// variants the wrapper holds; there are no optional code paths left at
/// step time.
#[derive(Serialize, Deserialize)]
pub struct NormalizedVecEnvConfig<V: VecEnv> {
    /// Configuration of the training environment set. `None` builds the
    /// wrapper in evaluation-only mode with no training slots.
    pub(crate) train_env_config: Option<V::Config>,

    /// Configuration of the evaluation environment set.
    pub(crate) test_env_config: V::Config,

    /// Discount factor of the reward normalizer's accumulators.
    pub(crate) gamma: f64,

    /// If true, keeps moving mean and variance of observations and
    /// normalizes new observations.
    pub(crate) norm_obs: bool,

    /// Clipping value for normalized observations.
    pub(crate) clip_obs: Option<f32>,

    /// If true, keeps moving variance of discounted returns and normalizes
    /// incoming rewards.
    pub(crate) norm_rewards: bool,

    /// Clipping value for normalized rewards.
    pub(crate) clip_rewards: Option<f32>,
}

impl<V: VecEnv> Clone for NormalizedVecEnvConfig<V> {
    fn clone(&self) -> Self {
        Self {
            train_env_config: self.train_env_config.clone(),
            test_env_config: self.test_env_config.clone(),
            gamma: self.gamma,
            norm_obs: self.norm_obs,
            clip_obs: self.clip_obs,
            norm_rewards: self.norm_rewards,
            clip_rewards: self.clip_rewards,
        }
    }
}

impl<V: VecEnv> NormalizedVecEnvConfig<V> {
    /// Creates a configuration using `env_config` for both the training and
    /// the evaluation environment set.
    pub fn new(env_config: V::Config) -> Self {
        Self {
            train_env_config: Some(env_config.clone()),
            test_env_config: env_config,
            gamma: 0.99,
            norm_obs: true,
            clip_obs: None,
            norm_rewards: true,
            clip_rewards: None,
        }
    }

    /// Sets a separate configuration for the evaluation environment set.
    pub fn test_env_config(mut self, v: V::Config) -> Self {
        self.test_env_config = v;
        self
    }

    /// Drops the training environment set.
    ///
    /// A wrapper built from such a configuration only serves the
    /// evaluation-side methods; training-side `step`/`reset` fail with
    /// [`StrideError::NoTrainingEnvs`](stride_core::error::StrideError).
    pub fn eval_only(mut self) -> Self {
        self.train_env_config = None;
        self
    }

    /// Sets the discount factor for reward normalization.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets whether observations are normalized.
    pub fn norm_obs(mut self, v: bool) -> Self {
        self.norm_obs = v;
        self
    }

    /// Sets the clipping value for normalized observations.
    pub fn clip_obs(mut self, v: Option<f32>) -> Self {
        self.clip_obs = v;
        self
    }

    /// Sets whether rewards are normalized.
    pub fn norm_rewards(mut self, v: bool) -> Self {
        self.norm_rewards = v;
        self
    }

    /// Sets the clipping value for normalized rewards.
    pub fn clip_rewards(mut self, v: Option<f32>) -> Self {
        self.clip_rewards = v;
        self
    }
}

impl<V: VecEnv> NormalizedVecEnvConfig<V>
where
    V::Config: Serialize + DeserializeOwned,
{
    /// Constructs [`NormalizedVecEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`NormalizedVecEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
