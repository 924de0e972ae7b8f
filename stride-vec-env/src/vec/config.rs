//! Configuration of the serial vectorized backend.
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use stride_core::Env;

/// Constructs [`SerialVecEnv`](super::SerialVecEnv).
#[derive(Serialize, Deserialize)]
pub struct SerialVecEnvConfig<E: Env> {
    /// The number of slots.
    pub(super) n_envs: usize,

    /// Flags a slot as done after this many steps, even if the environment
    /// did not terminate on its own.
    pub(super) max_episode_length: Option<usize>,

    /// Configuration of each slot's environment.
    pub(super) env_config: E::Config,
}

impl<E: Env> Clone for SerialVecEnvConfig<E> {
    fn clone(&self) -> Self {
        Self {
            n_envs: self.n_envs,
            max_episode_length: self.max_episode_length,
            env_config: self.env_config.clone(),
        }
    }
}

impl<E: Env> SerialVecEnvConfig<E> {
    /// Creates a configuration with one slot and no episode length limit.
    pub fn new(env_config: E::Config) -> Self {
        Self {
            n_envs: 1,
            max_episode_length: None,
            env_config,
        }
    }

    /// Sets the number of slots.
    pub fn n_envs(mut self, v: usize) -> Self {
        self.n_envs = v;
        self
    }

    /// Sets the maximum episode length.
    pub fn max_episode_length(mut self, v: Option<usize>) -> Self {
        self.max_episode_length = v;
        self
    }
}

impl<E: Env> SerialVecEnvConfig<E>
where
    E::Config: Serialize + DeserializeOwned,
{
    /// Constructs [`SerialVecEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SerialVecEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
