//! Serial execution of environment slots behind the batched interface.
use super::{SerialVecEnvConfig, VecEnv, VecStep};
use anyhow::{ensure, Result};
use log::{info, trace};
use ndarray::{aview1, Array2};
use stride_core::{error::StrideError, record::Record, Env, Space};

/// Executes N environment slots sequentially.
///
/// Slot `i` is built with `seed + i`, so the slots decorrelate even when
/// they share a configuration. A slot whose episode ends is reset
/// immediately and its row in the returned batch holds the fresh initial
/// observation. When `max_episode_length` is configured, a slot is flagged
/// done after that many steps regardless of the environment's own
/// termination signal (the wrapped environment may not have a time limit).
pub struct SerialVecEnv<E: Env> {
    envs: Vec<E>,
    obs_dim: usize,
    max_episode_length: Option<usize>,
    // Steps taken in the current episode, per slot.
    steps: Vec<usize>,
}

impl<E> VecEnv for SerialVecEnv<E>
where
    E: Env<Obs = Vec<f32>, Act = Vec<f32>>,
{
    type Config = SerialVecEnvConfig<E>;
    type Info = E::Info;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        ensure!(config.n_envs > 0, "n_envs must be positive");

        let mut envs = Vec::with_capacity(config.n_envs);
        for rank in 0..config.n_envs {
            envs.push(E::build(&config.env_config, seed + rank as i64)?);
        }
        let obs_dim = envs[0].observation_space().dim();
        info!("SerialVecEnv: {} slots, obs dim {}", config.n_envs, obs_dim);

        Ok(Self {
            envs,
            obs_dim,
            max_episode_length: config.max_episode_length,
            steps: vec![0; config.n_envs],
        })
    }

    fn n_envs(&self) -> usize {
        self.envs.len()
    }

    fn reset(&mut self, is_done: Option<&Vec<i8>>) -> Result<Array2<f32>> {
        trace!("SerialVecEnv::reset()");

        let mut obs = Array2::zeros((self.envs.len(), self.obs_dim));
        for (i, env) in self.envs.iter_mut().enumerate() {
            let reset = match is_done {
                None => true,
                Some(mask) => mask.get(i).map_or(false, |&d| d != 0),
            };
            if reset {
                let o = env.reset()?;
                debug_assert_eq!(o.len(), self.obs_dim);
                obs.row_mut(i).assign(&aview1(&o));
                self.steps[i] = 0;
            }
        }
        Ok(obs)
    }

    fn step(&mut self, acts: &Array2<f32>) -> Result<(VecStep<E::Info>, Record)> {
        trace!("SerialVecEnv::step()");

        if acts.nrows() != self.envs.len() {
            return Err(StrideError::DimensionMismatch {
                expected: self.envs.len(),
                actual: acts.nrows(),
            }
            .into());
        }

        let n = self.envs.len();
        let mut obs = Array2::zeros((n, self.obs_dim));
        let mut reward = Vec::with_capacity(n);
        let mut is_done = Vec::with_capacity(n);
        let mut infos = Vec::with_capacity(n);
        let mut record = Record::empty();

        for (i, env) in self.envs.iter_mut().enumerate() {
            let act: Vec<f32> = acts.row(i).to_vec();
            let (step, rec) = env.step(&act);
            self.steps[i] += 1;

            let mut done = step.is_done();
            if let Some(max) = self.max_episode_length {
                if self.steps[i] >= max {
                    done = true;
                }
            }

            let o = if done {
                self.steps[i] = 0;
                env.reset()?
            } else {
                step.obs
            };
            obs.row_mut(i).assign(&aview1(&o));
            reward.push(step.reward);
            is_done.push(done as i8);
            infos.push(step.info);
            record = record.merge(rec);
        }

        Ok((VecStep::new(obs, reward, is_done, infos), record))
    }

    fn render(&mut self, mode: &str) {
        for env in self.envs.iter_mut() {
            env.render(mode);
        }
    }

    fn close(&mut self) {
        for env in self.envs.iter_mut() {
            env.close();
        }
    }

    fn observation_space(&self) -> Space {
        self.envs[0].observation_space()
    }

    fn action_space(&self) -> Space {
        self.envs[0].action_space()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_core::Step;

    /// Emits its step count as observation and reward; terminates after
    /// `config` steps.
    struct CountingEnv {
        t: usize,
        horizon: usize,
    }

    impl Env for CountingEnv {
        type Config = usize;
        type Obs = Vec<f32>;
        type Act = Vec<f32>;
        type Info = ();

        fn build(config: &usize, _seed: i64) -> Result<Self> {
            Ok(Self {
                t: 0,
                horizon: *config,
            })
        }

        fn reset(&mut self) -> Result<Vec<f32>> {
            self.t = 0;
            Ok(vec![0.0])
        }

        fn step(&mut self, _act: &Vec<f32>) -> (Step<Self>, Record) {
            self.t += 1;
            let done = self.t >= self.horizon;
            let step = Step::new(vec![self.t as f32], self.t as f32, done as i8, ());
            (step, Record::empty())
        }

        fn observation_space(&self) -> Space {
            Space::uniform(&[1], 0.0, f32::MAX)
        }

        fn action_space(&self) -> Space {
            Space::discrete(2)
        }
    }

    fn acts(n: usize) -> Array2<f32> {
        Array2::zeros((n, 1))
    }

    #[test]
    fn test_reset_stacks_one_row_per_slot() {
        let config = SerialVecEnvConfig::<CountingEnv>::new(10).n_envs(3);
        let mut envs = SerialVecEnv::build(&config, 0).unwrap();

        let obs = envs.reset(None).unwrap();
        assert_eq!(obs.shape(), &[3, 1]);
        assert_eq!(envs.n_envs(), 3);
    }

    #[test]
    fn test_auto_reset_on_termination() {
        let config = SerialVecEnvConfig::<CountingEnv>::new(2).n_envs(1);
        let mut envs = SerialVecEnv::build(&config, 0).unwrap();
        envs.reset(None).unwrap();

        let (step, _) = envs.step(&acts(1)).unwrap();
        assert_eq!(step.is_done, vec![0]);
        assert_eq!(step.obs[[0, 0]], 1.0);

        // Terminates at t == 2; the row holds the fresh initial observation
        let (step, _) = envs.step(&acts(1)).unwrap();
        assert_eq!(step.is_done, vec![1]);
        assert_eq!(step.obs[[0, 0]], 0.0);
        assert_eq!(step.reward, vec![2.0]);

        // The episode restarted
        let (step, _) = envs.step(&acts(1)).unwrap();
        assert_eq!(step.is_done, vec![0]);
        assert_eq!(step.obs[[0, 0]], 1.0);
    }

    #[test]
    fn test_truncation_at_max_episode_length() {
        let config = SerialVecEnvConfig::<CountingEnv>::new(1000)
            .n_envs(1)
            .max_episode_length(Some(3));
        let mut envs = SerialVecEnv::build(&config, 0).unwrap();
        envs.reset(None).unwrap();

        for expected_done in [0i8, 0, 1, 0, 0, 1].iter() {
            let (step, _) = envs.step(&acts(1)).unwrap();
            assert_eq!(step.is_done, vec![*expected_done]);
        }
    }

    #[test]
    fn test_partial_reset_only_touches_flagged_slots() {
        let config = SerialVecEnvConfig::<CountingEnv>::new(100).n_envs(2);
        let mut envs = SerialVecEnv::build(&config, 0).unwrap();
        envs.reset(None).unwrap();
        envs.step(&acts(2)).unwrap();

        let obs = envs.reset(Some(&vec![1, 0])).unwrap();
        assert_eq!(obs[[0, 0]], 0.0);

        // Slot 1 kept its episode: its next step continues counting
        let (step, _) = envs.step(&acts(2)).unwrap();
        assert_eq!(step.obs[[0, 0]], 1.0);
        assert_eq!(step.obs[[1, 0]], 2.0);
    }

    #[test]
    fn test_wrong_action_batch_size() {
        let config = SerialVecEnvConfig::<CountingEnv>::new(10).n_envs(2);
        let mut envs = SerialVecEnv::build(&config, 0).unwrap();
        envs.reset(None).unwrap();

        let err = envs.step(&acts(3)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StrideError>(),
            Some(StrideError::DimensionMismatch { .. })
        ));
    }
}
