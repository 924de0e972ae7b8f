//! Normalized wrapper over a vectorized environment.
use crate::{
    IdentityNormalizer, MovingAvgNormalizer, NormalizedVecEnvConfig, Normalizer, NormalizerConfig,
    VecEnv, VecStep,
};
use anyhow::Result;
use log::{info, trace};
use ndarray::Array2;
use stride_core::{error::StrideError, record::Record, Space};

/// A vectorized environment wrapper that normalizes observations and
/// rewards.
///
/// The wrapper owns a training environment set and an evaluation environment
/// set, plus one filter per stream, resolved from the configuration at build
/// time:
///
/// * observation filter - running mean/variance normalization over raw
///   observations (`gamma == 0`), or pass-through when `norm_obs` is off;
/// * reward filter - scaling by the standard deviation of discounted
///   returns, or pass-through when `norm_rewards` is off.
///
/// Training-side [`step`](NormalizedVecEnv::step) updates both filters'
/// statistics and restarts the per-slot accumulators of finished episodes.
/// Evaluation-side [`step_test`](NormalizedVecEnv::step_test) transforms
/// observations with frozen statistics and returns raw rewards, so measured
/// performance reflects the actual task and evaluation traffic never leaks
/// into training-time state.
///
/// Building the wrapper spawns the environment slots and performs an initial
/// training reset; this is an expensive, non-idempotent acquisition.
/// Teardown of the slots belongs to the environment sets' `close`.
pub struct NormalizedVecEnv<V: VecEnv> {
    envs: Option<V>,
    envs_test: V,
    obs_normalizer: Box<dyn Normalizer>,
    reward_normalizer: Box<dyn Normalizer>,
    last_obs: Option<Array2<f32>>,
}

impl<V: VecEnv> NormalizedVecEnv<V> {
    /// Builds the wrapper.
    ///
    /// The training environment set is built unless the configuration is
    /// evaluation-only, and is reset once to seed
    /// [`last_obs`](NormalizedVecEnv::last_obs).
    pub fn build(config: &NormalizedVecEnvConfig<V>, seed: i64) -> Result<Self> {
        let envs = match &config.train_env_config {
            Some(c) => Some(V::build(c, seed)?),
            None => None,
        };
        let envs_test = V::build(&config.test_env_config, seed)?;

        let obs_dim = envs
            .as_ref()
            .unwrap_or(&envs_test)
            .observation_space()
            .dim();

        let obs_normalizer: Box<dyn Normalizer> = if config.norm_obs {
            // gamma 0: observations are normalized against plain running
            // statistics, not return trajectories
            Box::new(MovingAvgNormalizer::build(
                &NormalizerConfig::default()
                    .dim(obs_dim)
                    .center(true)
                    .scale(true)
                    .gamma(0.0)
                    .clip(config.clip_obs)
                    .tag("obs_norm"),
            )?)
        } else {
            Box::new(IdentityNormalizer::build(&NormalizerConfig::default())?)
        };

        let reward_normalizer: Box<dyn Normalizer> = if config.norm_rewards {
            Box::new(MovingAvgNormalizer::build(
                &NormalizerConfig::default()
                    .dim(1)
                    .center(false)
                    .scale(true)
                    .gamma(config.gamma)
                    .clip(config.clip_rewards)
                    .tag("reward_norm"),
            )?)
        } else {
            Box::new(IdentityNormalizer::build(&NormalizerConfig::default())?)
        };

        info!(
            "NormalizedVecEnv: {} training slots, {} evaluation slots",
            envs.as_ref().map_or(0, |e| e.n_envs()),
            envs_test.n_envs()
        );

        let mut wrapper = Self {
            envs,
            envs_test,
            obs_normalizer,
            reward_normalizer,
            last_obs: None,
        };
        if let Some(envs) = wrapper.envs.as_mut() {
            let obs = envs.reset(None)?;
            let (obs, _) = wrapper.obs_normalizer.filt(&obs);
            wrapper.last_obs = Some(obs);
        }
        Ok(wrapper)
    }

    /// Resets both filters to their zero state, resets the training
    /// environment set and returns the normalized initial observations.
    pub fn reset(&mut self) -> Result<Array2<f32>> {
        trace!("NormalizedVecEnv::reset()");
        let envs = self.envs.as_mut().ok_or(StrideError::NoTrainingEnvs)?;

        self.obs_normalizer.reset(None);
        self.reward_normalizer.reset(None);

        let obs = envs.reset(None)?;
        let (obs, _) = self.obs_normalizer.filt(&obs);
        self.last_obs = Some(obs.clone());
        Ok(obs)
    }

    /// Steps the training environment set and normalizes the returned
    /// observations and rewards, updating the running statistics.
    ///
    /// `dones` and `infos` pass through untouched. Finished slots restart
    /// their transient accumulators; the shared statistics persist.
    pub fn step(&mut self, acts: &Array2<f32>) -> Result<(VecStep<V::Info>, Record)> {
        trace!("NormalizedVecEnv::step()");
        let envs = self.envs.as_mut().ok_or(StrideError::NoTrainingEnvs)?;

        let (step, record) = envs.step(acts)?;
        if let Some(dim) = self.obs_normalizer.dim() {
            if step.obs.ncols() != dim {
                return Err(StrideError::DimensionMismatch {
                    expected: dim,
                    actual: step.obs.ncols(),
                }
                .into());
            }
        }

        let (obs, record_o) = self.obs_normalizer.filt(&step.obs);
        let rewards = Array2::from_shape_vec((step.reward.len(), 1), step.reward.clone())?;
        let (rewards, record_r) = self.reward_normalizer.filt(&rewards);

        self.obs_normalizer.reset(Some(&step.is_done));
        self.reward_normalizer.reset(Some(&step.is_done));

        self.last_obs = Some(obs.clone());
        let reward = rewards.column(0).to_vec();
        let step = VecStep::new(obs, reward, step.is_done, step.infos);
        Ok((step, record.merge(record_o).merge(record_r)))
    }

    /// Steps the evaluation environment set.
    ///
    /// Observations are normalized with frozen statistics; rewards are
    /// returned unnormalized so evaluation reports raw task performance.
    pub fn step_test(&mut self, acts: &Array2<f32>) -> Result<(VecStep<V::Info>, Record)> {
        trace!("NormalizedVecEnv::step_test()");
        let (mut step, record) = self.envs_test.step(acts)?;
        step.obs = self.obs_normalizer.filt_frozen(&step.obs);
        Ok((step, record))
    }

    /// Resets the evaluation environment set only and returns observations
    /// normalized with frozen statistics.
    pub fn reset_test(&mut self) -> Result<Array2<f32>> {
        trace!("NormalizedVecEnv::reset_test()");
        let obs = self.envs_test.reset(None)?;
        Ok(self.obs_normalizer.filt_frozen(&obs))
    }

    /// Delegates rendering to the evaluation environment set.
    pub fn render_test(&mut self, mode: &str) {
        self.envs_test.render(mode);
    }

    /// Returns the observation space, preferring the training environment
    /// set and falling back to the evaluation set when the wrapper is
    /// evaluation-only.
    pub fn observation_space(&self) -> Space {
        match &self.envs {
            Some(envs) => envs.observation_space(),
            None => self.envs_test.observation_space(),
        }
    }

    /// Returns the action space, with the same fallback as
    /// [`observation_space`](NormalizedVecEnv::observation_space).
    pub fn action_space(&self) -> Space {
        match &self.envs {
            Some(envs) => envs.action_space(),
            None => self.envs_test.action_space(),
        }
    }

    /// Number of training slots; 0 in evaluation-only mode.
    pub fn n_envs(&self) -> usize {
        self.envs.as_ref().map_or(0, |e| e.n_envs())
    }

    /// The most recent normalized training observations, seeded by the
    /// build-time reset. `None` in evaluation-only mode.
    pub fn last_obs(&self) -> Option<&Array2<f32>> {
        self.last_obs.as_ref()
    }

    /// Closes both environment sets.
    pub fn close(&mut self) {
        if let Some(envs) = self.envs.as_mut() {
            envs.close();
        }
        self.envs_test.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SerialVecEnv, SerialVecEnvConfig};
    use ndarray::Array2;
    use stride_core::{Env, Step};

    /// Emits a deterministic cycling reward `(t + offset) % 4`, where the
    /// offset comes from the build seed; truncates after four steps.
    struct CyclingRewardEnv {
        t: u64,
        offset: u64,
    }

    impl CyclingRewardEnv {
        fn value(&self) -> f32 {
            ((self.t + self.offset) % 4) as f32
        }
    }

    impl Env for CyclingRewardEnv {
        type Config = ();
        type Obs = Vec<f32>;
        type Act = Vec<f32>;
        type Info = ();

        fn build(_config: &(), seed: i64) -> Result<Self> {
            Ok(Self {
                t: 0,
                offset: seed as u64,
            })
        }

        fn reset(&mut self) -> Result<Vec<f32>> {
            self.t = 0;
            Ok(vec![self.value()])
        }

        fn step(&mut self, _act: &Vec<f32>) -> (Step<Self>, Record) {
            self.t += 1;
            let done = self.t == 4;
            let step = Step::new(vec![self.value()], self.value(), done as i8, ());
            (step, Record::empty())
        }

        fn observation_space(&self) -> Space {
            Space::uniform(&[1], -10.0, 10.0)
        }

        fn action_space(&self) -> Space {
            Space::discrete(2)
        }
    }

    type TestVecEnv = SerialVecEnv<CyclingRewardEnv>;

    fn config() -> NormalizedVecEnvConfig<TestVecEnv> {
        let env_config = SerialVecEnvConfig::<CyclingRewardEnv>::new(()).n_envs(2);
        NormalizedVecEnvConfig::new(env_config).gamma(0.99)
    }

    fn acts(n: usize) -> Array2<f32> {
        Array2::zeros((n, 1))
    }

    #[test]
    fn test_build_seeds_last_obs() {
        let env = NormalizedVecEnv::build(&config(), 0).unwrap();
        assert_eq!(env.n_envs(), 2);
        assert_eq!(env.last_obs().unwrap().shape(), &[2, 1]);
    }

    #[test]
    fn test_reset_returns_one_row_per_slot() {
        let mut env = NormalizedVecEnv::build(&config(), 0).unwrap();
        let obs = env.reset().unwrap();
        assert_eq!(obs.shape(), &[2, 1]);
    }

    #[test]
    fn test_step_normalizes_rewards() {
        let mut env = NormalizedVecEnv::build(&config(), 0).unwrap();
        env.reset().unwrap();

        // Raw rewards at t = 1 are (1 + offset) % 4 per slot: [1, 2]
        let (step, record) = env.step(&acts(2)).unwrap();
        assert_eq!(step.len(), 2);
        assert_eq!(step.is_done, vec![0, 0]);
        assert_ne!(step.reward, vec![1.0, 2.0]);
        // Scale-only normalization keeps signs and ordering
        assert!(step.reward[0] > 0.0 && step.reward[1] > step.reward[0]);
        assert!(record.get_scalar("reward_norm_samples").unwrap() >= 2.0);
    }

    #[test]
    fn test_step_test_returns_raw_rewards() {
        let mut env = NormalizedVecEnv::build(&config(), 0).unwrap();
        env.reset().unwrap();
        env.step(&acts(2)).unwrap();

        // The evaluation set is an identical, independent copy; its raw
        // rewards at t = 1 are [1, 2] and must come back untouched.
        let (step, _) = env.step_test(&acts(2)).unwrap();
        assert_eq!(step.reward, vec![1.0, 2.0]);
    }

    #[test]
    fn test_obs_normalized_with_update_on_training_path() {
        let mut env = NormalizedVecEnv::build(&config(), 0).unwrap();
        let obs = env.reset().unwrap();

        // Raw initial observations are [0, 1]; centering maps the first
        // batch away from the raw values
        assert_ne!((obs[[0, 0]], obs[[1, 0]]), (0.0, 1.0));
    }

    #[test]
    fn test_evaluation_traffic_does_not_perturb_training() {
        let mut a = NormalizedVecEnv::build(&config(), 0).unwrap();
        let mut b = NormalizedVecEnv::build(&config(), 0).unwrap();

        a.reset().unwrap();
        b.reset().unwrap();

        for _ in 0..8 {
            b.reset_test().unwrap();
            b.step_test(&acts(2)).unwrap();

            let (step_a, _) = a.step(&acts(2)).unwrap();
            let (step_b, _) = b.step(&acts(2)).unwrap();
            assert_eq!(step_a.reward, step_b.reward);
            assert_eq!(step_a.obs, step_b.obs);
        }
    }

    #[test]
    fn test_pass_through_when_normalization_disabled() {
        let config = config().norm_obs(false).norm_rewards(false);
        let mut env = NormalizedVecEnv::build(&config, 0).unwrap();
        env.reset().unwrap();

        let (step, _) = env.step(&acts(2)).unwrap();
        assert_eq!(step.reward, vec![1.0, 2.0]);
        assert_eq!((step.obs[[0, 0]], step.obs[[1, 0]]), (1.0, 2.0));
    }

    #[test]
    fn test_eval_only_mode() {
        let config = config().eval_only();
        let mut env = NormalizedVecEnv::build(&config, 0).unwrap();

        assert_eq!(env.n_envs(), 0);
        assert!(env.last_obs().is_none());
        // Space accessors fall back to the evaluation set
        assert_eq!(env.observation_space().dim(), 1);
        assert_eq!(env.action_space(), Space::discrete(2));
        // The evaluation surface still works
        assert_eq!(env.reset_test().unwrap().shape(), &[2, 1]);

        let err = env.step(&acts(2)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StrideError>(),
            Some(StrideError::NoTrainingEnvs)
        ));
        let err = env.reset().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StrideError>(),
            Some(StrideError::NoTrainingEnvs)
        ));
    }

    #[test]
    fn test_render_test_delegates() {
        let mut env = NormalizedVecEnv::build(&config(), 0).unwrap();
        // No-op for this environment; must not touch training state
        env.render_test("human");
        assert_eq!(env.last_obs().unwrap().shape(), &[2, 1]);
    }

    #[test]
    fn test_config_yaml_roundtrip() {
        use tempdir::TempDir;

        let config = config().clip_rewards(Some(10.0)).norm_obs(false);
        let dir = TempDir::new("normalized_vec_env").unwrap();
        let path = dir.path().join("env.yaml");
        config.save(&path).unwrap();

        let config_ = NormalizedVecEnvConfig::<TestVecEnv>::load(&path).unwrap();
        assert_eq!(config_.gamma, 0.99);
        assert_eq!(config_.clip_rewards, Some(10.0));
        assert!(!config_.norm_obs);
        assert!(config_.norm_rewards);
    }
}
