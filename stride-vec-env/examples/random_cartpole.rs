use anyhow::Result;
use ndarray::Array2;
use stride_vec_env::{
    env::{CartPoleConfig, CartPoleEnv},
    NormalizedVecEnv, NormalizedVecEnvConfig, SerialVecEnv, SerialVecEnvConfig,
};

const N_ENVS: usize = 2;
const N_STEPS: usize = 200;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let env_config = SerialVecEnvConfig::<CartPoleEnv>::new(CartPoleConfig::default())
        .n_envs(N_ENVS)
        .max_episode_length(Some(200));
    let config = NormalizedVecEnvConfig::<SerialVecEnv<CartPoleEnv>>::new(env_config)
        .gamma(0.99)
        .clip_obs(Some(10.0))
        .clip_rewards(Some(10.0));
    let mut env = NormalizedVecEnv::build(&config, 42)?;

    let act_space = env.action_space();
    let mut rng = fastrand::Rng::with_seed(42);

    // Training-side rollout with a random policy
    env.reset()?;
    let mut return_sum = 0f32;
    let mut episodes = 0usize;
    for t in 0..N_STEPS {
        let mut acts = Array2::zeros((N_ENVS, 1));
        for i in 0..N_ENVS {
            acts[[i, 0]] = act_space.sample(&mut rng)[0];
        }

        let (step, record) = env.step(&acts)?;
        return_sum += step.reward.iter().sum::<f32>();
        episodes += step.is_done.iter().filter(|&&d| d == 1).count();

        if (t + 1) % 50 == 0 {
            println!(
                "step {:3}: {} episodes, {} reward samples seen",
                t + 1,
                episodes,
                record.get_scalar("reward_norm_samples")?
            );
        }
    }
    println!(
        "normalized return over {} steps x {} slots: {:.2}",
        N_STEPS, N_ENVS, return_sum
    );

    // Evaluation pass: frozen observation statistics, raw rewards
    env.reset_test()?;
    let mut raw_return = 0f32;
    for _ in 0..50 {
        let mut acts = Array2::zeros((N_ENVS, 1));
        for i in 0..N_ENVS {
            acts[[i, 0]] = act_space.sample(&mut rng)[0];
        }
        let (step, _) = env.step_test(&acts)?;
        raw_return += step.reward.iter().sum::<f32>();
    }
    println!("raw evaluation return over 50 steps: {:.2}", raw_return);

    env.close();
    Ok(())
}
