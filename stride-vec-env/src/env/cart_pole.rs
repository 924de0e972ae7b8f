//! Classic cart-pole balancing environment.
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use stride_core::{record::Record, Env, Space, Step};

const GRAVITY: f32 = 9.8;
const CART_MASS: f32 = 1.0;
const POLE_MASS: f32 = 0.1;
const POLE_LENGTH: f32 = 0.5;
const FORCE_MAG: f32 = 10.0;
const DT: f32 = 0.02;
const X_THRESHOLD: f32 = 2.4;
const THETA_THRESHOLD: f32 = 12.0 * std::f32::consts::PI / 180.0;

/// Configuration of [`CartPoleEnv`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartPoleConfig {
    /// Range of the uniform distribution initial state values are drawn
    /// from.
    pub init_range: f32,
}

impl Default for CartPoleConfig {
    fn default() -> Self {
        Self { init_range: 0.05 }
    }
}

impl CartPoleConfig {
    /// Sets the initial state range.
    pub fn init_range(mut self, v: f32) -> Self {
        self.init_range = v;
        self
    }
}

/// A pole balancing on a cart driven along a frictionless track.
///
/// The observation is `[x, x_dot, theta, theta_dot]`. The action is a
/// single-element vector interpreted as a discrete choice: `1` pushes the
/// cart right, anything else pushes left. Every step earns reward `1.0`;
/// the episode ends when the cart leaves the track or the pole tips past
/// the angle threshold. Time-limit truncation belongs to the vectorized
/// layer.
pub struct CartPoleEnv {
    x: f32,
    x_dot: f32,
    theta: f32,
    theta_dot: f32,
    init_range: f32,
    rng: fastrand::Rng,
}

impl CartPoleEnv {
    fn obs(&self) -> Vec<f32> {
        vec![self.x, self.x_dot, self.theta, self.theta_dot]
    }

    fn failed(&self) -> bool {
        self.x.abs() > X_THRESHOLD || self.theta.abs() > THETA_THRESHOLD
    }
}

impl Env for CartPoleEnv {
    type Config = CartPoleConfig;
    type Obs = Vec<f32>;
    type Act = Vec<f32>;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            x: 0.0,
            x_dot: 0.0,
            theta: 0.0,
            theta_dot: 0.0,
            init_range: config.init_range,
            rng: fastrand::Rng::with_seed(seed as u64),
        })
    }

    fn reset(&mut self) -> Result<Vec<f32>> {
        let r = self.init_range;
        self.x = -r + 2.0 * r * self.rng.f32();
        self.x_dot = -r + 2.0 * r * self.rng.f32();
        self.theta = -r + 2.0 * r * self.rng.f32();
        self.theta_dot = -r + 2.0 * r * self.rng.f32();
        Ok(self.obs())
    }

    fn step(&mut self, act: &Vec<f32>) -> (Step<Self>, Record) {
        let force = if act[0] as i32 == 1 {
            FORCE_MAG
        } else {
            -FORCE_MAG
        };

        let cos_theta = self.theta.cos();
        let sin_theta = self.theta.sin();
        let total_mass = CART_MASS + POLE_MASS;
        let pole_mass_length = POLE_MASS * POLE_LENGTH;

        let temp =
            (force + pole_mass_length * self.theta_dot * self.theta_dot * sin_theta) / total_mass;
        let denom = POLE_LENGTH * (4.0 / 3.0 - POLE_MASS * cos_theta * cos_theta / total_mass);
        let theta_acc = (GRAVITY * sin_theta - cos_theta * temp) / denom.max(1e-6);
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;

        self.x += DT * self.x_dot;
        self.x_dot += DT * x_acc;
        self.theta += DT * self.theta_dot;
        self.theta_dot += DT * theta_acc;

        let step = Step::new(self.obs(), 1.0, self.failed() as i8, ());
        (step, Record::empty())
    }

    fn render(&mut self, mode: &str) {
        if mode == "human" {
            info!(
                "cart-pole: x = {:+.3}, theta = {:+.3}",
                self.x, self.theta
            );
        }
    }

    fn observation_space(&self) -> Space {
        Space::uniform(&[4], -4.8, 4.8)
    }

    fn action_space(&self) -> Space {
        Space::discrete(2)
    }
}
