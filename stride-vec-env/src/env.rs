//! Built-in environments.
mod cart_pole;

pub use cart_pole::{CartPoleConfig, CartPoleEnv};
