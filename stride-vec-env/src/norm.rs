//! Normalization filters over batched observations and rewards.
mod base;
mod moments;
mod moving_avg;

pub use base::{IdentityNormalizer, Normalizer, NormalizerConfig};
pub use moments::RunningMoments;
pub use moving_avg::MovingAvgNormalizer;
