//! The normalization filter role and its pass-through implementation.
use anyhow::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use stride_core::record::Record;

/// Configuration of a [`Normalizer`].
///
/// All fields are resolved once at construction time; a built filter has no
/// optional behavior left to decide per call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizerConfig {
    /// Dimensionality of the quantity being normalized (1 for scalar reward
    /// streams).
    pub dim: usize,

    /// Subtract the running mean estimate.
    pub center: bool,

    /// Divide by the running standard deviation estimate.
    pub scale: bool,

    /// Discount factor in `[0, 1)` applied to the per-slot accumulators.
    ///
    /// With `0` the statistics are taken over the raw samples; with a
    /// positive value they are taken over discounted running sums, which
    /// gives return-style reward scaling.
    pub gamma: f64,

    /// Symmetric clipping bound applied to every output element.
    pub clip: Option<f32>,

    /// Prefix of the keys this filter writes into step records.
    pub tag: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            dim: 1,
            center: true,
            scale: true,
            gamma: 0.0,
            clip: None,
            tag: "norm".to_string(),
        }
    }
}

impl NormalizerConfig {
    /// Sets the dimensionality of the quantity being normalized.
    pub fn dim(mut self, v: usize) -> Self {
        self.dim = v;
        self
    }

    /// Sets whether the running mean is subtracted.
    pub fn center(mut self, v: bool) -> Self {
        self.center = v;
        self
    }

    /// Sets whether the running standard deviation divides the output.
    pub fn scale(mut self, v: bool) -> Self {
        self.scale = v;
        self
    }

    /// Sets the discount factor of the per-slot accumulators.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the symmetric clipping bound.
    pub fn clip(mut self, v: Option<f32>) -> Self {
        self.clip = v;
        self
    }

    /// Sets the record key prefix.
    pub fn tag(mut self, v: impl Into<String>) -> Self {
        self.tag = v.into();
        self
    }

    /// Constructs [`NormalizerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`NormalizerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Transforms batches of observations or rewards, one row per parallel slot.
///
/// Implementations may keep running statistics updated as a side effect of
/// [`Normalizer::filt`]; [`Normalizer::filt_frozen`] applies the same
/// transform without mutating anything, for evaluation-time use.
pub trait Normalizer {
    /// Builds the filter.
    fn build(config: &NormalizerConfig) -> Result<Self>
    where
        Self: Sized;

    /// Updates the running estimates with `batch`, then returns the
    /// transformed batch and a record of filter diagnostics.
    fn filt(&mut self, batch: &Array2<f32>) -> (Array2<f32>, Record);

    /// Transforms `batch` with the current estimates without updating them.
    fn filt_frozen(&self, batch: &Array2<f32>) -> Array2<f32>;

    /// Resets transient state.
    ///
    /// With `None`, the filter returns to its construction state. With a
    /// mask, only the per-slot accumulators of slots with `is_done[i] == 1`
    /// restart; the shared statistics are never touched by episode
    /// boundaries.
    fn reset(&mut self, is_done: Option<&Vec<i8>>);

    /// Dimensionality this filter was configured for, if it constrains one.
    fn dim(&self) -> Option<usize>;
}

/// The pass-through filter: returns every batch unchanged and keeps no
/// statistics.
#[derive(Debug, Clone, Default)]
pub struct IdentityNormalizer;

impl Normalizer for IdentityNormalizer {
    fn build(_config: &NormalizerConfig) -> Result<Self> {
        Ok(Self)
    }

    fn filt(&mut self, batch: &Array2<f32>) -> (Array2<f32>, Record) {
        (batch.clone(), Record::empty())
    }

    fn filt_frozen(&self, batch: &Array2<f32>) -> Array2<f32> {
        batch.clone()
    }

    fn reset(&mut self, _is_done: Option<&Vec<i8>>) {}

    fn dim(&self) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_identity_returns_input_unchanged() {
        let mut filter = IdentityNormalizer::build(&NormalizerConfig::default()).unwrap();
        let batch = arr2(&[[1.0f32, -2.0], [1e6, f32::MIN]]);

        for _ in 0..10 {
            let (out, record) = filter.filt(&batch);
            assert_eq!(out, batch);
            assert!(record.is_empty());
            assert_eq!(filter.filt_frozen(&batch), batch);
        }

        filter.reset(None);
        let (out, _) = filter.filt(&batch);
        assert_eq!(out, batch);
    }

    #[test]
    fn test_config_yaml_roundtrip() {
        use tempdir::TempDir;

        let config = NormalizerConfig::default()
            .dim(4)
            .center(false)
            .gamma(0.99)
            .clip(Some(5.0))
            .tag("reward_norm");

        let dir = TempDir::new("normalizer_config").unwrap();
        let path = dir.path().join("normalizer.yaml");
        config.save(&path).unwrap();
        let config_ = NormalizerConfig::load(&path).unwrap();

        assert_eq!(config, config_);
    }
}
