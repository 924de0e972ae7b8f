//! A filter that normalizes against running statistics of a discounted
//! sample stream.
use super::{Normalizer, NormalizerConfig, RunningMoments};
use anyhow::{ensure, Result};
use ndarray::Array2;
use stride_core::record::{Record, RecordValue};

const EPS: f64 = 1e-8;

/// Normalizes batches against running mean/variance estimates.
///
/// Each slot carries a discounted accumulator `a <- gamma * a + x`; every
/// incoming sample advances its slot's accumulator and pushes it into the
/// shared [`RunningMoments`], then the raw sample is transformed with the
/// current estimates. With `gamma == 0` the accumulator equals the sample
/// and the filter reduces to plain Welford normalization; with a positive
/// `gamma` the statistics are taken over discounted running sums, which
/// scales rewards by the spread of observed returns.
///
/// The accumulators are sized lazily from the first batch, so one filter
/// serves any number of parallel slots.
pub struct MovingAvgNormalizer {
    dim: usize,
    center: bool,
    scale: bool,
    gamma: f64,
    clip: Option<f32>,
    tag: String,
    moments: RunningMoments,
    // One accumulator row per parallel slot.
    acc: Vec<Vec<f64>>,
}

impl MovingAvgNormalizer {
    /// Returns the default configuration.
    pub fn default_config() -> NormalizerConfig {
        NormalizerConfig::default()
    }

    fn divisor(&self, j: usize) -> f64 {
        // Until a second sample arrives there is no spread to scale by.
        if self.moments.count() < 2.0 {
            1.0
        } else {
            (self.moments.var(j) + EPS).sqrt()
        }
    }

    fn transform(&self, batch: &Array2<f32>) -> Array2<f32> {
        let mut out = batch.clone();
        for mut row in out.rows_mut() {
            for (j, y) in row.iter_mut().enumerate() {
                let mut v = *y as f64;
                if self.center {
                    v -= self.moments.mean()[j];
                }
                if self.scale {
                    v /= self.divisor(j);
                }
                let mut v = v as f32;
                if let Some(c) = self.clip {
                    v = v.clamp(-c, c);
                }
                *y = v;
            }
        }
        out
    }
}

impl Normalizer for MovingAvgNormalizer {
    fn build(config: &NormalizerConfig) -> Result<Self> {
        ensure!(config.dim >= 1, "dim must be at least 1");
        ensure!(
            config.gamma >= 0.0 && config.gamma < 1.0,
            "gamma must be in [0, 1), got {}",
            config.gamma
        );

        Ok(Self {
            dim: config.dim,
            center: config.center,
            scale: config.scale,
            gamma: config.gamma,
            clip: config.clip,
            tag: config.tag.clone(),
            moments: RunningMoments::new(config.dim),
            acc: Vec::new(),
        })
    }

    fn filt(&mut self, batch: &Array2<f32>) -> (Array2<f32>, Record) {
        debug_assert_eq!(batch.ncols(), self.dim);

        let n_slots = batch.nrows();
        if self.acc.len() != n_slots {
            self.acc = vec![vec![0.0; self.dim]; n_slots];
        }

        for (i, row) in batch.rows().into_iter().enumerate() {
            for (j, &x) in row.iter().enumerate() {
                self.acc[i][j] = self.gamma * self.acc[i][j] + x as f64;
            }
            self.moments.push(&self.acc[i]);
        }

        let out = self.transform(batch);

        let mut record = Record::empty();
        record.insert(
            format!("{}_samples", self.tag),
            RecordValue::Scalar(self.moments.count() as f32),
        );
        record.insert(
            format!("{}_std", self.tag),
            RecordValue::Array1((0..self.dim).map(|j| self.moments.std(j) as f32).collect()),
        );

        (out, record)
    }

    fn filt_frozen(&self, batch: &Array2<f32>) -> Array2<f32> {
        debug_assert_eq!(batch.ncols(), self.dim);
        self.transform(batch)
    }

    fn reset(&mut self, is_done: Option<&Vec<i8>>) {
        match is_done {
            None => {
                self.moments.reset();
                self.acc.clear();
            }
            Some(mask) => {
                for (i, &done) in mask.iter().enumerate() {
                    if done != 0 {
                        if let Some(acc) = self.acc.get_mut(i) {
                            acc.iter_mut().for_each(|v| *v = 0.0);
                        }
                    }
                }
            }
        }
    }

    fn dim(&self) -> Option<usize> {
        Some(self.dim)
    }
}
